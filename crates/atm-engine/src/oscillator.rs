//! Oscillator bank and waveform generators.
//!
//! Each oscillator is a pair of atomics written by the sequencer and read by
//! the renderer. A torn update between the two fields costs at most one
//! sample of glitch, so relaxed ordering is enough.

use core::ops::Index;
use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use atm_ir::CHANNELS;

/// Channel whose `freq` is a noise shift register instead of a phase increment.
pub const NOISE_CHANNEL: usize = 3;

/// Shift register seed; a zero register never leaves zero.
pub const NOISE_SEED: u16 = 0x0001;

#[derive(Debug, Default)]
pub struct Oscillator {
    freq: AtomicU16,
    vol: AtomicU8,
}

impl Oscillator {
    #[inline]
    pub fn freq(&self) -> u16 {
        self.freq.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn vol(&self) -> u8 {
        self.vol.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_freq(&self, freq: u16) {
        self.freq.store(freq, Ordering::Relaxed);
    }

    #[inline]
    pub fn set_vol(&self, vol: u8) {
        self.vol.store(vol, Ordering::Relaxed);
    }
}

/// The four fixed oscillators: pulse, square, triangle, noise.
#[derive(Debug, Default)]
pub struct OscillatorBank {
    oscillators: [Oscillator; CHANNELS],
}

impl OscillatorBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every volume, leaving frequencies alone.
    pub fn silence(&self) {
        for osc in &self.oscillators {
            osc.set_vol(0);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Oscillator> {
        self.oscillators.iter()
    }
}

impl Index<usize> for OscillatorBank {
    type Output = Oscillator;

    fn index(&self, channel: usize) -> &Oscillator {
        &self.oscillators[channel]
    }
}

/// ~75% duty pulse: negative for the last quarter of the cycle.
#[inline]
pub fn pulse(phase: u16, vol: u8) -> i8 {
    let v = vol as i8;
    if phase >= 0xC000 {
        v.wrapping_neg()
    } else {
        v
    }
}

/// 50% duty square.
#[inline]
pub fn square(phase: u16, vol: u8) -> i8 {
    let v = vol as i8;
    if phase & 0x8000 != 0 {
        v.wrapping_neg()
    } else {
        v
    }
}

/// Triangle built by folding the phase's high byte into a ramp.
#[inline]
pub fn triangle(phase: u16, vol: u8) -> i8 {
    let mut ramp = (phase >> 8) as u8 as i8;
    if ramp < 0 {
        ramp = !ramp;
    }
    let ramp = ramp.wrapping_shl(1).wrapping_add(i8::MIN);
    (((ramp as i32 * vol as i8 as i32) << 1) >> 8) as i8
}

/// Advance the noise shift register by one sample.
#[inline]
pub fn noise_step(lfsr: u16) -> u16 {
    let mut next = lfsr << 1;
    if next & 0x8000 != 0 {
        next ^= 1;
    }
    if next & 0x4000 != 0 {
        next ^= 1;
    }
    next
}

/// Noise contribution for an already-stepped register.
#[inline]
pub fn noise(lfsr: u16, vol: u8) -> i8 {
    let v = vol as i8;
    if lfsr & 0x8000 != 0 {
        v.wrapping_neg()
    } else {
        v
    }
}
