//! State shared between the control thread and the audio thread.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::clock::TickClock;
use crate::oscillator::OscillatorBank;

/// Everything the renderer reads. One writer per field.
#[derive(Debug)]
pub struct SharedState {
    pub oscillators: OscillatorBank,
    pub clock: TickClock,
    master_volume: AtomicU32,
    paused: AtomicBool,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            oscillators: OscillatorBank::new(),
            clock: TickClock::new(),
            master_volume: AtomicU32::new(1.0f32.to_bits()),
            paused: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn master_volume(&self) -> f32 {
        f32::from_bits(self.master_volume.load(Ordering::Relaxed))
    }

    /// Store a master volume, clamped to 0.0..=1.0 (NaN becomes 0).
    pub fn set_master_volume(&self, volume: f32) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.master_volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
