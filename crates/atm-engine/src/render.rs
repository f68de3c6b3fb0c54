//! Sample renderer / mixer.
//!
//! Runs on the audio thread. Must not block, lock or allocate.

use std::sync::Arc;

use crate::double_buffer::OVERSAMPLE;
use crate::oscillator::{noise, noise_step, pulse, square, triangle, NOISE_CHANNEL};
use crate::shared::SharedState;

/// Output value for silence.
pub const BIAS: u8 = 128;

/// Scale a wrapped 8-bit mix around the bias point and clamp to 0..=255.
#[inline]
pub fn apply_master_volume(mix: i8, volume: f32) -> u8 {
    let centered = mix as f32 * volume;
    let out = (BIAS as f32 + centered) as i16;
    out.clamp(0, u8::MAX as i16) as u8
}

/// Produces samples from the shared oscillator bank and drives the tick clock.
pub struct Renderer {
    shared: Arc<SharedState>,
    phases: [u16; 3],
    tick_accumulator: u32,
}

impl Renderer {
    pub fn new(shared: Arc<SharedState>) -> Self {
        Self {
            shared,
            phases: [0; 3],
            tick_accumulator: 0,
        }
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    /// Mix one logical sample and advance the tick clock by one sample.
    #[inline]
    pub fn render_sample(&mut self) -> u8 {
        let osc = &self.shared.oscillators;

        self.phases[2] = self.phases[2].wrapping_add(osc[2].freq());
        let mut mix = triangle(self.phases[2], osc[2].vol());

        self.phases[0] = self.phases[0].wrapping_add(osc[0].freq());
        mix = mix.wrapping_add(pulse(self.phases[0], osc[0].vol()));

        self.phases[1] = self.phases[1].wrapping_add(osc[1].freq());
        mix = mix.wrapping_add(square(self.phases[1], osc[1].vol()));

        let noise_osc = &osc[NOISE_CHANNEL];
        let lfsr = noise_step(noise_osc.freq());
        noise_osc.set_freq(lfsr);
        mix = mix.wrapping_add(noise(lfsr, noise_osc.vol()));

        let out = apply_master_volume(mix, self.shared.master_volume());
        self.shared.clock.advance(&mut self.tick_accumulator);
        out
    }

    /// Fill a sink buffer, writing each logical sample [`OVERSAMPLE`] times.
    ///
    /// While paused the buffer is filled with [`BIAS`] and the clock stands still.
    pub fn fill(&mut self, dst: &mut [u8]) {
        #[cfg(feature = "alloc_check")]
        {
            assert_no_alloc::assert_no_alloc(|| self.fill_inner(dst));
        }
        #[cfg(not(feature = "alloc_check"))]
        self.fill_inner(dst);
    }

    fn fill_inner(&mut self, dst: &mut [u8]) {
        let paused = self.shared.is_paused();
        for chunk in dst.chunks_mut(OVERSAMPLE) {
            let sample = if paused { BIAS } else { self.render_sample() };
            chunk.fill(sample);
        }
    }
}
