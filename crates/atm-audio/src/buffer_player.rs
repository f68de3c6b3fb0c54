//! Consumes the double buffer at an arbitrary device rate.
//!
//! Stands in for a DMA engine: values are read at [`SINK_SAMPLE_RATE`] and
//! each half is refilled as soon as playback leaves it.

use atm_engine::{DoubleBuffer, Half, Renderer, BIAS, SINK_SAMPLES_PER_HALF, SINK_SAMPLE_RATE};

const FRAC_BITS: u32 = 16;
const TOTAL: u64 = (SINK_SAMPLES_PER_HALF * 2) as u64;

/// Slowest device rate accepted. Below it one device sample would skip a
/// whole half of the buffer.
pub const MIN_DEVICE_RATE: u32 = SINK_SAMPLE_RATE.div_ceil(SINK_SAMPLES_PER_HALF as u32);

pub struct BufferPlayer {
    buffer: DoubleBuffer,
    renderer: Renderer,
    /// Read position in sink values, 16.16 fixed point.
    pos: u64,
    step: u64,
}

impl BufferPlayer {
    /// Prime both halves and prepare to play at `device_rate` Hz, raised to
    /// [`MIN_DEVICE_RATE`] if lower.
    pub fn new(mut renderer: Renderer, device_rate: u32) -> Self {
        let mut buffer = DoubleBuffer::new();
        buffer.prime(&mut renderer);
        let rate = device_rate.max(MIN_DEVICE_RATE);
        let step = ((SINK_SAMPLE_RATE as u64) << FRAC_BITS) / rate as u64;
        Self { buffer, renderer, pos: 0, step }
    }

    fn half_at(index: usize) -> Half {
        if index < SINK_SAMPLES_PER_HALF {
            Half::First
        } else {
            Half::Second
        }
    }

    /// Next device sample in -1.0..1.0.
    pub fn next_sample(&mut self) -> f32 {
        let index = (self.pos >> FRAC_BITS) as usize;
        let value = self.buffer.as_slice()[index];
        let current = Self::half_at(index);

        self.pos = (self.pos + self.step) % (TOTAL << FRAC_BITS);
        if Self::half_at((self.pos >> FRAC_BITS) as usize) == current.other() {
            self.buffer.refill(current, &mut self.renderer);
        }

        (value as f32 - BIAS as f32) / BIAS as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atm_engine::Engine;

    #[test]
    fn converts_around_bias() {
        let engine = Engine::new();
        engine.shared().oscillators[1].set_vol(32);
        let mut player = BufferPlayer::new(engine.renderer(), SINK_SAMPLE_RATE);
        assert_eq!(player.next_sample(), 0.25);
    }

    #[test]
    fn silent_engine_plays_zero() {
        let engine = Engine::new();
        let mut player = BufferPlayer::new(engine.renderer(), 48_000);
        assert!((0..2000).all(|_| player.next_sample() == 0.0));
    }

    #[test]
    fn refills_each_half_once_consumed() {
        let engine = Engine::new();
        let clock = &engine.shared().clock;
        clock.set_rate(250); // 125 logical samples per tick
        let mut player = BufferPlayer::new(engine.renderer(), SINK_SAMPLE_RATE);
        // priming renders 256 logical samples
        assert_eq!(clock.pending(), 2);

        for _ in 0..SINK_SAMPLES_PER_HALF - 1 {
            player.next_sample();
        }
        assert_eq!(clock.pending(), 2);
        player.next_sample();
        // first half refilled: 384 logical samples
        assert_eq!(clock.pending(), 3);

        for _ in 0..SINK_SAMPLES_PER_HALF {
            player.next_sample();
        }
        // second half refilled and playback wrapped: 512 logical samples
        assert_eq!(clock.pending(), 4);
    }

    #[test]
    fn very_slow_device_is_clamped() {
        let engine = Engine::new();
        let clock = &engine.shared().clock;
        clock.set_rate(250);
        let mut player = BufferPlayer::new(engine.renderer(), 10);
        for _ in 0..100 {
            assert_eq!(player.next_sample(), 0.0);
        }
        // a step of ~255 sink values: every sample after the first crosses
        // into the other half, so 256 + 99 * 128 logical samples
        assert_eq!(clock.pending(), (256 + 99 * 128) / 125);
    }

    #[test]
    fn slower_device_consumes_proportionally() {
        let engine = Engine::new();
        let clock = &engine.shared().clock;
        clock.set_rate(250);
        let mut player = BufferPlayer::new(engine.renderer(), SINK_SAMPLE_RATE / 2);
        for _ in 0..SINK_SAMPLES_PER_HALF / 2 {
            player.next_sample();
        }
        assert_eq!(clock.pending(), 3);
    }
}
