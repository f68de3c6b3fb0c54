//! Tick clock: converts a tick rate into a sample-count divisor and carries
//! elapsed ticks from the renderer to the control thread.

use core::sync::atomic::{AtomicU32, Ordering};

/// Rate at which the renderer produces logical samples.
pub const LOGICAL_SAMPLE_RATE: u32 = 31_250;

/// Tick rate every song starts with (ticks per second).
pub const DEFAULT_TICK_RATE: u8 = 25;

/// Samples per tick for a tick rate; a rate of 0 is treated as 1.
pub const fn tick_divisor(tick_rate: u8) -> u32 {
    let rate = if tick_rate == 0 { 1 } else { tick_rate as u32 };
    LOGICAL_SAMPLE_RATE / rate
}

#[derive(Debug)]
pub struct TickClock {
    divisor: AtomicU32,
    pending: AtomicU32,
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            divisor: AtomicU32::new(tick_divisor(DEFAULT_TICK_RATE)),
            pending: AtomicU32::new(0),
        }
    }

    pub fn set_rate(&self, tick_rate: u8) {
        self.divisor.store(tick_divisor(tick_rate), Ordering::Relaxed);
    }

    pub fn divisor(&self) -> u32 {
        self.divisor.load(Ordering::Relaxed)
    }

    /// Renderer side: count one sample into `accumulator`, raising a pending
    /// tick when a full tick has elapsed. Returns true if a tick was raised.
    #[inline]
    pub fn advance(&self, accumulator: &mut u32) -> bool {
        *accumulator += 1;
        if *accumulator >= self.divisor() {
            *accumulator = 0;
            self.pending.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Control side: consume one pending tick if any.
    pub fn take_pending(&self) -> bool {
        if self.pending.load(Ordering::Relaxed) == 0 {
            return false;
        }
        self.pending.fetch_sub(1, Ordering::Relaxed);
        true
    }

    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn clear_pending(&self) {
        self.pending.store(0, Ordering::Relaxed);
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_divisor() {
        assert_eq!(tick_divisor(DEFAULT_TICK_RATE), 1250);
        assert_eq!(TickClock::new().divisor(), 1250);
    }

    #[test]
    fn zero_rate_treated_as_one() {
        assert_eq!(tick_divisor(0), LOGICAL_SAMPLE_RATE);
        assert_eq!(tick_divisor(1), LOGICAL_SAMPLE_RATE);
    }

    #[test]
    fn divisor_positive_and_monotonic() {
        let mut prev = u32::MAX;
        for rate in 1..=u8::MAX {
            let d = tick_divisor(rate);
            assert!(d > 0);
            assert!(d <= prev, "rate {rate}: {d} > {prev}");
            prev = d;
        }
        assert!(tick_divisor(2) < tick_divisor(1));
        assert!(tick_divisor(255) < tick_divisor(100));
    }

    #[test]
    fn advance_raises_tick_every_divisor_samples() {
        let clock = TickClock::new();
        clock.set_rate(250); // 125 samples per tick
        let mut acc = 0;
        let raised = (0..1000).filter(|_| clock.advance(&mut acc)).count();
        assert_eq!(raised, 8);
        assert_eq!(clock.pending(), 8);
        assert_eq!(acc, 0);
    }

    #[test]
    fn take_pending_drains_one_at_a_time() {
        let clock = TickClock::new();
        let mut acc = 0;
        for _ in 0..(2 * clock.divisor()) {
            clock.advance(&mut acc);
        }
        assert!(clock.take_pending());
        assert_eq!(clock.pending(), 1);
        assert!(clock.take_pending());
        assert!(!clock.take_pending());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn rate_change_applies_to_next_sample() {
        let clock = TickClock::new();
        let mut acc = 0;
        for _ in 0..100 {
            clock.advance(&mut acc);
        }
        clock.set_rate(255); // 122 samples per tick
        for _ in 0..21 {
            clock.advance(&mut acc);
        }
        assert_eq!(clock.pending(), 0);
        assert!(clock.advance(&mut acc));
    }
}
