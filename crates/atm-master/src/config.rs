//! Worker configuration.

use std::time::Duration;

/// Smallest command queue the worker accepts.
pub const MIN_QUEUE_CAPACITY: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthConfig {
    /// Command queue slots; raised to [`MIN_QUEUE_CAPACITY`] if smaller.
    pub queue_capacity: usize,
    /// How long a façade call waits for a free queue slot.
    pub submit_timeout: Duration,
    /// How long the worker waits for a command when no tick is pending.
    pub poll_interval: Duration,
    /// Delay between sink acquisition attempts while a song is active.
    pub retry_interval: Duration,
    /// Bound on waiting for the worker to acknowledge shutdown.
    pub shutdown_timeout: Duration,
}

impl SynthConfig {
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.max(MIN_QUEUE_CAPACITY)
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            queue_capacity: MIN_QUEUE_CAPACITY,
            submit_timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(10),
            retry_interval: Duration::from_millis(500),
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_capacity_has_floor() {
        let config = SynthConfig { queue_capacity: 2, ..Default::default() };
        assert_eq!(config.queue_capacity(), MIN_QUEUE_CAPACITY);
        let config = SynthConfig { queue_capacity: 32, ..Default::default() };
        assert_eq!(config.queue_capacity(), 32);
    }
}
