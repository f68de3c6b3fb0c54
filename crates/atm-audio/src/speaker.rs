//! Exclusive ownership of the speaker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Capability to own the speaker. Clones share the same speaker.
#[derive(Clone, Debug, Default)]
pub struct Speaker {
    owned: Arc<AtomicBool>,
}

impl Speaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait up to `timeout` for the speaker to be free and take it.
    pub fn acquire(&self, timeout: Duration) -> Option<SpeakerGuard> {
        let deadline = Instant::now() + timeout;
        loop {
            if self
                .owned
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return Some(SpeakerGuard { owned: Arc::clone(&self.owned) });
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owned.load(Ordering::Relaxed)
    }
}

/// Releases the speaker when dropped.
#[derive(Debug)]
pub struct SpeakerGuard {
    owned: Arc<AtomicBool>,
}

impl Drop for SpeakerGuard {
    fn drop(&mut self) {
        self.owned.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_owner() {
        let speaker = Speaker::new();
        let guard = speaker.acquire(Duration::ZERO).unwrap();
        assert!(speaker.is_owned());
        assert!(speaker.clone().acquire(Duration::from_millis(5)).is_none());
        drop(guard);
        assert!(!speaker.is_owned());
        assert!(speaker.acquire(Duration::ZERO).is_some());
    }

    #[test]
    fn waits_for_release() {
        let speaker = Speaker::new();
        let guard = speaker.acquire(Duration::ZERO).unwrap();
        let other = speaker.clone();
        let waiter = thread::spawn(move || other.acquire(Duration::from_secs(5)).is_some());
        thread::sleep(Duration::from_millis(20));
        drop(guard);
        assert!(waiter.join().unwrap());
    }
}
