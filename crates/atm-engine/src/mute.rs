//! Per-channel mute and finished flags.

use atm_ir::CHANNELS;

/// Low nibble: channel muted. High nibble: channel still running.
///
/// A channel clears its high bit when it executes the stop effect; once the
/// whole high nibble is clear the song is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MuteMask(u8);

impl MuteMask {
    pub const DEFAULT: MuteMask = MuteMask(0xF0);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_muted(self, channel: usize) -> bool {
        self.0 & (1 << channel) != 0
    }

    pub fn mute(&mut self, channel: usize) {
        debug_assert!(channel < CHANNELS);
        self.0 |= 1 << channel;
    }

    pub fn unmute(&mut self, channel: usize) {
        debug_assert!(channel < CHANNELS);
        self.0 &= !(1 << channel);
    }

    /// Mark a channel as finished.
    pub fn finish(&mut self, channel: usize) {
        debug_assert!(channel < CHANNELS);
        self.0 &= !(1 << (channel + 4));
    }

    pub fn is_finished(self, channel: usize) -> bool {
        self.0 & (1 << (channel + 4)) == 0
    }

    pub fn all_finished(self) -> bool {
        self.0 & 0xF0 == 0
    }
}

impl Default for MuteMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}
