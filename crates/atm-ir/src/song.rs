//! Song model.

use alloc::vec::Vec;

/// Number of sequencer channels (and oscillators).
pub const CHANNELS: usize = 4;

/// An immutable, loaded song.
///
/// Holds the raw bytes together with the decoded header. Track positions
/// are absolute indices into [`Song::data`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    data: Vec<u8>,
    track_offsets: Vec<u16>,
    start_tracks: [u8; CHANNELS],
    track_base: usize,
}

impl Song {
    /// Assemble a song from already-validated parts.
    ///
    /// `track_base` is the index in `data` of the first track byte; track
    /// offsets are relative to it.
    pub fn from_parts(
        data: Vec<u8>,
        track_offsets: Vec<u16>,
        start_tracks: [u8; CHANNELS],
        track_base: usize,
    ) -> Self {
        Self { data, track_offsets, start_tracks, track_base }
    }

    /// Raw song bytes, header included.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn track_count(&self) -> usize {
        self.track_offsets.len()
    }

    pub fn track_offsets(&self) -> &[u16] {
        &self.track_offsets
    }

    pub fn track_base(&self) -> usize {
        self.track_base
    }

    /// Entry track for a channel.
    pub fn start_track(&self, channel: usize) -> u8 {
        self.start_tracks[channel]
    }

    pub fn start_tracks(&self) -> [u8; CHANNELS] {
        self.start_tracks
    }

    /// Absolute position of a track's first command byte.
    pub fn track_start(&self, track: u8) -> Option<usize> {
        self.track_offsets
            .get(track as usize)
            .map(|&offset| self.track_base + offset as usize)
    }

    /// Byte at an absolute position.
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.data.get(pos).copied()
    }

    /// Bytes from an absolute position to the end of the song.
    pub fn tail(&self, pos: usize) -> &[u8] {
        self.data.get(pos..).unwrap_or(&[])
    }
}
