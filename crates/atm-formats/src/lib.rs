//! Binary song loader for the ATM chiptune engine.
//!
//! Layout (little-endian):
//!
//! ```text
//! u8        track_count
//! u16[n]    track_offsets   (relative to the first track byte)
//! u8[4]     start_tracks    (entry track per channel)
//! u8[]      track bytes
//! ```

mod song_format;

pub use song_format::load_song;

/// Error type for song parsing.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Header could not be read
    #[error("malformed song header: {0}")]
    Header(#[from] binrw::Error),
    /// The song declares no tracks
    #[error("song has no tracks")]
    NoTracks,
    /// A track offset points past the end of the data
    #[error("track {track} starts at offset {offset}, past the {available}-byte track area")]
    TrackOutOfBounds { track: usize, offset: u16, available: usize },
    /// A channel's entry track does not exist
    #[error("channel {channel} starts on track {track} but the song has {count} tracks")]
    MissingStartTrack { channel: usize, track: u8, count: usize },
}
