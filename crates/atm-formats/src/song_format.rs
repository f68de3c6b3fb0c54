//! Song header parsing and validation.

use atm_ir::{Song, CHANNELS};
use binrw::io::Cursor;
use binrw::BinRead;

use crate::FormatError;

#[derive(BinRead, Debug)]
#[br(little)]
struct SongHeader {
    track_count: u8,
    #[br(count = track_count as usize)]
    track_offsets: Vec<u16>,
    start_tracks: [u8; CHANNELS],
}

/// Load a song from bytes.
pub fn load_song(data: &[u8]) -> Result<Song, FormatError> {
    let mut cursor = Cursor::new(data);
    let header = SongHeader::read(&mut cursor)?;
    let track_base = cursor.position() as usize;

    if header.track_count == 0 {
        return Err(FormatError::NoTracks);
    }

    let available = data.len() - track_base;
    for (track, &offset) in header.track_offsets.iter().enumerate() {
        if offset as usize > available {
            return Err(FormatError::TrackOutOfBounds { track, offset, available });
        }
    }

    let count = header.track_offsets.len();
    for (channel, &track) in header.start_tracks.iter().enumerate() {
        if track as usize >= count {
            return Err(FormatError::MissingStartTrack { channel, track, count });
        }
    }

    Ok(Song::from_parts(
        data.to_vec(),
        header.track_offsets,
        header.start_tracks,
        track_base,
    ))
}
