//! Programmatic song assembly.
//!
//! Useful for tests, demos and tools that generate music procedurally.
//!
//! ```
//! use atm_ir::{SongBuilder, TrackBuilder};
//!
//! let song = SongBuilder::new()
//!     .track(TrackBuilder::new().set_volume(40).note(25).delay(8).stop())
//!     .build();
//! assert_eq!(song.track_count(), 1);
//! ```

use alloc::vec::Vec;

use crate::opcode::{self, Fx};
use crate::song::{Song, CHANNELS};
use crate::vle;

/// Largest delay a single delay command can hold (0xFFFF marks a halted channel).
const MAX_SINGLE_DELAY: u32 = 0xFFFE;

/// Bytecode for one track.
#[derive(Clone, Debug, Default)]
pub struct TrackBuilder {
    bytes: Vec<u8>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Append raw bytes verbatim.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Note on. Values above 63 are clamped.
    pub fn note(mut self, note: u8) -> Self {
        self.bytes.push(note.min(crate::MAX_NOTE));
        self
    }

    pub fn rest(self) -> Self {
        self.note(0)
    }

    /// Wait `ticks` ticks, choosing short or long delays as needed.
    pub fn delay(mut self, ticks: u32) -> Self {
        let mut remaining = ticks;
        while remaining > 0 {
            let chunk = remaining.min(MAX_SINGLE_DELAY);
            if chunk <= 64 {
                self.bytes.push(opcode::DELAY_BASE + (chunk as u8 - 1));
            } else {
                self.bytes.push(opcode::LONG_DELAY);
                self.bytes
                    .extend_from_slice(&vle::encode(chunk - opcode::LONG_DELAY_BIAS as u32));
            }
            remaining -= chunk;
        }
        self
    }

    fn fx(mut self, fx: Fx, operands: &[u8]) -> Self {
        debug_assert_eq!(fx.operand_len(), operands.len());
        self.bytes.push(fx.command_byte());
        self.bytes.extend_from_slice(operands);
        self
    }

    pub fn set_volume(self, volume: u8) -> Self {
        self.fx(Fx::SetVolume, &[volume])
    }

    pub fn slide_volume(self, delta: i8) -> Self {
        self.fx(Fx::SlideVolume, &[delta as u8])
    }

    /// `config`: bits 0–5 period, bit 7 disables clamping.
    pub fn slide_volume_advanced(self, delta: i8, config: u8) -> Self {
        self.fx(Fx::SlideVolumeAdvanced, &[delta as u8, config])
    }

    pub fn stop_volume_slide(self) -> Self {
        self.fx(Fx::StopVolumeSlide, &[])
    }

    pub fn slide_frequency(self, delta: i8) -> Self {
        self.fx(Fx::SlideFrequency, &[delta as u8])
    }

    /// `config`: bits 0–5 period, bit 6 must be set to target frequency, bit 7 disables clamping.
    pub fn slide_frequency_advanced(self, delta: i8, config: u8) -> Self {
        self.fx(Fx::SlideFrequencyAdvanced, &[delta as u8, config])
    }

    pub fn stop_frequency_slide(self) -> Self {
        self.fx(Fx::StopFrequencySlide, &[])
    }

    /// `notes`: high nibble = second step offset, low nibble = third step offset.
    /// `timing`: bits 0–4 ticks per step, bit 5 restart on note, bit 6 two steps only.
    pub fn arpeggio(self, notes: u8, timing: u8) -> Self {
        self.fx(Fx::SetArpeggio, &[notes, timing])
    }

    pub fn stop_arpeggio(self) -> Self {
        self.fx(Fx::StopArpeggio, &[])
    }

    /// `config`: bits 0–1 period, bits 2–7 note.
    pub fn retrigger(self, config: u8) -> Self {
        self.fx(Fx::SetRetrigger, &[config])
    }

    pub fn stop_retrigger(self) -> Self {
        self.fx(Fx::StopRetrigger, &[])
    }

    pub fn add_transpose(self, semitones: i8) -> Self {
        self.fx(Fx::AddTranspose, &[semitones as u8])
    }

    pub fn set_transpose(self, semitones: i8) -> Self {
        self.fx(Fx::SetTranspose, &[semitones as u8])
    }

    pub fn stop_transpose(self) -> Self {
        self.fx(Fx::StopTranspose, &[])
    }

    /// `config`: bits 0–4 period.
    pub fn tremolo(self, depth: u8, config: u8) -> Self {
        self.fx(Fx::SetTremolo, &[depth, config])
    }

    pub fn stop_tremolo(self) -> Self {
        self.fx(Fx::StopTremolo, &[])
    }

    /// `config`: bits 0–4 period.
    pub fn vibrato(self, depth: u8, config: u8) -> Self {
        self.fx(Fx::SetVibrato, &[depth, config])
    }

    pub fn stop_vibrato(self) -> Self {
        self.fx(Fx::StopVibrato, &[])
    }

    /// `config`: bits 0–6 period, bit 7 slides downwards.
    pub fn glissando(self, config: u8) -> Self {
        self.fx(Fx::SetGlissando, &[config])
    }

    pub fn stop_glissando(self) -> Self {
        self.fx(Fx::StopGlissando, &[])
    }

    /// Percussive arpeggio that alternates the note with silence.
    pub fn note_cut(self, timing: u8) -> Self {
        self.fx(Fx::SetNoteCut, &[timing])
    }

    pub fn stop_note_cut(self) -> Self {
        self.fx(Fx::StopNoteCut, &[])
    }

    pub fn add_tempo(self, delta: i8) -> Self {
        self.fx(Fx::AddTempo, &[delta as u8])
    }

    pub fn set_tempo(self, ticks_per_second: u8) -> Self {
        self.fx(Fx::SetTempo, &[ticks_per_second])
    }

    /// Track each channel restarts from when the whole song finishes.
    pub fn repeat_point(self, tracks: [u8; CHANNELS]) -> Self {
        self.fx(Fx::SetRepeatPoint, &tracks)
    }

    /// Mark the channel finished and halt it.
    pub fn stop(self) -> Self {
        self.fx(Fx::Stop, &[])
    }

    /// Call `track` and return after one pass.
    pub fn call(mut self, track: u8) -> Self {
        self.bytes.extend_from_slice(&[opcode::CALL, track]);
        self
    }

    /// Call `track` and play it `repeats + 1` times before returning.
    pub fn call_repeat(mut self, track: u8, repeats: u8) -> Self {
        self.bytes.extend_from_slice(&[opcode::CALL_REPEAT, repeats, track]);
        self
    }

    /// Loop the current track or return to the caller.
    pub fn ret(mut self) -> Self {
        self.bytes.push(opcode::RETURN);
        self
    }

    /// Skip `offset` bytes past the end of this instruction.
    pub fn jump(mut self, offset: u32) -> Self {
        self.bytes.push(opcode::JUMP);
        self.bytes.extend_from_slice(&vle::encode(offset));
        self
    }
}

/// Assembles tracks into the binary song layout.
#[derive(Clone, Debug, Default)]
pub struct SongBuilder {
    tracks: Vec<TrackBuilder>,
    start_tracks: [u8; CHANNELS],
}

impl SongBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track; tracks are numbered in insertion order.
    pub fn track(mut self, track: TrackBuilder) -> Self {
        self.tracks.push(track);
        self
    }

    /// Entry track per channel (all zero by default).
    pub fn start_tracks(mut self, tracks: [u8; CHANNELS]) -> Self {
        self.start_tracks = tracks;
        self
    }

    fn offsets(&self) -> Vec<u16> {
        let mut offsets = Vec::with_capacity(self.tracks.len());
        let mut offset = 0usize;
        for track in &self.tracks {
            assert!(offset <= u16::MAX as usize, "track data exceeds 64 KiB");
            offsets.push(offset as u16);
            offset += track.len();
        }
        offsets
    }

    /// Serialize to the on-disk layout:
    /// `count, u16le offsets[count], start_tracks[4], track bytes`.
    ///
    /// # Panics
    ///
    /// Panics with more than 255 tracks or more than 64 KiB of track data.
    pub fn to_bytes(&self) -> Vec<u8> {
        assert!(self.tracks.len() <= u8::MAX as usize, "too many tracks");
        let offsets = self.offsets();
        let mut out = Vec::new();
        out.push(self.tracks.len() as u8);
        for offset in &offsets {
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend_from_slice(&self.start_tracks);
        for track in &self.tracks {
            out.extend_from_slice(track.bytes());
        }
        out
    }

    /// Build the in-memory song directly.
    ///
    /// # Panics
    ///
    /// Same conditions as [`SongBuilder::to_bytes`].
    pub fn build(&self) -> Song {
        let offsets = self.offsets();
        let track_base = 1 + offsets.len() * 2 + CHANNELS;
        Song::from_parts(self.to_bytes(), offsets, self.start_tracks, track_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    #[test]
    fn short_and_long_delays() {
        let t = TrackBuilder::new().delay(1).delay(64).delay(65).delay(300);
        assert_eq!(t.bytes()[0], 160);
        assert_eq!(t.bytes()[1], 223);
        assert_eq!(&t.bytes()[2..4], &[224, 0]);
        assert_eq!(t.bytes()[4], 224);
        assert_eq!(vle::decode(&t.bytes()[5..]), Some((235, 2)));
    }

    #[test]
    fn huge_delay_is_split() {
        let t = TrackBuilder::new().delay(MAX_SINGLE_DELAY + 10);
        assert_eq!(t.bytes()[0], opcode::LONG_DELAY);
        assert_eq!(*t.bytes().last().unwrap(), opcode::DELAY_BASE + 9);
    }

    #[test]
    fn zero_delay_emits_nothing() {
        assert!(TrackBuilder::new().delay(0).is_empty());
    }

    #[test]
    fn effects_encode_with_operands() {
        let t = TrackBuilder::new().set_volume(40).repeat_point([1, 2, 3, 4]).stop();
        assert_eq!(t.bytes(), &[64, 40, 64 + 94, 1, 2, 3, 4, 64 + 95]);
        assert_eq!(Opcode::decode(t.bytes()[2]), Opcode::Effect(Fx::SetRepeatPoint));
    }

    #[test]
    fn calls_encode_operands_in_order() {
        let t = TrackBuilder::new().call(3).call_repeat(2, 5).ret();
        assert_eq!(t.bytes(), &[252, 3, 253, 5, 2, 254]);
    }

    #[test]
    fn song_layout() {
        let builder = SongBuilder::new()
            .track(TrackBuilder::new().note(1).delay(1))
            .track(TrackBuilder::new().stop())
            .start_tracks([0, 1, 1, 1]);
        let bytes = builder.to_bytes();
        assert_eq!(bytes, [2, 0, 0, 2, 0, 0, 1, 1, 1, 1, 160, 64 + 95]);

        let song = builder.build();
        assert_eq!(song.track_base(), 9);
        assert_eq!(song.track_start(1), Some(11));
        assert_eq!(song.byte_at(11), Some(64 + 95));
        assert_eq!(song.start_tracks(), [0, 1, 1, 1]);
    }
}
