//! Built-in demo tune exercising every channel and most effects.

use atm_ir::{SongBuilder, TrackBuilder};

const LEAD: u8 = 0;
const BASS: u8 = 1;
const PAD: u8 = 2;
const DRUMS: u8 = 3;
const PHRASE_A: u8 = 4;
const PHRASE_B: u8 = 5;
const BASS_LINE: u8 = 6;
const PAD_CHORDS: u8 = 7;
const BEAT: u8 = 8;

/// About four seconds of music; every channel stops at the end.
pub fn demo_song() -> SongBuilder {
    let lead = TrackBuilder::new()
        .set_tempo(30)
        .set_volume(36)
        .call_repeat(PHRASE_A, 1)
        .call(PHRASE_B)
        .stop();

    let bass = TrackBuilder::new().set_volume(44).call_repeat(BASS_LINE, 3).stop();

    let pad = TrackBuilder::new()
        .set_volume(60)
        .tremolo(6, 0x05)
        .call_repeat(PAD_CHORDS, 1)
        .stop();

    let drums = TrackBuilder::new().call_repeat(BEAT, 7).stop();

    let phrase_a = [13, 17, 20, 17, 22, 20, 17, 15]
        .into_iter()
        .fold(TrackBuilder::new(), |t, note| t.note(note).delay(4))
        .ret();

    let phrase_b = TrackBuilder::new()
        .arpeggio(0x47, 0x21)
        .note(13)
        .delay(8)
        .note(18)
        .delay(8)
        .stop_arpeggio()
        .glissando(0x81)
        .note(25)
        .delay(8)
        .stop_glissando()
        .slide_volume(-2)
        .note(20)
        .delay(8)
        .stop_volume_slide()
        .ret();

    let bass_line = [1, 8, 6, 8]
        .into_iter()
        .fold(TrackBuilder::new(), |t, note| t.note(note).delay(6))
        .ret();

    let pad_chords = TrackBuilder::new().note(25).delay(24).note(30).delay(24).ret();

    let beat = TrackBuilder::new()
        .retrigger((48 << 2) | 0x01)
        .set_volume(50)
        .delay(2)
        .stop_retrigger()
        .set_volume(0)
        .delay(4)
        .set_volume(30)
        .delay(2)
        .set_volume(0)
        .delay(4)
        .ret();

    SongBuilder::new()
        .track(lead)
        .track(bass)
        .track(pad)
        .track(drums)
        .track(phrase_a)
        .track(phrase_b)
        .track(bass_line)
        .track(pad_chords)
        .track(beat)
        .start_tracks([LEAD, BASS, PAD, DRUMS])
}
