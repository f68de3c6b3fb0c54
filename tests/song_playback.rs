//! End-to-end playback: songs serialized to bytes, loaded back, rendered
//! offline through the same engine and renderer a sink would use.

use std::sync::Arc;

use atm_engine::{tick_divisor, BIAS, DEFAULT_TICK_RATE, LOGICAL_SAMPLE_RATE};
use atm_ir::{Song, SongBuilder, TrackBuilder};
use atm_master::{load_song, render_song, render_to_wav, SequencerError};

fn from_bytes(builder: &SongBuilder) -> Arc<Song> {
    Arc::new(load_song(&builder.to_bytes()).unwrap())
}

fn quiet() -> TrackBuilder {
    TrackBuilder::new().stop()
}

#[test]
fn loaded_song_matches_built_song() {
    let builder = SongBuilder::new()
        .track(TrackBuilder::new().set_volume(30).call_repeat(4, 1).stop())
        .track(TrackBuilder::new().set_volume(20).note(13).delay(10).stop())
        .track(quiet())
        .track(quiet())
        .track(TrackBuilder::new().note(25).delay(3).ret())
        .start_tracks([0, 1, 2, 3]);

    let built = render_song(Arc::new(builder.build()), 100_000).unwrap();
    let loaded = render_song(from_bytes(&builder), 100_000).unwrap();
    assert_eq!(built, loaded);
}

#[test]
fn finite_song_stops_on_its_own() {
    let builder = SongBuilder::new()
        .track(TrackBuilder::new().set_volume(40).note(25).delay(4).stop())
        .track(quiet())
        .track(quiet())
        .track(quiet())
        .start_tracks([0, 1, 2, 3]);

    let samples = render_song(from_bytes(&builder), LOGICAL_SAMPLE_RATE as usize).unwrap();
    // Ticks 1..=4 hold the note; tick 5 stops the last channel
    let per_tick = tick_divisor(DEFAULT_TICK_RATE) as usize;
    assert_eq!(samples.len(), per_tick * 5);
    assert!(samples.iter().any(|&s| s != BIAS));
}

#[test]
fn looping_song_fills_the_limit() {
    let builder = SongBuilder::new()
        .track(TrackBuilder::new().set_volume(40).note(25).delay(4).ret())
        .track(quiet())
        .track(quiet())
        .track(quiet())
        .start_tracks([0, 1, 2, 3]);

    let samples = render_song(from_bytes(&builder), 50_000).unwrap();
    assert_eq!(samples.len(), 50_000);
}

#[test]
fn silent_song_renders_bias() {
    let builder = SongBuilder::new()
        .track(TrackBuilder::new().note(25).delay(2).stop())
        .track(quiet())
        .track(quiet())
        .track(quiet())
        .start_tracks([0, 1, 2, 3]);

    let samples = render_song(from_bytes(&builder), 10_000).unwrap();
    assert!(!samples.is_empty());
    assert!(samples.iter().all(|&s| s == BIAS));
}

#[test]
fn tempo_change_shortens_ticks() {
    let builder = SongBuilder::new()
        .track(TrackBuilder::new().set_tempo(50).set_volume(10).note(1).delay(4).stop())
        .track(quiet())
        .track(quiet())
        .track(quiet())
        .start_tracks([0, 1, 2, 3]);

    let samples = render_song(from_bytes(&builder), LOGICAL_SAMPLE_RATE as usize).unwrap();
    // The first tick arrives at the default rate, the rest at 50/s
    let expected = tick_divisor(DEFAULT_TICK_RATE) + tick_divisor(50) * 4;
    assert_eq!(samples.len(), expected as usize);
}

#[test]
fn faulting_song_reports_error() {
    let builder = SongBuilder::new()
        .track(TrackBuilder::new().raw(&[230]))
        .track(quiet())
        .track(quiet())
        .track(quiet())
        .start_tracks([0, 1, 2, 3]);

    let err = render_song(from_bytes(&builder), 10_000).unwrap_err();
    assert!(matches!(err, SequencerError::UndefinedOpcode { channel: 0, opcode: 230, .. }));
}

#[test]
fn wav_output_has_riff_header() {
    let builder = SongBuilder::new()
        .track(TrackBuilder::new().set_volume(40).note(25).delay(4).stop())
        .track(quiet())
        .track(quiet())
        .track(quiet())
        .start_tracks([0, 1, 2, 3]);

    let wav = render_to_wav(from_bytes(&builder), 1).unwrap();
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), LOGICAL_SAMPLE_RATE);
}
