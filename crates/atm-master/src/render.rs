//! Offline rendering: the engine and renderer driven in lockstep.

use std::sync::Arc;

use atm_engine::{Engine, SequencerError, TickOutcome, LOGICAL_SAMPLE_RATE};
use atm_ir::Song;

use crate::wav;

/// Render up to `max_samples` logical samples (8-bit unsigned at
/// [`LOGICAL_SAMPLE_RATE`]). Stops early when the song ends.
///
/// Ticks run as soon as the renderer raises them, so the output matches
/// what a sink would hear.
pub fn render_song(song: Arc<Song>, max_samples: usize) -> Result<Vec<u8>, SequencerError> {
    let mut engine = Engine::new();
    let mut renderer = engine.renderer();
    engine.play(song)?;

    let mut samples = Vec::with_capacity(max_samples);
    while samples.len() < max_samples {
        samples.push(renderer.render_sample());
        while engine.shared().clock.take_pending() {
            if engine.tick()? == TickOutcome::Finished {
                engine.stop();
                return Ok(samples);
            }
        }
    }
    engine.stop();
    Ok(samples)
}

/// Render at most `max_seconds` of a song as a WAV file.
pub fn render_to_wav(song: Arc<Song>, max_seconds: u32) -> Result<Vec<u8>, SequencerError> {
    let max_samples = (LOGICAL_SAMPLE_RATE * max_seconds) as usize;
    let samples = render_song(song, max_samples)?;
    Ok(wav::samples_to_wav(&samples, LOGICAL_SAMPLE_RATE))
}
