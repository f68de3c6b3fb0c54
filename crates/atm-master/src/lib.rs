//! Headless controller for the ATM chiptune engine.
//!
//! [`Synth`] is the public handle: it owns a worker thread running the
//! [`ControlLoop`], which owns the engine and the audio sink. Offline
//! rendering and WAV export share the same engine.

mod command;
mod config;
mod control;
mod render;
mod synth;
mod wav;

pub use command::Command;
pub use config::{SynthConfig, MIN_QUEUE_CAPACITY};
pub use control::{ControlLoop, Flow, PlayState};
pub use render::{render_song, render_to_wav};
pub use synth::{Synth, SynthError};
pub use wav::{samples_to_wav, write_wav};

// Re-export common types so callers don't need the lower crates directly.
pub use atm_audio::{AudioError, AudioSink, CpalSink, Speaker};
pub use atm_engine::{SequencerError, LOGICAL_SAMPLE_RATE};
pub use atm_formats::{load_song, FormatError};
pub use atm_ir::{Song, SongBuilder, TrackBuilder, CHANNELS};
