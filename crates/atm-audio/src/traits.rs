//! Audio sink trait and error types.

use atm_engine::Renderer;

/// Error type for audio operations.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio device available")]
    NoDevice,
    #[error("device init error: {0}")]
    DeviceInit(String),
    #[error("stream create error: {0}")]
    StreamCreate(String),
    #[error("playback error: {0}")]
    Playback(String),
    #[error("speaker is owned by someone else")]
    SpeakerBusy,
}

/// An exclusive output the control loop acquires while a song plays.
pub trait AudioSink {
    /// Take the output and start pulling samples from `renderer`.
    ///
    /// Acquiring an already acquired sink replaces its renderer.
    fn acquire(&mut self, renderer: Renderer) -> Result<(), AudioError>;

    /// Stop playback and give the output back. No-op when not acquired.
    fn release(&mut self);

    fn is_acquired(&self) -> bool;
}
