//! CPAL-based audio sink.

use std::time::Duration;

use atm_engine::Renderer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use tracing::{error, info};

use crate::buffer_player::BufferPlayer;
use crate::speaker::{Speaker, SpeakerGuard};
use crate::traits::{AudioError, AudioSink};

/// How long [`CpalSink::acquire`](AudioSink::acquire) waits for the speaker.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_millis(200);

struct ActiveStream {
    stream: Stream,
    _guard: SpeakerGuard,
}

/// Plays the engine on the default output device.
///
/// The device is looked up on every acquire so a sink created while no
/// device is present starts working once one appears.
pub struct CpalSink {
    speaker: Speaker,
    acquire_timeout: Duration,
    active: Option<ActiveStream>,
}

impl CpalSink {
    pub fn new(speaker: Speaker) -> Self {
        Self { speaker, acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT, active: None }
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    fn build_stream(renderer: Renderer) -> Result<Stream, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config: StreamConfig = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?
            .into();
        let channels = config.channels as usize;
        let rate = config.sample_rate.0;

        let mut player = BufferPlayer::new(renderer, rate);
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    // Mono engine: same value on every channel of a frame
                    for frame in data.chunks_mut(channels) {
                        frame.fill(player.next_sample());
                    }
                },
                |err| error!(%err, "audio stream error"),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        info!(device = ?device.name().ok(), rate, channels, "audio stream started");
        Ok(stream)
    }
}

impl AudioSink for CpalSink {
    fn acquire(&mut self, renderer: Renderer) -> Result<(), AudioError> {
        self.release();
        let guard = self
            .speaker
            .acquire(self.acquire_timeout)
            .ok_or(AudioError::SpeakerBusy)?;
        let stream = Self::build_stream(renderer)?;
        self.active = Some(ActiveStream { stream, _guard: guard });
        Ok(())
    }

    fn release(&mut self) {
        if let Some(active) = self.active.take() {
            if let Err(e) = active.stream.pause() {
                error!(%e, "failed to pause audio stream");
            }
            info!("audio stream released");
        }
    }

    fn is_acquired(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        self.release();
    }
}
