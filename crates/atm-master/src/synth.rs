//! Public façade: a handle that forwards calls to the control loop worker.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use atm_audio::{AudioSink, CpalSink, Speaker};
use atm_ir::{Song, CHANNELS};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use tracing::{info, warn};

use crate::command::Command;
use crate::config::SynthConfig;
use crate::control::ControlLoop;

#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("command queue is full")]
    QueueFull,
    #[error("synth worker is not running")]
    Disconnected,
    #[error("channel {0} does not exist")]
    InvalidChannel(u8),
    #[error("synth worker did not acknowledge shutdown in time")]
    ShutdownTimeout,
    #[error("synth worker panicked")]
    WorkerPanicked,
    #[error("failed to spawn synth worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Handle to a running synth. Every call except [`Synth::init`] and
/// [`Synth::deinit`] only enqueues a command.
///
/// Dropping the handle shuts the worker down like `deinit`.
pub struct Synth {
    commands: Sender<Command>,
    ack: Receiver<()>,
    worker: Option<JoinHandle<()>>,
    config: SynthConfig,
}

impl Synth {
    /// Start the worker. `sink_factory` runs on the worker thread, so the
    /// sink itself need not be `Send`.
    pub fn init<S, F>(config: SynthConfig, sink_factory: F) -> Result<Self, SynthError>
    where
        S: AudioSink + 'static,
        F: FnOnce() -> S + Send + 'static,
    {
        let (commands, rx) = bounded(config.queue_capacity());
        let (ack_tx, ack) = bounded(1);
        let worker_config = config.clone();

        let worker = thread::Builder::new()
            .name("atm-synth".into())
            .spawn(move || {
                let sink = sink_factory();
                ControlLoop::new(sink, &worker_config).run(&rx, &ack_tx);
            })?;

        info!(queue_capacity = config.queue_capacity(), "synth started");
        Ok(Self { commands, ack, worker: Some(worker), config })
    }

    /// Start the worker with the default cpal output.
    pub fn with_default_output(config: SynthConfig, speaker: Speaker) -> Result<Self, SynthError> {
        Self::init(config, move || CpalSink::new(speaker))
    }

    pub fn play(&self, song: impl Into<Arc<Song>>) -> Result<(), SynthError> {
        self.send(Command::Play(song.into()))
    }

    pub fn stop(&self) -> Result<(), SynthError> {
        self.send(Command::Stop)
    }

    /// Toggle pause. Ignored unless a song is playing or paused.
    pub fn play_pause(&self) -> Result<(), SynthError> {
        self.send(Command::TogglePause)
    }

    pub fn mute_channel(&self, channel: u8) -> Result<(), SynthError> {
        Self::check_channel(channel)?;
        self.send(Command::Mute(channel))
    }

    pub fn unmute_channel(&self, channel: u8) -> Result<(), SynthError> {
        Self::check_channel(channel)?;
        self.send(Command::Unmute(channel))
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), SynthError> {
        self.send(Command::SetVolume(volume))
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), SynthError> {
        self.send(Command::SetEnabled(enabled))
    }

    /// Stop playback and wait (bounded) for the worker to exit.
    pub fn deinit(mut self) -> Result<(), SynthError> {
        self.shutdown()
    }

    fn check_channel(channel: u8) -> Result<(), SynthError> {
        if (channel as usize) < CHANNELS {
            Ok(())
        } else {
            Err(SynthError::InvalidChannel(channel))
        }
    }

    fn send(&self, command: Command) -> Result<(), SynthError> {
        self.commands
            .send_timeout(command, self.config.submit_timeout)
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => SynthError::QueueFull,
                SendTimeoutError::Disconnected(_) => SynthError::Disconnected,
            })
    }

    /// Queue Quit, wait for the acknowledgement, then join. The join handle
    /// is kept until the worker is known to be exiting, so a failed attempt
    /// can be retried.
    fn shutdown(&mut self) -> Result<(), SynthError> {
        if self.worker.is_none() {
            return Ok(());
        }

        match self.send(Command::Quit) {
            Ok(()) => {}
            // Worker already gone; find out how it ended
            Err(SynthError::Disconnected) => return self.join(),
            Err(e) => return Err(e),
        }

        match self.ack.recv_timeout(self.config.shutdown_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let result = self.join();
                info!("synth stopped");
                result
            }
            Err(RecvTimeoutError::Timeout) => Err(SynthError::ShutdownTimeout),
        }
    }

    fn join(&mut self) -> Result<(), SynthError> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| SynthError::WorkerPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for Synth {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(%e, "synth shutdown failed");
        }
    }
}
