//! The control loop: owns the engine and the sink, consumes commands and
//! runs one pending tick per iteration.

use std::time::{Duration, Instant};

use atm_audio::AudioSink;
use atm_engine::{Engine, TickOutcome};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info, warn};

use crate::command::Command;
use crate::config::SynthConfig;

/// Externally visible playback state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Idle,
    /// A song is active but the sink is not held (unavailable or disabled).
    Waiting,
    Playing,
    Paused,
}

/// Whether the loop keeps running after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct ControlLoop<S> {
    engine: Engine,
    sink: S,
    poll_interval: Duration,
    retry_interval: Duration,
    active: bool,
    paused: bool,
    enabled: bool,
    last_attempt: Option<Instant>,
}

impl<S: AudioSink> ControlLoop<S> {
    pub fn new(sink: S, config: &SynthConfig) -> Self {
        Self {
            engine: Engine::new(),
            sink,
            poll_interval: config.poll_interval,
            retry_interval: config.retry_interval,
            active: false,
            paused: false,
            enabled: true,
            last_attempt: None,
        }
    }

    pub fn state(&self) -> PlayState {
        match (self.active, self.sink.is_acquired(), self.paused) {
            (false, _, _) => PlayState::Idle,
            (true, false, _) => PlayState::Waiting,
            (true, true, false) => PlayState::Playing,
            (true, true, true) => PlayState::Paused,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Apply one command.
    pub fn handle(&mut self, command: Command) -> Flow {
        debug!(command = command.name(), "command received");
        match command {
            Command::Play(song) => {
                self.stop_playback();
                if let Err(e) = self.engine.play(song) {
                    error!(%e, "song rejected");
                    self.engine.stop();
                    return Flow::Continue;
                }
                self.active = true;
                if self.enabled {
                    self.try_acquire();
                }
            }
            Command::Stop => self.stop_playback(),
            Command::TogglePause => {
                if matches!(self.state(), PlayState::Playing | PlayState::Paused) {
                    self.paused = !self.paused;
                    self.engine.set_paused(self.paused);
                    info!(paused = self.paused, "pause toggled");
                }
            }
            Command::Mute(channel) => self.engine.mute(channel as usize),
            Command::Unmute(channel) => self.engine.unmute(channel as usize),
            Command::SetVolume(volume) => self.engine.set_master_volume(volume),
            Command::SetEnabled(enabled) => {
                self.enabled = enabled;
                if !enabled {
                    self.release_sink();
                } else if self.active && !self.sink.is_acquired() {
                    self.try_acquire();
                }
                info!(enabled, "audio output switched");
            }
            Command::Quit => {
                self.stop_playback();
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// Periodic work between commands: retry the sink and run at most one
    /// pending tick.
    pub fn service(&mut self) {
        if self.active && self.enabled && !self.sink.is_acquired() && self.retry_due() {
            self.try_acquire();
        }

        if self.state() != PlayState::Playing || !self.engine.shared().clock.take_pending() {
            return;
        }
        match self.engine.tick() {
            Ok(TickOutcome::Continue) => {}
            Ok(TickOutcome::Finished) => {
                info!(ticks = self.engine.ticks_run(), "song finished");
                self.stop_playback();
            }
            Err(e) => {
                error!(%e, "sequencer fault, stopping");
                self.stop_playback();
            }
        }
    }

    /// Receive commands until `Quit` or until every sender is gone.
    ///
    /// `Quit` is acknowledged on `ack` after the sink has been released.
    pub fn run(mut self, commands: &Receiver<Command>, ack: &Sender<()>) {
        info!("control loop started");
        loop {
            let wait = if self.tick_ready() { Duration::ZERO } else { self.poll_interval };
            match commands.recv_timeout(wait) {
                Ok(command) => {
                    if self.handle(command) == Flow::Quit {
                        let _ = ack.send(());
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.stop_playback();
                    break;
                }
            }
            self.service();
        }
        info!("control loop exited");
    }

    fn tick_ready(&self) -> bool {
        self.state() == PlayState::Playing && self.engine.shared().clock.pending() > 0
    }

    fn retry_due(&self) -> bool {
        self.last_attempt
            .map_or(true, |at| at.elapsed() >= self.retry_interval)
    }

    fn try_acquire(&mut self) {
        self.last_attempt = Some(Instant::now());
        self.engine.shared().clock.clear_pending();
        match self.sink.acquire(self.engine.renderer()) {
            Ok(()) => info!("audio sink acquired"),
            Err(e) => warn!(%e, retry_in = ?self.retry_interval, "audio sink unavailable"),
        }
    }

    fn release_sink(&mut self) {
        if self.sink.is_acquired() {
            self.sink.release();
            info!("audio sink released");
        }
    }

    fn stop_playback(&mut self) {
        self.release_sink();
        self.engine.stop();
        self.active = false;
        self.paused = false;
        self.last_attempt = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use atm_audio::AudioError;
    use atm_engine::Renderer;
    use atm_ir::{Song, SongBuilder, TrackBuilder};

    /// Sink that fails a scripted number of acquisitions.
    #[derive(Default)]
    struct ScriptedSink {
        renderer: Option<Renderer>,
        failures_left: u32,
        acquires: u32,
        releases: u32,
    }

    impl AudioSink for ScriptedSink {
        fn acquire(&mut self, renderer: Renderer) -> Result<(), AudioError> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(AudioError::SpeakerBusy);
            }
            self.acquires += 1;
            self.renderer = Some(renderer);
            Ok(())
        }

        fn release(&mut self) {
            if self.renderer.take().is_some() {
                self.releases += 1;
            }
        }

        fn is_acquired(&self) -> bool {
            self.renderer.is_some()
        }
    }

    fn config() -> SynthConfig {
        SynthConfig { retry_interval: Duration::ZERO, ..Default::default() }
    }

    fn control(failures: u32) -> ControlLoop<ScriptedSink> {
        let sink = ScriptedSink { failures_left: failures, ..Default::default() };
        ControlLoop::new(sink, &config())
    }

    fn tune() -> Arc<Song> {
        let lead = TrackBuilder::new().set_volume(30).note(25).delay(4).ret();
        let idle = TrackBuilder::new().stop();
        Arc::new(
            SongBuilder::new()
                .track(lead)
                .track(idle)
                .start_tracks([0, 1, 1, 1])
                .build(),
        )
    }

    fn silence() -> Arc<Song> {
        let idle = TrackBuilder::new().stop();
        Arc::new(SongBuilder::new().track(idle).build())
    }

    /// Render exactly one tick's worth of samples through the sink's renderer.
    fn raise_tick(control: &mut ControlLoop<ScriptedSink>) {
        let divisor = control.engine().shared().clock.divisor();
        let renderer = control.sink.renderer.as_mut().expect("sink acquired");
        for _ in 0..divisor {
            renderer.render_sample();
        }
    }

    #[test]
    fn play_acquires_sink() {
        let mut control = control(0);
        assert_eq!(control.state(), PlayState::Idle);
        control.handle(Command::Play(tune()));
        assert_eq!(control.state(), PlayState::Playing);
        assert_eq!(control.sink().acquires, 1);
        assert!(control.engine().is_playing());
    }

    #[test]
    fn play_then_stop_runs_no_tick() {
        let mut control = control(0);
        control.handle(Command::Play(tune()));
        control.handle(Command::Stop);
        control.service();
        assert_eq!(control.engine().ticks_run(), 0);
        assert_eq!(control.state(), PlayState::Idle);
        assert_eq!(control.sink().releases, 1);
        assert_eq!(control.engine().channel(0).vol, 0);
    }

    #[test]
    fn pending_tick_runs_sequencer() {
        let mut control = control(0);
        control.handle(Command::Play(tune()));
        control.service();
        assert_eq!(control.engine().ticks_run(), 0);

        raise_tick(&mut control);
        control.service();
        assert_eq!(control.engine().ticks_run(), 1);
        assert_eq!(control.engine().shared().oscillators[0].vol(), 30);
    }

    #[test]
    fn one_tick_per_service() {
        let mut control = control(0);
        control.handle(Command::Play(tune()));
        raise_tick(&mut control);
        raise_tick(&mut control);
        control.service();
        assert_eq!(control.engine().ticks_run(), 1);
        control.service();
        assert_eq!(control.engine().ticks_run(), 2);
    }

    #[test]
    fn failed_acquire_waits_and_retries() {
        let mut control = control(2);
        control.handle(Command::Play(tune()));
        assert_eq!(control.state(), PlayState::Waiting);
        control.service();
        assert_eq!(control.state(), PlayState::Waiting);
        control.service();
        assert_eq!(control.state(), PlayState::Playing);
        assert_eq!(control.sink().acquires, 1);
    }

    #[test]
    fn retry_respects_interval() {
        let sink = ScriptedSink { failures_left: 1, ..Default::default() };
        let config = SynthConfig { retry_interval: Duration::from_secs(3600), ..Default::default() };
        let mut control = ControlLoop::new(sink, &config);
        control.handle(Command::Play(tune()));
        for _ in 0..10 {
            control.service();
        }
        assert_eq!(control.state(), PlayState::Waiting);
        assert_eq!(control.sink().acquires, 0);
    }

    #[test]
    fn toggle_pause_only_while_playing() {
        let mut control = control(0);
        control.handle(Command::TogglePause);
        assert_eq!(control.state(), PlayState::Idle);

        control.handle(Command::Play(tune()));
        control.handle(Command::TogglePause);
        assert_eq!(control.state(), PlayState::Paused);
        assert!(control.engine().shared().is_paused());

        control.engine().shared().clock.clear_pending();
        let mut buf = [0u8; 8192];
        control.sink.renderer.as_mut().unwrap().fill(&mut buf);
        control.service();
        assert_eq!(control.engine().ticks_run(), 0);

        control.handle(Command::TogglePause);
        assert_eq!(control.state(), PlayState::Playing);
        assert!(!control.engine().shared().is_paused());
    }

    #[test]
    fn toggle_pause_ignored_while_waiting() {
        let mut control = control(1);
        control.handle(Command::Play(tune()));
        control.handle(Command::TogglePause);
        assert_eq!(control.state(), PlayState::Waiting);
        control.service();
        assert_eq!(control.state(), PlayState::Playing);
    }

    #[test]
    fn finished_song_stops() {
        let mut control = control(0);
        control.handle(Command::Play(silence()));
        raise_tick(&mut control);
        control.service();
        assert_eq!(control.state(), PlayState::Idle);
        assert_eq!(control.sink().releases, 1);
        assert!(!control.engine().is_playing());
    }

    #[test]
    fn sequencer_fault_stops() {
        let broken = Arc::new(
            SongBuilder::new()
                .track(TrackBuilder::new().raw(&[240]))
                .build(),
        );
        let mut control = control(0);
        control.handle(Command::Play(broken));
        raise_tick(&mut control);
        control.service();
        assert_eq!(control.state(), PlayState::Idle);
    }

    #[test]
    fn rejected_song_stays_idle() {
        let broken = Arc::new(
            SongBuilder::new()
                .track(TrackBuilder::new().stop())
                .start_tracks([0, 0, 0, 7])
                .build(),
        );
        let mut control = control(0);
        control.handle(Command::Play(broken));
        assert_eq!(control.state(), PlayState::Idle);
        assert_eq!(control.sink().acquires, 0);
    }

    #[test]
    fn disabling_releases_and_enabling_resumes() {
        let mut control = control(0);
        control.handle(Command::Play(tune()));
        raise_tick(&mut control);
        control.service();

        control.handle(Command::SetEnabled(false));
        assert_eq!(control.state(), PlayState::Waiting);
        assert_eq!(control.sink().releases, 1);
        control.service();
        assert_eq!(control.sink().acquires, 1);

        control.handle(Command::SetEnabled(true));
        assert_eq!(control.state(), PlayState::Playing);
        assert_eq!(control.sink().acquires, 2);
        // channel state survived the switch
        assert_eq!(control.engine().ticks_run(), 1);
        assert_eq!(control.engine().channel(0).note, 25);
    }

    #[test]
    fn play_while_disabled_waits() {
        let mut control = control(0);
        control.handle(Command::SetEnabled(false));
        control.handle(Command::Play(tune()));
        control.service();
        assert_eq!(control.state(), PlayState::Waiting);
        assert_eq!(control.sink().acquires, 0);
    }

    #[test]
    fn mute_and_volume_in_any_state() {
        let mut control = control(0);
        control.handle(Command::Mute(2));
        control.handle(Command::SetVolume(0.25));
        assert!(control.engine().mute_mask().is_muted(2));
        assert_eq!(control.engine().shared().master_volume(), 0.25);
        control.handle(Command::Unmute(2));
        assert!(!control.engine().mute_mask().is_muted(2));
        control.handle(Command::SetVolume(7.0));
        assert_eq!(control.engine().shared().master_volume(), 1.0);
    }

    #[test]
    fn stop_twice_is_harmless() {
        let mut control = control(0);
        control.handle(Command::Play(tune()));
        control.handle(Command::Stop);
        control.handle(Command::Stop);
        assert_eq!(control.state(), PlayState::Idle);
        assert_eq!(control.sink().releases, 1);
    }

    #[test]
    fn quit_releases_sink() {
        let mut control = control(0);
        control.handle(Command::Play(tune()));
        assert_eq!(control.handle(Command::Quit), Flow::Quit);
        assert!(!control.sink().is_acquired());
    }
}
