//! The engine object: four channels driving four oscillators.

use std::sync::Arc;

use atm_ir::{Song, CHANNELS};
use tracing::info;

use crate::channel::ChannelState;
use crate::clock::DEFAULT_TICK_RATE;
use crate::mute::MuteMask;
use crate::oscillator::{NOISE_CHANNEL, NOISE_SEED};
use crate::render::Renderer;
use crate::sequencer::{self, SequencerError, SongControl};
use crate::shared::SharedState;

/// Result of a sequencer tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Every channel finished and no repeat point is set; the caller should stop.
    Finished,
}

/// Owns all sequencer state. Lives on the control thread; the audio thread
/// only sees [`SharedState`] through a [`Renderer`].
pub struct Engine {
    shared: Arc<SharedState>,
    channels: [ChannelState; CHANNELS],
    mute: MuteMask,
    tick_rate: u8,
    song: Option<Arc<Song>>,
    ticks_run: u64,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(SharedState::new()),
            channels: Default::default(),
            mute: MuteMask::default(),
            tick_rate: DEFAULT_TICK_RATE,
            song: None,
            ticks_run: 0,
        }
    }

    /// A renderer reading this engine's oscillators and clock.
    pub fn renderer(&self) -> Renderer {
        Renderer::new(Arc::clone(&self.shared))
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    /// Start a song from its entry tracks.
    ///
    /// Fails without touching the current state if an entry track does not exist.
    pub fn play(&mut self, song: Arc<Song>) -> Result<(), SequencerError> {
        let mut starts = [0usize; CHANNELS];
        for (channel, start) in starts.iter_mut().enumerate() {
            let track = song.start_track(channel);
            *start = song
                .track_start(track)
                .ok_or(SequencerError::InvalidTrack { channel, track })?;
        }

        self.reset();
        self.tick_rate = DEFAULT_TICK_RATE;
        self.shared.clock.set_rate(self.tick_rate);

        self.shared.oscillators[NOISE_CHANNEL].set_freq(NOISE_SEED);
        self.channels[NOISE_CHANNEL].freq = NOISE_SEED;

        for (channel, ch) in self.channels.iter_mut().enumerate() {
            ch.start_at(starts[channel], song.start_track(channel));
        }

        self.shared.clock.clear_pending();
        info!(tracks = song.track_count(), start_tracks = ?song.start_tracks(), "song started");
        self.song = Some(song);
        Ok(())
    }

    /// Drop the song and silence every oscillator. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.song.take().is_some() {
            info!(ticks = self.ticks_run, "song stopped");
        }
        self.reset();
        self.shared.oscillators.silence();
        self.shared.clock.clear_pending();
        self.shared.set_paused(false);
    }

    fn reset(&mut self) {
        self.channels = Default::default();
        self.mute = MuteMask::default();
        self.ticks_run = 0;
    }

    /// Run one tick of all four channels.
    pub fn tick(&mut self) -> Result<TickOutcome, SequencerError> {
        let Some(song) = self.song.as_deref() else {
            return Ok(TickOutcome::Finished);
        };
        self.ticks_run += 1;
        let osc = &self.shared.oscillators;

        for n in 0..CHANNELS {
            let ch = &mut self.channels[n];

            if let Some(freq) = ch.apply_effects() {
                if !self.mute.is_muted(n) {
                    osc[n].set_freq(freq);
                }
            }

            let mut ctl = SongControl {
                mute: &mut self.mute,
                tick_rate: &mut self.tick_rate,
                clock: &self.shared.clock,
                repeat_points: None,
            };
            sequencer::step(n, ch, song, &mut ctl)?;
            if let Some(points) = ctl.repeat_points {
                for (ch, point) in self.channels.iter_mut().zip(points) {
                    ch.repeat_point = point;
                }
            }

            let ch = &self.channels[n];
            if !self.mute.is_muted(n) {
                if n == NOISE_CHANNEL {
                    osc[n].set_vol(ch.vol >> 1);
                } else {
                    osc[n].set_freq(ch.freq);
                    osc[n].set_vol(ch.vol);
                }
            }

            if self.mute.all_finished() {
                if self.channels.iter().all(|ch| ch.repeat_point == 0) {
                    return Ok(TickOutcome::Finished);
                }
                for (channel, ch) in self.channels.iter_mut().enumerate() {
                    let track = ch.repeat_point;
                    let pos = song
                        .track_start(track)
                        .ok_or(SequencerError::InvalidTrack { channel, track })?;
                    ch.restart_at(pos, track);
                }
                self.mute = MuteMask::default();
                info!(ticks = self.ticks_run, "song repeating");
            }
        }
        Ok(TickOutcome::Continue)
    }

    /// Mute a channel, freezing its oscillator. Out-of-range channels are ignored.
    pub fn mute(&mut self, channel: usize) {
        if channel < CHANNELS {
            self.mute.mute(channel);
        }
    }

    pub fn unmute(&mut self, channel: usize) {
        if channel < CHANNELS {
            self.mute.unmute(channel);
        }
    }

    pub fn set_master_volume(&self, volume: f32) {
        self.shared.set_master_volume(volume);
    }

    pub fn set_paused(&self, paused: bool) {
        self.shared.set_paused(paused);
    }

    pub fn is_playing(&self) -> bool {
        self.song.is_some()
    }

    pub fn song(&self) -> Option<&Arc<Song>> {
        self.song.as_ref()
    }

    pub fn channel(&self, channel: usize) -> &ChannelState {
        &self.channels[channel]
    }

    pub fn channels(&self) -> &[ChannelState; CHANNELS] {
        &self.channels
    }

    pub fn mute_mask(&self) -> MuteMask {
        self.mute
    }

    pub fn tick_rate(&self) -> u8 {
        self.tick_rate
    }

    /// Ticks executed since the current song started.
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
