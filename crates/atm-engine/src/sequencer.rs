//! Bytecode interpreter for one channel.
//!
//! Song data is untrusted: every structural violation stops the song with a
//! [`SequencerError`]. Out-of-range notes are clamped instead.

use atm_ir::opcode::{CALL_REPEAT, LONG_DELAY_BIAS};
use atm_ir::{vle, Fx, Opcode, Song, CHANNELS};

use crate::channel::{Arpeggio, ChannelState, StackFrame, HALTED};
use crate::clock::TickClock;
use crate::mute::MuteMask;

/// Commands a channel may execute in one tick without setting a delay.
pub const MAX_COMMANDS_PER_TICK: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequencerError {
    #[error("channel {channel}: song data ends at offset {pos}")]
    UnexpectedEnd { channel: usize, pos: usize },
    #[error("channel {channel}: track {track} does not exist")]
    InvalidTrack { channel: usize, track: u8 },
    #[error("channel {channel}: call stack overflow entering track {track}")]
    StackOverflow { channel: usize, track: u8 },
    #[error("channel {channel}: undefined opcode {opcode} at offset {pos}")]
    UndefinedOpcode { channel: usize, opcode: u8, pos: usize },
    #[error("channel {channel}: undefined effect {sub} at offset {pos}")]
    UndefinedEffect { channel: usize, sub: u8, pos: usize },
    #[error("channel {channel}: delay of {ticks} ticks does not fit the delay counter")]
    DelayOverflow { channel: usize, ticks: u32 },
    #[error("channel {channel}: over 1024 commands in one tick without a delay")]
    Runaway { channel: usize },
}

/// Song-wide state a channel's commands can touch.
pub(crate) struct SongControl<'a> {
    pub mute: &'a mut MuteMask,
    pub tick_rate: &'a mut u8,
    pub clock: &'a TickClock,
    /// Set by the repeat-point command; applied to every channel after the
    /// current channel finishes its commands.
    pub repeat_points: Option<[u8; CHANNELS]>,
}

impl SongControl<'_> {
    fn set_tick_rate(&mut self, rate: u8) {
        *self.tick_rate = rate.max(1);
        self.clock.set_rate(*self.tick_rate);
    }
}

struct Interpreter<'a, 'c> {
    channel: usize,
    ch: &'a mut ChannelState,
    song: &'a Song,
    ctl: &'a mut SongControl<'c>,
}

/// Delay gate plus command execution for one channel's tick.
pub(crate) fn step(
    channel: usize,
    ch: &mut ChannelState,
    song: &Song,
    ctl: &mut SongControl<'_>,
) -> Result<(), SequencerError> {
    if ch.delay != 0 {
        if ch.delay != HALTED {
            ch.delay -= 1;
        }
        return Ok(());
    }

    Interpreter { channel, ch: &mut *ch, song, ctl }.run()?;

    if ch.delay != HALTED {
        ch.delay -= 1;
    }
    Ok(())
}

impl Interpreter<'_, '_> {
    /// Execute commands until one sets a delay.
    fn run(&mut self) -> Result<(), SequencerError> {
        let mut executed = 0;
        while self.ch.delay == 0 {
            if executed == MAX_COMMANDS_PER_TICK {
                return Err(SequencerError::Runaway { channel: self.channel });
            }
            executed += 1;
            self.execute()?;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, SequencerError> {
        let byte = self.song.byte_at(self.ch.pos).ok_or(SequencerError::UnexpectedEnd {
            channel: self.channel,
            pos: self.ch.pos,
        })?;
        self.ch.pos += 1;
        Ok(byte)
    }

    fn read_vle(&mut self) -> Result<u32, SequencerError> {
        let (value, len) = vle::decode(self.song.tail(self.ch.pos)).ok_or(
            SequencerError::UnexpectedEnd { channel: self.channel, pos: self.ch.pos },
        )?;
        self.ch.pos += len;
        Ok(value)
    }

    fn track_start(&self, track: u8) -> Result<usize, SequencerError> {
        self.song
            .track_start(track)
            .ok_or(SequencerError::InvalidTrack { channel: self.channel, track })
    }

    fn execute(&mut self) -> Result<(), SequencerError> {
        let at = self.ch.pos;
        let byte = self.read_byte()?;
        match Opcode::decode(byte) {
            Opcode::Note(note) => self.ch.note_on(note),
            Opcode::Effect(fx) => self.effect(fx)?,
            Opcode::UndefinedEffect(sub) => {
                return Err(SequencerError::UndefinedEffect { channel: self.channel, sub, pos: at });
            }
            Opcode::Delay(ticks) => self.ch.delay = ticks as u16,
            Opcode::LongDelay => {
                let ticks = self.read_vle()?.saturating_add(LONG_DELAY_BIAS as u32);
                if ticks >= HALTED as u32 {
                    return Err(SequencerError::DelayOverflow { channel: self.channel, ticks });
                }
                self.ch.delay = ticks as u16;
            }
            Opcode::Call | Opcode::CallRepeat => {
                let counter = if byte == CALL_REPEAT { self.read_byte()? } else { 0 };
                let track = self.read_byte()?;
                self.call(track, counter)?;
            }
            Opcode::Return => self.ret()?,
            Opcode::Jump => {
                let offset = self.read_vle()?;
                self.ch.pos = self.ch.pos.saturating_add(offset as usize);
            }
            Opcode::Undefined(opcode) => {
                return Err(SequencerError::UndefinedOpcode {
                    channel: self.channel,
                    opcode,
                    pos: at,
                });
            }
        }
        Ok(())
    }

    fn call(&mut self, track: u8, counter: u8) -> Result<(), SequencerError> {
        let start = self.track_start(track)?;
        if track != self.ch.track {
            let frame = StackFrame {
                return_pos: self.ch.pos,
                counter: self.ch.counter,
                track: self.ch.track,
            };
            self.ch
                .stack
                .push(frame)
                .map_err(|_| SequencerError::StackOverflow { channel: self.channel, track })?;
            self.ch.track = track;
        }
        self.ch.counter = counter;
        self.ch.pos = start;
        Ok(())
    }

    /// Loop the current track while repeats remain (or forever at the top
    /// level), otherwise return to the caller.
    fn ret(&mut self) -> Result<(), SequencerError> {
        if self.ch.counter > 0 || self.ch.stack.is_empty() {
            self.ch.counter = self.ch.counter.saturating_sub(1);
            self.ch.pos = self.track_start(self.ch.track)?;
        } else if let Some(frame) = self.ch.stack.pop() {
            self.ch.pos = frame.return_pos;
            self.ch.counter = frame.counter;
            self.ch.track = frame.track;
        }
        Ok(())
    }

    fn effect(&mut self, fx: Fx) -> Result<(), SequencerError> {
        match fx {
            Fx::SetVolume => {
                let vol = self.read_byte()?;
                self.ch.vol = vol;
                self.ch.base_vol = vol;
            }
            Fx::SlideVolume | Fx::SlideFrequency => {
                let delta = self.read_byte()? as i8;
                self.ch.slide.delta = delta;
                self.ch.slide.config = if fx == Fx::SlideFrequency { 0x40 } else { 0x00 };
            }
            Fx::SlideVolumeAdvanced | Fx::SlideFrequencyAdvanced => {
                self.ch.slide.delta = self.read_byte()? as i8;
                self.ch.slide.config = self.read_byte()?;
            }
            Fx::StopVolumeSlide | Fx::StopFrequencySlide => self.ch.slide.delta = 0,
            Fx::SetArpeggio => {
                self.ch.arpeggio.notes = self.read_byte()?;
                self.ch.arpeggio.timing = self.read_byte()?;
            }
            Fx::StopArpeggio | Fx::StopNoteCut => self.ch.arpeggio.notes = 0,
            Fx::SetRetrigger => self.ch.retrigger.config = self.read_byte()?,
            Fx::StopRetrigger => self.ch.retrigger.config = 0,
            Fx::AddTranspose => {
                let delta = self.read_byte()? as i8;
                self.ch.transpose = self.ch.transpose.wrapping_add(delta);
            }
            Fx::SetTranspose => self.ch.transpose = self.read_byte()? as i8,
            Fx::StopTranspose => self.ch.transpose = 0,
            Fx::SetTremolo | Fx::SetVibrato => {
                let depth = self.read_byte()?;
                let selector = if fx == Fx::SetVibrato { 0x40 } else { 0x00 };
                let config = self.read_byte()?.wrapping_add(selector);
                self.ch.tremolo_vibrato.depth = depth;
                self.ch.tremolo_vibrato.config = config;
            }
            Fx::StopTremolo | Fx::StopVibrato => self.ch.tremolo_vibrato.depth = 0,
            Fx::SetGlissando => self.ch.glissando.config = self.read_byte()?,
            Fx::StopGlissando => self.ch.glissando.config = 0,
            Fx::SetNoteCut => {
                let timing = self.read_byte()?;
                self.ch.arpeggio.notes = Arpeggio::NOTE_CUT;
                self.ch.arpeggio.timing = timing;
            }
            Fx::AddTempo => {
                let delta = self.read_byte()?;
                let rate = self.ctl.tick_rate.wrapping_add(delta);
                self.ctl.set_tick_rate(rate);
            }
            Fx::SetTempo => {
                let rate = self.read_byte()?;
                self.ctl.set_tick_rate(rate);
            }
            Fx::SetRepeatPoint => {
                let mut points = [0u8; CHANNELS];
                for point in &mut points {
                    *point = self.read_byte()?;
                }
                self.ctl.repeat_points = Some(points);
            }
            Fx::Stop => {
                self.ctl.mute.finish(self.channel);
                self.ch.vol = 0;
                self.ch.delay = HALTED;
            }
        }
        Ok(())
    }
}
