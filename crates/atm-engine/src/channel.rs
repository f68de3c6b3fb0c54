//! Per-channel sequencer state and the periodic effects.

use atm_ir::{note_to_freq, MAX_FREQ, MAX_NOTE, MAX_VOLUME};

/// Delay value for a channel that never advances again.
pub const HALTED: u16 = 0xFFFF;

/// Call stack depth per channel.
pub const STACK_DEPTH: usize = 7;

/// Saved caller state for a track call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackFrame {
    pub return_pos: usize,
    pub counter: u8,
    pub track: u8,
}

/// Clamp a modulated value to the range of its target.
fn clamp_target(value: i32, frequency: bool) -> i32 {
    let max = if frequency { MAX_FREQ as i32 } else { MAX_VOLUME as i32 };
    value.clamp(0, max)
}

/// Volume or frequency slide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slide {
    /// Signed step; zero disables the slide.
    pub delta: i8,
    /// Bits 0–5 period, bit 6 targets frequency, bit 7 disables clamping.
    pub config: u8,
    pub count: u8,
}

impl Slide {
    pub fn is_active(&self) -> bool {
        self.delta != 0
    }

    pub fn targets_frequency(&self) -> bool {
        self.config & 0x40 != 0
    }

    fn tick(&mut self, freq: &mut u16, vol: &mut u8) {
        if !self.is_active() {
            return;
        }
        if self.count == 0 {
            let frequency = self.targets_frequency();
            let current = if frequency { *freq as i32 } else { *vol as i32 };
            let mut next = current + self.delta as i32;
            if self.config & 0x80 == 0 {
                next = clamp_target(next, frequency);
            }
            if frequency {
                *freq = next as u16;
            } else {
                *vol = next as u8;
            }
        }
        self.count = if self.count >= self.config & 0x3F { 0 } else { self.count + 1 };
    }
}

/// Arpeggio and its note-cut variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Arpeggio {
    /// High nibble: second step offset. Low nibble: third step offset.
    /// `0xFF` alternates the note with silence.
    pub notes: u8,
    /// Bits 0–4 ticks per step, bit 5 restarts on note-on, bit 6 two steps only.
    pub timing: u8,
    /// Bits 0–4 tick count, bits 5–7 current step.
    pub count: u8,
}

impl Arpeggio {
    pub const NOTE_CUT: u8 = 0xFF;

    pub fn is_active(&self) -> bool {
        self.notes != 0
    }

    pub fn restarts_on_note(&self) -> bool {
        self.timing & 0x20 != 0
    }

    /// Advance one tick. Returns the frequency to play when the step changes.
    fn tick(&mut self, note: u8) -> Option<u16> {
        if !self.is_active() || note == 0 {
            return None;
        }
        if self.count & 0x1F < self.timing & 0x1F {
            self.count += 1;
            return None;
        }

        let note_cut = self.notes == Self::NOTE_CUT;
        self.count = match self.count & 0xE0 {
            0x00 => 0x20,
            0x20 if self.timing & 0x40 == 0 && !note_cut => 0x40,
            _ => 0x00,
        };

        let step = self.count & 0xE0;
        let mut arp_note = note as u16;
        if step != 0 {
            if note_cut {
                arp_note = 0;
            } else {
                arp_note += (self.notes >> 4) as u16;
            }
        }
        if step == 0x40 {
            arp_note += (self.notes & 0x0F) as u16;
        }
        Some(note_to_freq(arp_note.min(MAX_NOTE as u16) as u8))
    }
}

/// Forces the oscillator to a fixed note every few ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Retrigger {
    /// Bits 0–1 period, bits 2–7 note.
    pub config: u8,
    pub count: u8,
}

impl Retrigger {
    fn tick(&mut self) -> Option<u16> {
        if self.config == 0 {
            return None;
        }
        if self.count >= self.config & 0x03 {
            self.count = 0;
            Some(note_to_freq(self.config >> 2))
        } else {
            self.count += 1;
            None
        }
    }
}

/// Tremolo (volume) or vibrato (frequency).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TremoloVibrato {
    /// Zero disables the effect.
    pub depth: u8,
    /// Bits 0–4 period, bit 6 targets frequency.
    pub config: u8,
    /// Bits 0–4 tick count, bit 7 direction (set = upwards).
    pub count: u8,
}

impl TremoloVibrato {
    fn tick(&mut self, freq: &mut u16, vol: &mut u8) {
        if self.depth == 0 {
            return;
        }
        let frequency = self.config & 0x40 != 0;
        let current = if frequency { *freq as i32 } else { *vol as i32 };
        let next = if self.count & 0x80 != 0 {
            current + self.depth as i32
        } else {
            current - self.depth as i32
        };
        let next = clamp_target(next, frequency);
        if frequency {
            *freq = next as u16;
        } else {
            *vol = next as u8;
        }

        if self.count & 0x1F < self.config & 0x1F {
            self.count += 1;
        } else {
            self.count = if self.count & 0x80 != 0 { 0 } else { 0x80 };
        }
    }
}

/// Steps the note by a semitone every few ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Glissando {
    /// Bits 0–6 period, bit 7 downwards. Zero disables.
    pub config: u8,
    pub count: u8,
}

impl Glissando {
    /// Returns the new note when a step happens.
    fn tick(&mut self, note: u8) -> Option<u8> {
        if self.config == 0 {
            return None;
        }
        if self.count >= self.config & 0x7F {
            self.count = 0;
            let step = if self.config & 0x80 != 0 { -1 } else { 1 };
            Some((note as i16 + step).clamp(1, MAX_NOTE as i16) as u8)
        } else {
            self.count += 1;
            None
        }
    }
}

/// One sequencer channel. Zeroed on every play and stop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// Absolute read position in the song data.
    pub pos: usize,
    /// Track currently executing.
    pub track: u8,
    pub note: u8,
    pub freq: u16,
    pub vol: u8,
    /// Volume set by the last explicit volume command; restored on note-on.
    pub base_vol: u8,
    /// Ticks until the next command; [`HALTED`] never counts down.
    pub delay: u16,
    /// Remaining repeats of the current track.
    pub counter: u8,
    pub stack: heapless::Vec<StackFrame, STACK_DEPTH>,
    /// Track to restart from when the whole song finishes.
    pub repeat_point: u8,
    pub transpose: i8,
    pub slide: Slide,
    pub arpeggio: Arpeggio,
    pub retrigger: Retrigger,
    pub tremolo_vibrato: TremoloVibrato,
    pub glissando: Glissando,
}

impl ChannelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_halted(&self) -> bool {
        self.delay == HALTED
    }

    /// Point the channel at a track's first byte.
    pub fn start_at(&mut self, pos: usize, track: u8) {
        self.pos = pos;
        self.track = track;
    }

    /// Restart from a track for a song repeat. Effects and notes carry over.
    pub fn restart_at(&mut self, pos: usize, track: u8) {
        self.start_at(pos, track);
        self.counter = 0;
        self.stack.clear();
        self.delay = 0;
    }

    /// Run the per-tick effects in order: retrigger, glissando, slide,
    /// arpeggio, tremolo/vibrato.
    ///
    /// Returns the frequency a retrigger wants written straight to the
    /// oscillator, if it fired this tick.
    pub fn apply_effects(&mut self) -> Option<u16> {
        let retrigger = self.retrigger.tick();

        if let Some(note) = self.glissando.tick(self.note) {
            self.note = note;
            self.freq = note_to_freq(note);
        }

        self.slide.tick(&mut self.freq, &mut self.vol);

        if let Some(freq) = self.arpeggio.tick(self.note) {
            self.freq = freq;
        }

        self.tremolo_vibrato.tick(&mut self.freq, &mut self.vol);

        retrigger
    }

    /// Note-on for a command byte in 0..=63. Note 0 is a rest and is not transposed.
    pub fn note_on(&mut self, cmd: u8) {
        self.note = if cmd == 0 {
            0
        } else {
            (cmd as i16 + self.transpose as i16).clamp(0, MAX_NOTE as i16) as u8
        };
        self.freq = note_to_freq(self.note);
        if !self.slide.is_active() {
            self.vol = self.base_vol;
        }
        if self.arpeggio.restarts_on_note() {
            self.arpeggio.count = 0;
        }
    }
}
