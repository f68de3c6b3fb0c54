//! Playback engine for the ATM chiptune synthesizer.
//!
//! Two cadences meet here. The [`Engine`] runs the bytecode sequencer once
//! per tick on a control thread; the [`Renderer`] produces 8-bit samples on
//! the audio thread. They share nothing but the oscillator bank and the
//! tick clock in [`SharedState`], both lock-free.

mod channel;
mod clock;
mod double_buffer;
mod engine;
mod mute;
mod oscillator;
mod render;
mod sequencer;
mod shared;

pub use channel::{
    Arpeggio, ChannelState, Glissando, Retrigger, Slide, StackFrame, TremoloVibrato, HALTED,
    STACK_DEPTH,
};
pub use clock::{tick_divisor, TickClock, DEFAULT_TICK_RATE, LOGICAL_SAMPLE_RATE};
pub use double_buffer::{
    DoubleBuffer, Half, LOGICAL_SAMPLES_PER_HALF, OVERSAMPLE, SINK_SAMPLES_PER_HALF,
    SINK_SAMPLE_RATE,
};
pub use engine::{Engine, TickOutcome};
pub use mute::MuteMask;
pub use oscillator::{
    noise, noise_step, pulse, square, triangle, Oscillator, OscillatorBank, NOISE_CHANNEL,
    NOISE_SEED,
};
pub use render::{apply_master_volume, Renderer, BIAS};
pub use sequencer::{SequencerError, MAX_COMMANDS_PER_TICK};
pub use shared::SharedState;
