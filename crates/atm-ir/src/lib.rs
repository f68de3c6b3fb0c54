//! Core types for the ATM chiptune engine.
//!
//! A song is a compact bytecode program: one entry track per channel plus
//! any number of subroutine tracks that the channels call into. This crate
//! defines the song model, the note table, the instruction set and the
//! variable-length integer codec shared by the loader and the sequencer.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod builder;
mod note_table;
pub mod opcode;
mod song;
pub mod vle;

pub use builder::{SongBuilder, TrackBuilder};
pub use note_table::{note_to_freq, MAX_FREQ, MAX_NOTE, MAX_VOLUME, NOTE_TABLE};
pub use opcode::{Fx, Opcode};
pub use song::{Song, CHANNELS};
