//! Audio sinks for the ATM chiptune engine.
//!
//! A sink takes a [`Renderer`](atm_engine::Renderer) and plays the double
//! buffer it fills. Sinks that need the speaker hold a [`SpeakerGuard`] for
//! as long as they are acquired.

mod buffer_player;
mod cpal_backend;
mod speaker;
mod traits;

pub use buffer_player::{BufferPlayer, MIN_DEVICE_RATE};
pub use cpal_backend::{CpalSink, DEFAULT_ACQUIRE_TIMEOUT};
pub use speaker::{Speaker, SpeakerGuard};
pub use traits::{AudioError, AudioSink};
