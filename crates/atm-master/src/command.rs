//! Messages from the façade to the control loop.

use std::sync::Arc;

use atm_ir::Song;

#[derive(Clone, Debug)]
pub enum Command {
    Play(Arc<Song>),
    Stop,
    TogglePause,
    Mute(u8),
    Unmute(u8),
    /// Master volume, clamped to 0.0..=1.0 by the receiver.
    SetVolume(f32),
    /// Audio kill switch: releases the sink when off, independent of pause.
    SetEnabled(bool),
    /// Stop, then leave the control loop.
    Quit,
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Play(_) => "play",
            Command::Stop => "stop",
            Command::TogglePause => "toggle_pause",
            Command::Mute(_) => "mute",
            Command::Unmute(_) => "unmute",
            Command::SetVolume(_) => "set_volume",
            Command::SetEnabled(_) => "set_enabled",
            Command::Quit => "quit",
        }
    }
}
