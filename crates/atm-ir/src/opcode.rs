//! The channel instruction set.
//!
//! Every instruction is one command byte, optionally followed by operand
//! bytes:
//!
//! | Byte      | Instruction                                        |
//! |-----------|----------------------------------------------------|
//! | 0–63      | note on (0 = silence)                              |
//! | 64–159    | effect, sub-opcode = byte − 64                     |
//! | 160–223   | short delay of byte − 159 ticks                    |
//! | 224       | long delay, VLE operand + 65 ticks                 |
//! | 225–251   | undefined                                          |
//! | 252       | call track, no repeats                             |
//! | 253       | call track with a repeat count                     |
//! | 254       | loop / return                                      |
//! | 255       | relative jump, VLE operand                         |

/// First effect command byte.
pub const FX_BASE: u8 = 64;
/// First short-delay command byte.
pub const DELAY_BASE: u8 = 160;
/// Last short-delay command byte.
pub const DELAY_MAX: u8 = 223;
/// Long delay command byte.
pub const LONG_DELAY: u8 = 224;
/// Smallest delay a long delay can express.
pub const LONG_DELAY_BIAS: u16 = 65;
/// Call without repeats.
pub const CALL: u8 = 252;
/// Call with a repeat count operand.
pub const CALL_REPEAT: u8 = 253;
/// Loop / return.
pub const RETURN: u8 = 254;
/// Relative jump.
pub const JUMP: u8 = 255;

/// A decoded command byte. Operands are read separately by the interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Note(u8),
    /// Defined effect sub-opcode.
    Effect(Fx),
    /// Effect range byte whose sub-opcode has no meaning.
    UndefinedEffect(u8),
    /// Short delay in ticks (1–64).
    Delay(u8),
    LongDelay,
    Call,
    CallRepeat,
    Return,
    Jump,
    Undefined(u8),
}

impl Opcode {
    pub fn decode(byte: u8) -> Self {
        match byte {
            0..=63 => Opcode::Note(byte),
            64..=159 => match Fx::from_sub(byte - FX_BASE) {
                Some(fx) => Opcode::Effect(fx),
                None => Opcode::UndefinedEffect(byte - FX_BASE),
            },
            DELAY_BASE..=DELAY_MAX => Opcode::Delay(byte - (DELAY_BASE - 1)),
            LONG_DELAY => Opcode::LongDelay,
            CALL => Opcode::Call,
            CALL_REPEAT => Opcode::CallRepeat,
            RETURN => Opcode::Return,
            JUMP => Opcode::Jump,
            _ => Opcode::Undefined(byte),
        }
    }
}

/// Effect sub-opcodes (command byte − 64).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Fx {
    SetVolume = 0,
    SlideVolume = 1,
    SlideVolumeAdvanced = 2,
    StopVolumeSlide = 3,
    SlideFrequency = 4,
    SlideFrequencyAdvanced = 5,
    StopFrequencySlide = 6,
    SetArpeggio = 7,
    StopArpeggio = 8,
    SetRetrigger = 9,
    StopRetrigger = 10,
    AddTranspose = 11,
    SetTranspose = 12,
    StopTranspose = 13,
    SetTremolo = 14,
    StopTremolo = 15,
    SetVibrato = 16,
    StopVibrato = 17,
    SetGlissando = 18,
    StopGlissando = 19,
    SetNoteCut = 20,
    StopNoteCut = 21,
    AddTempo = 92,
    SetTempo = 93,
    SetRepeatPoint = 94,
    Stop = 95,
}

impl Fx {
    pub fn from_sub(sub: u8) -> Option<Self> {
        use Fx::*;
        Some(match sub {
            0 => SetVolume,
            1 => SlideVolume,
            2 => SlideVolumeAdvanced,
            3 => StopVolumeSlide,
            4 => SlideFrequency,
            5 => SlideFrequencyAdvanced,
            6 => StopFrequencySlide,
            7 => SetArpeggio,
            8 => StopArpeggio,
            9 => SetRetrigger,
            10 => StopRetrigger,
            11 => AddTranspose,
            12 => SetTranspose,
            13 => StopTranspose,
            14 => SetTremolo,
            15 => StopTremolo,
            16 => SetVibrato,
            17 => StopVibrato,
            18 => SetGlissando,
            19 => StopGlissando,
            20 => SetNoteCut,
            21 => StopNoteCut,
            92 => AddTempo,
            93 => SetTempo,
            94 => SetRepeatPoint,
            95 => Stop,
            _ => return None,
        })
    }

    /// The command byte that encodes this effect.
    pub fn command_byte(self) -> u8 {
        FX_BASE + self as u8
    }

    /// Number of operand bytes following the command byte.
    pub(crate) fn operand_len(self) -> usize {
        use Fx::*;
        match self {
            SetVolume | SlideVolume | SlideFrequency | SetRetrigger | AddTranspose
            | SetTranspose | SetGlissando | SetNoteCut | AddTempo | SetTempo => 1,
            SlideVolumeAdvanced | SlideFrequencyAdvanced | SetArpeggio | SetTremolo
            | SetVibrato => 2,
            SetRepeatPoint => 4,
            StopVolumeSlide | StopFrequencySlide | StopArpeggio | StopRetrigger
            | StopTranspose | StopTremolo | StopVibrato | StopGlissando | StopNoteCut | Stop => 0,
        }
    }
}
