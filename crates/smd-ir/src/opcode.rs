//! Opcode classification for the per-track event format.
//!
//! Every event starts with one opcode byte. The byte alone determines the
//! event type and, except for notes, the exact payload length.

/// Pause lengths in ticks for the fixed pause opcodes `0x80..=0x8F`.
pub const PAUSE_TICKS: [u32; 16] = [96, 72, 64, 48, 36, 32, 24, 18, 16, 12, 9, 8, 6, 4, 3, 2];

/// A decoded opcode byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// `0x00..=0x7F`: note on, the opcode is the velocity.
    NoteOn { velocity: u8 },
    /// `0x80..=0x8F`: pause from [`PAUSE_TICKS`].
    Pause { index: u8 },
    /// `0x90`: repeat the last pause.
    RepeatPause,
    /// `0x91`: add one byte to the last pause.
    AddPause,
    /// `0x92`: one byte pause.
    Pause8,
    /// `0x93`: two byte pause.
    Pause16,
    /// `0x94`: three byte pause.
    Pause24,
    /// `0x98`: end of track, or jump to the loop point.
    TrackEnd,
    /// `0x99`: record the loop point.
    LoopPoint,
    SetOctave,
    ModOctave,
    /// `0xA4` and `0xA5`.
    SetTempo,
    SetProgram,
    PitchBend,
    Volume,
    Expression,
    Pan,
    /// Recognized but unimplemented; the payload is skipped.
    Skip { opcode: u8, len: u8 },
}

impl Opcode {
    /// Classify an opcode byte, or `None` if it is not part of the format.
    pub const fn classify(byte: u8) -> Option<Self> {
        let op = match byte {
            0x00..=0x7F => Opcode::NoteOn { velocity: byte },
            0x80..=0x8F => Opcode::Pause { index: byte - 0x80 },
            0x90 => Opcode::RepeatPause,
            0x91 => Opcode::AddPause,
            0x92 => Opcode::Pause8,
            0x93 => Opcode::Pause16,
            0x94 => Opcode::Pause24,
            0x98 => Opcode::TrackEnd,
            0x99 => Opcode::LoopPoint,
            0xA0 => Opcode::SetOctave,
            0xA1 => Opcode::ModOctave,
            0xA4 | 0xA5 => Opcode::SetTempo,
            0xAC => Opcode::SetProgram,
            0xD7 => Opcode::PitchBend,
            0xE0 => Opcode::Volume,
            0xE3 => Opcode::Expression,
            0xE8 => Opcode::Pan,
            _ => match skip_len(byte) {
                Some(len) => Opcode::Skip { opcode: byte, len },
                None => return None,
            },
        };
        Some(op)
    }

    /// Payload bytes following the opcode, when fixed.
    ///
    /// Notes return `None`: their length depends on the packed parameter byte.
    pub const fn payload_len(self) -> Option<usize> {
        let len = match self {
            Opcode::NoteOn { .. } => return None,
            Opcode::Pause { .. }
            | Opcode::RepeatPause
            | Opcode::TrackEnd
            | Opcode::LoopPoint => 0,
            Opcode::AddPause
            | Opcode::Pause8
            | Opcode::SetOctave
            | Opcode::ModOctave
            | Opcode::SetTempo
            | Opcode::SetProgram
            | Opcode::Volume
            | Opcode::Expression
            | Opcode::Pan => 1,
            Opcode::Pause16 | Opcode::PitchBend => 2,
            Opcode::Pause24 => 3,
            Opcode::Skip { len, .. } => len as usize,
        };
        Some(len)
    }

    /// True for opcodes that suspend the track until a later tick.
    pub const fn is_pause(self) -> bool {
        matches!(
            self,
            Opcode::Pause { .. }
                | Opcode::RepeatPause
                | Opcode::AddPause
                | Opcode::Pause8
                | Opcode::Pause16
                | Opcode::Pause24
        )
    }
}

/// Payload sizes of the opcodes that are consumed but have no effect.
const fn skip_len(byte: u8) -> Option<u8> {
    match byte {
        0x95 | 0x9C | 0xA9 | 0xAA | 0xAB | 0xB1 | 0xB2 | 0xB3 | 0xB5 | 0xB6 | 0xBC | 0xBE
        | 0xBF | 0xC0 | 0xC3 | 0xD0 | 0xD1 | 0xD2 | 0xDB | 0xDF | 0xE1 | 0xE7 | 0xE9 | 0xEF
        | 0xF6 => Some(1),
        0xA8 | 0xB4 | 0xCB | 0xD5 | 0xD6 | 0xD8 | 0xF2 | 0xF8 => Some(2),
        0xAF | 0xD4 | 0xE2 | 0xEA | 0xF3 => Some(3),
        0xDD | 0xE5 | 0xED | 0xF1 => Some(4),
        0xDC | 0xE4 | 0xEC | 0xF0 => Some(5),
        _ => None,
    }
}
