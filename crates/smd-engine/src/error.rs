//! Error types for decoding and sequencing.

use smd_ir::CursorError;
use thiserror::Error;

/// Fatal error while decoding a track's event stream.
///
/// Once a track misparses every later offset is suspect, so these abort the
/// whole generation pass.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("track {track}: unknown opcode {opcode:#04x} at offset {offset:#x}")]
    UnknownOpcode { track: usize, offset: usize, opcode: u8 },

    #[error("track {track}: opcode {opcode:#04x} at offset {offset:#x} is truncated")]
    OutOfBounds {
        track: usize,
        offset: usize,
        opcode: u8,
        #[source]
        source: CursorError,
    },

    #[error("track {track}: loop point {offset:#x} is outside the track")]
    BadLoopPoint { track: usize, offset: usize },
}

impl DecodeError {
    /// Index of the track that failed.
    pub fn track(&self) -> usize {
        match *self {
            DecodeError::UnknownOpcode { track, .. }
            | DecodeError::OutOfBounds { track, .. }
            | DecodeError::BadLoopPoint { track, .. } => track,
        }
    }
}

/// Returned by [`Scheduler::pop_min`](crate::Scheduler::pop_min) when nothing is queued.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("scheduler is empty")]
    Empty,
}

/// Errors surfaced by the sequencer driver.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SequencerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("sample rate must be non-zero")]
    ZeroSampleRate,

    #[error("isolated track {track} does not exist (song has {num_tracks} tracks)")]
    TrackOutOfRange { track: usize, num_tracks: usize },

    #[error("rendering until the song ends never terminates: a selected track loops")]
    UnboundedRender,

    #[error("cannot render {requested} ticks from tick {position}: position would overflow")]
    TickOverflow { position: u64, requested: u64 },
}
