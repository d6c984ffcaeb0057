//! Static scan of a track's event stream.
//!
//! Walks the opcodes once, front to back, without scheduling anything.
//! Used to validate a track up front and to report what it contains.

use core::fmt;

use crate::cursor::{ByteCursor, CursorError};
use crate::opcode::{Opcode, PAUSE_TICKS};
use crate::song::Track;

/// Error raised while scanning a track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("unknown opcode {opcode:#04x} at offset {offset:#x}")]
    UnknownOpcode { offset: usize, opcode: u8 },
    #[error(transparent)]
    OutOfBounds(#[from] CursorError),
}

/// What a single linear pass over a track found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackSummary {
    /// Buffer length in bytes
    pub len: usize,
    pub notes: usize,
    pub pauses: usize,
    /// Offset recorded by the loop point opcode, if any
    pub loop_start: Option<usize>,
    /// Ticks elapsed when the loop point is reached
    pub loop_tick: Option<u64>,
    /// True if the scan stopped on an end-of-track opcode
    pub has_end: bool,
    /// Ticks elapsed when the scan stopped
    pub ticks: u64,
}

/// Scan `track` up to its first end-of-track opcode (or the buffer end).
pub fn analyze_track(track: &Track) -> Result<TrackSummary, ScanError> {
    let mut cursor = track.cursor();
    let mut summary = TrackSummary {
        len: cursor.len(),
        ..TrackSummary::default()
    };
    let mut last_pause: u32 = 0;

    while !cursor.is_at_end() {
        let offset = cursor.tell();
        let byte = cursor.read_u8()?;
        let op = Opcode::classify(byte).ok_or(ScanError::UnknownOpcode { offset, opcode: byte })?;

        match op {
            Opcode::NoteOn { .. } => {
                let param = cursor.read_u8()?;
                cursor.read_bytes((param >> 6) as usize)?;
                summary.notes += 1;
            }
            Opcode::TrackEnd => {
                summary.has_end = true;
                break;
            }
            Opcode::LoopPoint => {
                summary.loop_start = Some(cursor.tell());
                summary.loop_tick = Some(summary.ticks);
            }
            op if op.is_pause() => {
                last_pause = scan_pause(op, &mut cursor, last_pause)?;
                summary.ticks += last_pause as u64;
                summary.pauses += 1;
            }
            other => {
                let len = other.payload_len().unwrap_or(0);
                cursor.read_bytes(len)?;
            }
        }
    }

    Ok(summary)
}

fn scan_pause(op: Opcode, cursor: &mut ByteCursor, last: u32) -> Result<u32, CursorError> {
    Ok(match op {
        Opcode::Pause { index } => PAUSE_TICKS[index as usize],
        Opcode::RepeatPause => last,
        Opcode::AddPause => last.saturating_add(cursor.read_u8()? as u32),
        Opcode::Pause8 => cursor.read_u8()? as u32,
        Opcode::Pause16 => cursor.read_u16_le()? as u32,
        Opcode::Pause24 => cursor.read_u24_le()?,
        _ => last,
    })
}

impl fmt::Display for TrackSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes, {} notes, {} pauses, {} ticks",
            self.len, self.notes, self.pauses, self.ticks
        )?;
        match (self.loop_start, self.loop_tick) {
            (Some(offset), Some(tick)) => write!(f, ", loops to {offset:#x} (tick {tick})")?,
            _ if self.has_end => write!(f, ", ends")?,
            _ => write!(f, ", runs off end")?,
        }
        Ok(())
    }
}
