//! Per-track playback state.

use smd_ir::{ByteCursor, Track};

/// Mutable decoding state for a single track.
///
/// Owned by the sequencer and only touched by the decoder acting on this
/// track.
#[derive(Clone, Debug)]
pub struct TrackState {
    /// Read position in the track's event bytes
    pub cursor: ByteCursor,
    /// Current octave (signed, notes are `12 * octave + note`)
    pub octave: i32,
    /// Duration of the last note that carried explicit duration bytes, in ticks
    pub last_note_len: u32,
    /// Length of the last pause, in ticks
    pub last_pause_len: u32,
    /// Offset just past the loop point opcode, if one was seen
    pub loop_start: Option<usize>,
    /// The track has ended and will not be resumed
    pub completed: bool,
    /// A pause was scheduled since the last loop point / loop jump
    pub(crate) advanced_since_loop: bool,
}

impl TrackState {
    pub fn new(track: &Track) -> Self {
        Self {
            cursor: track.cursor(),
            octave: 0,
            last_note_len: 0,
            last_pause_len: 0,
            loop_start: None,
            completed: false,
            advanced_since_loop: false,
        }
    }

    /// Rewind to the start of the track and clear everything learned so far.
    pub fn reset(&mut self) {
        self.cursor.rewind();
        self.octave = 0;
        self.last_note_len = 0;
        self.last_pause_len = 0;
        self.loop_start = None;
        self.completed = false;
        self.advanced_since_loop = false;
    }

    /// Byte offset of the next event.
    pub fn position(&self) -> usize {
        self.cursor.tell()
    }
}
