//! Core IR types for the smd sequencer.
//!
//! This crate defines the song representation, the opcode table of the
//! per-track event format, and the ordering keys used by the scheduler.
//! The playback engine consumes these types.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod action;
mod analysis;
mod cursor;
mod opcode;
pub mod song;
mod tick_slot;
pub mod timing;

pub use action::{Action, ScheduledEvent};
pub use analysis::{analyze_track, ScanError, TrackSummary};
pub use cursor::{ByteCursor, CursorError};
pub use opcode::{Opcode, PAUSE_TICKS};
pub use song::{Song, SongError, Track, DEFAULT_TEMPO};
pub use tick_slot::TickSlot;
pub use timing::{samples_to_ticks, ticks_to_samples};
