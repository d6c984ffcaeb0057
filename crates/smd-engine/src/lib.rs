//! Playback engine for the smd sequencer.
//!
//! Decodes per-track event streams, schedules their effects on exact tick
//! slots, and renders stereo frames paced to those ticks.

mod config;
mod decoder;
mod error;
mod frame;
mod scheduler;
mod sequencer;
mod synth;
mod track_state;

pub use config::{SessionConfig, TrackSelect};
pub use decoder::{decode_event, resume_track, DecodeContext, Flow};
pub use error::{DecodeError, SchedulerError, SequencerError};
pub use frame::Frame;
pub use scheduler::Scheduler;
pub use sequencer::{RenderLength, Sequencer};
pub use synth::{Silence, Synth};
pub use track_state::TrackState;
