//! Deferred actions for the tick-slot scheduler.

use crate::tick_slot::TickSlot;

/// A scheduled entry in the sequencer's queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledEvent {
    /// When the action should fire
    pub slot: TickSlot,
    /// What the action does
    pub action: Action,
}

impl ScheduledEvent {
    pub fn new(slot: TickSlot, action: Action) -> Self {
        Self { slot, action }
    }
}

/// What a scheduled entry does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Release a note started earlier on `track`.
    NoteOff { track: usize, note: i32 },
    /// Continue decoding `track` from its saved position.
    ResumeTrack { track: usize },
}

impl Action {
    /// Track the action belongs to.
    pub fn track(&self) -> usize {
        match *self {
            Action::NoteOff { track, .. } | Action::ResumeTrack { track } => track,
        }
    }
}
