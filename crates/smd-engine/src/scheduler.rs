//! Priority queue of deferred actions keyed by tick slot.

use smd_ir::{Action, ScheduledEvent, TickSlot};

use crate::error::SchedulerError;

/// A min-queue of scheduled actions ordered by [`TickSlot`].
///
/// Entries with equal slots pop in the order they were pushed. Events are
/// stored in descending order so the earliest one sits at the end of the
/// vector and pops without shifting.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    events: Vec<ScheduledEvent>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Queue `action` at `slot`.
    pub fn push(&mut self, slot: TickSlot, action: Action) {
        // Insert in front of equal slots so earlier pushes stay nearer the tail.
        let pos = self.events.partition_point(|e| e.slot > slot);
        self.events.insert(pos, ScheduledEvent::new(slot, action));
    }

    /// Remove and return the earliest entry.
    pub fn pop_min(&mut self) -> Result<ScheduledEvent, SchedulerError> {
        self.events.pop().ok_or(SchedulerError::Empty)
    }

    /// Peek at the earliest entry without removing it.
    pub fn peek(&self) -> Option<&ScheduledEvent> {
        self.events.last()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
