//! Composite ordering key for scheduled events.

/// Position of a scheduled event: `tick * 2 + parity`.
///
/// Parity 0 holds note events due at the start of a tick, parity 1 holds
/// pause continuations that run after every note of the same tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickSlot(pub u64);

impl TickSlot {
    /// Latest tick whose pause slot still fits in a `u64`.
    pub const MAX_TICK: u64 = u64::MAX / 2;

    /// Slot for a note event at `tick`. Saturates past [`Self::MAX_TICK`].
    pub const fn note(tick: u64) -> Self {
        Self(tick.saturating_mul(2))
    }

    /// Slot for a pause continuation at `tick`. Saturates past [`Self::MAX_TICK`].
    pub const fn pause(tick: u64) -> Self {
        Self(tick.saturating_mul(2).saturating_add(1))
    }

    /// The tick this slot falls on.
    pub const fn tick(self) -> u64 {
        self.0 / 2
    }
}
