//! Trigger-state classification.
//!
//! Every viewport carries a three-state machine deciding where the target
//! currently sits relative to the zone's two absolute thresholds, and
//! whether a transition callback is due. Classification is a pure function
//! of `(offset, start, end)`; the machine adds edge-triggering on top so a
//! callback fires once per crossing, not once per tick.
//!
//! # Axis and tie-break rules
//!
//! The offset is the target's top edge relative to the root's top edge; it
//! decreases as the container scrolls down. A zone is normally configured
//! with `start >= end` (the start line is reached first while scrolling
//! down). An inverted pair (`start < end`) mirrors the axis: `Before` is
//! always the start side, `After` always the end side. An offset exactly
//! equal to either threshold classifies `During` — the boundaries belong to
//! the zone.

use serde::{Deserialize, Serialize};

/// Where the target sits relative to a zone's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    /// On the start side: the zone has not been reached.
    Before,
    /// Inside the zone, boundaries inclusive.
    During,
    /// Past the end threshold.
    After,
}

/// Classify an offset against a zone's absolute thresholds.
pub fn classify(offset: f64, start: f64, end: f64) -> TriggerState {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    if offset >= lo && offset <= hi {
        return TriggerState::During;
    }
    let before_is_above = start >= end;
    if (before_is_above && offset > start) || (!before_is_above && offset < start) {
        TriggerState::Before
    } else {
        TriggerState::After
    }
}

/// Edge-triggered state machine for one viewport.
///
/// Holds the last classified state; [`TriggerZone::step`] returns the state
/// whose callback is due this tick, or `None` when nothing should fire. The
/// first step always fires (there is no prior state to compare against).
#[derive(Debug, Default)]
pub struct TriggerZone {
    state: Option<TriggerState>,
}

impl TriggerZone {
    pub const fn new() -> Self {
        Self { state: None }
    }

    /// The last classified state, if any tick has been evaluated.
    pub fn state(&self) -> Option<TriggerState> {
        self.state
    }

    /// Advance the machine by one tick.
    ///
    /// Returns `Some(state)` when the state changed (fire that state's
    /// callback exactly once), or when `force_boundary` is set and the
    /// offset sits exactly on a threshold. A tick that jumps straight from
    /// `Before` to `After` fires only the new state's callback.
    pub fn step(
        &mut self,
        offset: f64,
        start: f64,
        end: f64,
        force_boundary: bool,
    ) -> Option<TriggerState> {
        let next = classify(offset, start, end);
        let crossed = self.state != Some(next);
        self.state = Some(next);

        let at_boundary = offset == start || offset == end;
        if crossed || (force_boundary && at_boundary) {
            Some(next)
        } else {
            None
        }
    }
}
