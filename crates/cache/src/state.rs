//! States of the optimistic mutation cycle.

use serde::Serialize;
use std::fmt;

/// Where a cached sheet is in the optimistic mutation cycle.
///
/// ```text
/// Idle -> Snapshot -> Pending -> Reconciling -> Idle   (write succeeded)
///                            \-> Idle                 (write failed, rolled back)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationState {
    /// No mutation in flight; the cache mirrors the last read.
    Idle,
    /// The pre-mutation value has been captured.
    Snapshot,
    /// The optimistic value is cached and the remote write is in flight.
    Pending,
    /// The write succeeded and a refetch is replacing the optimistic value.
    Reconciling,
}

impl MutationState {
    /// Whether `self -> next` is an edge of the cycle.
    pub fn can_transition_to(self, next: MutationState) -> bool {
        use MutationState::{Idle, Pending, Reconciling, Snapshot};
        matches!(
            (self, next),
            (Idle, Snapshot)
                | (Snapshot, Pending)
                | (Pending, Reconciling)
                | (Pending | Reconciling, Idle)
                // A second mutation may start before the first settles.
                | (Pending | Reconciling, Snapshot)
                | (Reconciling, Pending)
        )
    }
}

impl fmt::Display for MutationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationState::Idle => "idle",
            MutationState::Snapshot => "snapshot",
            MutationState::Pending => "pending",
            MutationState::Reconciling => "reconciling",
        };
        f.write_str(name)
    }
}
