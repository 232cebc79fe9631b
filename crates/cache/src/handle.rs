//! Handles returned to callers of an optimistic mutation.

use gsheet_core::{StoreError, StoreResult};
use tokio::sync::oneshot;

/// Result channels of one spawned mutation.
///
/// Dropping the handle abandons the result; the write itself still runs to
/// completion and the cache still reconciles or rolls back.
#[derive(Debug)]
pub struct MutationHandle {
    outcome: oneshot::Receiver<StoreResult<()>>,
    settled: oneshot::Receiver<()>,
}

impl MutationHandle {
    pub(crate) fn new(
        outcome: oneshot::Receiver<StoreResult<()>>,
        settled: oneshot::Receiver<()>,
    ) -> Self {
        MutationHandle { outcome, settled }
    }

    /// Wait for the remote write. On failure the cache has already been
    /// rolled back when this returns.
    pub async fn outcome(self) -> StoreResult<()> {
        self.outcome.await.unwrap_or_else(|_| Err(ended()))
    }

    /// Wait for the write and for the cache to settle: refetched after a
    /// success, restored after a failure.
    pub async fn settled(self) -> StoreResult<()> {
        let outcome = self.outcome.await.unwrap_or_else(|_| Err(ended()));
        let _ = self.settled.await;
        outcome
    }
}

fn ended() -> StoreError {
    StoreError::transport("mutation task ended without a result")
}
