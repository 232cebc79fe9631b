//! # gsheet-cache
//!
//! A per-sheet read cache that applies mutations optimistically.
//!
//! A mutation runs as a spawned task: the cached copy is snapshotted and
//! changed in place, the real write is issued through the record store,
//! and the task then either refetches the sheet (success) or restores the
//! snapshot (failure). Callers hold a [`MutationHandle`] to await the
//! outcome; dropping it does not cancel the write.
//!
//! Mutations against the same sheet are not serialized. A mutation started
//! before an earlier one settles snapshots the already-optimistic value,
//! and the last refetch to arrive wins.

mod handle;
mod state;

pub use handle::MutationHandle;
pub use state::MutationState;

use gsheet_core::{LedgerEntry, Record, SheetData, SheetInfo, StoreResult};
use gsheet_store::SheetRecordStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};

#[derive(Debug)]
struct CacheEntry {
    data: SheetData,
    state: MutationState,
    /// Identity of this entry; a result carrying another epoch is stale.
    epoch: u64,
    in_flight: usize,
}

impl CacheEntry {
    fn transition(&mut self, next: MutationState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid cache transition {} -> {next}",
            self.state
        );
        self.state = next;
    }
}

/// What a mutation captured when it began.
struct Begun {
    epoch: u64,
    snapshot: SheetData,
}

/// Shared optimistic cache keyed by sheet name.
#[derive(Clone)]
pub struct SheetCache {
    store: SheetRecordStore,
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    next_epoch: Arc<AtomicU64>,
}

impl SheetCache {
    pub fn new(store: SheetRecordStore) -> Self {
        SheetCache {
            store,
            entries: Arc::new(RwLock::new(HashMap::new())),
            next_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The underlying record store.
    pub fn store(&self) -> &SheetRecordStore {
        &self.store
    }

    /// Sheet listing for presentation; failures degrade to an empty list.
    pub async fn list_sheets(&self) -> Vec<SheetInfo> {
        self.store.list_sheets_or_empty().await
    }

    /// Fetch `sheet_name` and replace its cached value.
    pub async fn load(&self, sheet_name: &str) -> StoreResult<SheetData> {
        let data = self.store.get_sheet_data(sheet_name).await?;
        let mut entries = self.entries.write().await;
        match entries.get_mut(sheet_name) {
            Some(entry) => entry.data = data.clone(),
            None => {
                entries.insert(
                    sheet_name.to_string(),
                    CacheEntry {
                        data: data.clone(),
                        state: MutationState::Idle,
                        epoch: self.next_epoch.fetch_add(1, Ordering::SeqCst),
                        in_flight: 0,
                    },
                );
            }
        }
        Ok(data)
    }

    /// Cached value of `sheet_name`, if loaded.
    pub async fn get(&self, sheet_name: &str) -> Option<SheetData> {
        self.entries
            .read()
            .await
            .get(sheet_name)
            .map(|entry| entry.data.clone())
    }

    /// Cached value, loading it on a miss.
    pub async fn get_or_load(&self, sheet_name: &str) -> StoreResult<SheetData> {
        if let Some(data) = self.get(sheet_name).await {
            return Ok(data);
        }
        self.load(sheet_name).await
    }

    /// Mutation state of `sheet_name`, if cached.
    pub async fn state(&self, sheet_name: &str) -> Option<MutationState> {
        self.entries
            .read()
            .await
            .get(sheet_name)
            .map(|entry| entry.state)
    }

    /// Drop the cached value. Results of mutations still in flight for this
    /// sheet are discarded when they arrive.
    pub async fn invalidate(&self, sheet_name: &str) {
        if self.entries.write().await.remove(sheet_name).is_some() {
            tracing::debug!(sheet = sheet_name, "invalidated cache entry");
        }
    }

    /// Overwrite a record, showing the new values before the write lands.
    ///
    /// The cached record receives `record`'s values under their headers, as
    /// the spreadsheet itself would store them.
    pub async fn update_record(
        &self,
        sheet_name: &str,
        row_index: usize,
        record: Record,
    ) -> MutationHandle {
        let begun = self
            .begin(sheet_name, |data| data.apply_record(row_index, &record))
            .await;

        let store = self.store.clone();
        let name = sheet_name.to_string();
        self.spawn_mutation(sheet_name, begun, async move {
            store.update_record(&name, row_index, &record).await
        })
    }

    /// Append a ledger row, showing it as the last record before the write
    /// lands.
    pub async fn append_record(&self, sheet_name: &str, entry: LedgerEntry) -> MutationHandle {
        let row = entry.to_row();
        let begun = self
            .begin(sheet_name, |data| {
                let record = data.next_record(&row);
                data.records.push(record);
            })
            .await;

        let store = self.store.clone();
        let name = sheet_name.to_string();
        self.spawn_mutation(sheet_name, begun, async move {
            store.append_record(&name, &entry).await
        })
    }

    /// Snapshot the cached value and apply `change` to it. Returns `None`
    /// when the sheet is not cached; the write then goes through without an
    /// optimistic step.
    async fn begin(&self, sheet_name: &str, change: impl FnOnce(&mut SheetData)) -> Option<Begun> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(sheet_name)?;

        entry.transition(MutationState::Snapshot);
        let snapshot = entry.data.clone();
        change(&mut entry.data);
        entry.in_flight += 1;
        entry.transition(MutationState::Pending);

        Some(Begun {
            epoch: entry.epoch,
            snapshot,
        })
    }

    fn spawn_mutation<F>(&self, sheet_name: &str, begun: Option<Begun>, write: F) -> MutationHandle
    where
        F: std::future::Future<Output = StoreResult<()>> + Send + 'static,
    {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (settled_tx, settled_rx) = oneshot::channel();
        let cache = self.clone();
        let name = sheet_name.to_string();

        tokio::spawn(async move {
            let result = write.await;
            match (result, begun) {
                (Ok(()), Some(begun)) => {
                    cache.mark_reconciling(&name, begun.epoch).await;
                    let _ = outcome_tx.send(Ok(()));
                    cache.reconcile(&name, begun.epoch).await;
                }
                (Err(e), Some(begun)) => {
                    tracing::warn!(sheet = %name, "mutation failed, rolling back: {e}");
                    cache.rollback(&name, begun).await;
                    let _ = outcome_tx.send(Err(e));
                }
                (result, None) => {
                    let _ = outcome_tx.send(result);
                }
            }
            let _ = settled_tx.send(());
        });

        MutationHandle::new(outcome_rx, settled_rx)
    }

    async fn mark_reconciling(&self, sheet_name: &str, epoch: u64) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(sheet_name).filter(|e| e.epoch == epoch) {
            if entry.state != MutationState::Reconciling {
                entry.transition(MutationState::Reconciling);
            }
        }
    }

    /// Replace the cached value with a fresh read, unless the entry was
    /// invalidated in the meantime.
    async fn reconcile(&self, sheet_name: &str, epoch: u64) {
        let fresh = self.store.get_sheet_data(sheet_name).await;

        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(sheet_name).filter(|e| e.epoch == epoch) else {
            tracing::debug!(sheet = sheet_name, "discarding refetch for invalidated entry");
            return;
        };
        match fresh {
            Ok(data) => entry.data = data,
            Err(e) => tracing::warn!(sheet = sheet_name, "refetch after write failed: {e}"),
        }
        Self::settle(entry);
    }

    async fn rollback(&self, sheet_name: &str, begun: Begun) {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(sheet_name).filter(|e| e.epoch == begun.epoch) else {
            return;
        };
        entry.data = begun.snapshot;
        Self::settle(entry);
    }

    fn settle(entry: &mut CacheEntry) {
        entry.in_flight = entry.in_flight.saturating_sub(1);
        if entry.in_flight == 0 {
            entry.transition(MutationState::Idle);
        } else {
            entry.state = MutationState::Pending;
        }
    }
}
