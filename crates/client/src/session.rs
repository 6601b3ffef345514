//! Optimistic sync session.
//!
//! The session keeps a local projection of the caller's watchlist and
//! applies every mutation speculatively before the server answers:
//!
//! ```text
//! absent -> pending-create -> settled
//! settled -> pending-update -> settled
//! settled -> pending-delete -> absent
//! ```
//!
//! Each entry has at most one pending operation. A newer mutation on the
//! same entry supersedes the in-flight one: the per-entry version token
//! bumps and the superseded operation's late response is discarded on
//! arrival. Every speculative change is reversible from the snapshot taken
//! when it was applied, and the single most recent retryable failure is
//! retained for [`SyncSession::retry_last_failed`].
//!
//! The projection lock is never held across an await: speculative apply,
//! reconcile and rollback are each one lock scope, with the network call in
//! between.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use watchsync_core::media::{EntryPatch, MediaRef, NewEntry, TrackedEntry, WatchStatus};
use watchsync_core::storage::ListFilter;

use crate::error::{ClientError, Result, TransportError};
use crate::transport::SyncTransport;

/// Prefix of ids synthesized for entries whose create has not been
/// acknowledged yet.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Sync state of one entry, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Settled,
    PendingCreate,
    PendingUpdate,
    PendingDelete,
}

/// A mutation that can be re-issued after a failure.
#[derive(Debug, Clone)]
enum RetryOp {
    Create { new: NewEntry },
    Update { entry_id: String, patch: EntryPatch },
    Delete { entry_id: String },
}

#[derive(Debug, Clone)]
struct FailedOp {
    op: RetryOp,
    error: TransportError,
}

#[derive(Debug, Clone)]
struct PendingOp {
    state: EntryState,
    /// Per-entry version token; a response is only applied while its token
    /// is still the current one.
    token: u64,
    /// Last settled image, for rollback. `None` for pending creates, which
    /// roll back to absence.
    snapshot: Option<TrackedEntry>,
    /// List index for delete re-insertion.
    position: usize,
}

#[derive(Debug, Default)]
struct Projection {
    entries: Vec<TrackedEntry>,
    pending: HashMap<String, PendingOp>,
    next_token: u64,
    /// Bumped on every projection change; refresh application is keyed on
    /// it so a stale listing cannot clobber newer local state.
    version: u64,
    last_failed: Option<FailedOp>,
}

impl Projection {
    fn take_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn token_current(&self, entry_id: &str, token: u64) -> bool {
        self.pending
            .get(entry_id)
            .is_some_and(|p| p.token == token)
    }

    fn index_of(&self, entry_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == entry_id)
    }

    fn replace(&mut self, entry_id: &str, entry: TrackedEntry) {
        if let Some(slot) = self.entries.iter_mut().find(|e| e.id == entry_id) {
            *slot = entry;
        }
    }
}

/// Optimistic client session over a sync transport.
pub struct SyncSession<T>
where
    T: SyncTransport,
{
    transport: Arc<T>,
    projection: Mutex<Projection>,
}

impl<T> SyncSession<T>
where
    T: SyncTransport,
{
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            projection: Mutex::new(Projection::default()),
        }
    }

    /// Returns a snapshot of the projection in its current order.
    pub async fn entries(&self) -> Vec<TrackedEntry> {
        self.projection.lock().await.entries.clone()
    }

    /// Returns the sync state of an entry, or `None` when it is absent.
    pub async fn entry_state(&self, entry_id: &str) -> Option<EntryState> {
        let proj = self.projection.lock().await;
        if let Some(pending) = proj.pending.get(entry_id) {
            return Some(pending.state);
        }
        proj.index_of(entry_id).map(|_| EntryState::Settled)
    }

    /// Returns the error of the retained failed operation, if any.
    pub async fn last_failure(&self) -> Option<TransportError> {
        let proj = self.projection.lock().await;
        proj.last_failed.as_ref().map(|f| f.error.clone())
    }

    /// Returns true when a failed operation is retained for retry.
    pub async fn has_retryable_failure(&self) -> bool {
        self.projection.lock().await.last_failed.is_some()
    }

    /// Tracks a media item: the entry appears in the projection
    /// immediately under a temporary id, which the server-assigned record
    /// replaces on acknowledgment.
    pub async fn add(&self, media: MediaRef, status: WatchStatus) -> Result<TrackedEntry> {
        self.run_create(NewEntry::new(media, status)).await
    }

    /// Applies a patch to a settled entry, optimistically.
    pub async fn update(&self, entry_id: &str, patch: EntryPatch) -> Result<TrackedEntry> {
        self.run_update(entry_id.to_string(), patch).await
    }

    /// Removes an entry, optimistically.
    pub async fn remove(&self, entry_id: &str) -> Result<()> {
        self.run_delete(entry_id.to_string()).await
    }

    /// Re-issues the retained failed operation.
    ///
    /// Returns `Ok(false)` when nothing is retained. On renewed failure the
    /// latest attempt replaces the retained one, so the next retry repeats
    /// what just failed.
    pub async fn retry_last_failed(&self) -> Result<bool> {
        let failed = self.projection.lock().await.last_failed.take();
        let Some(failed) = failed else {
            return Ok(false);
        };
        match failed.op {
            RetryOp::Create { new } => self.run_create(new).await.map(|_| true),
            RetryOp::Update { entry_id, patch } => {
                self.run_update(entry_id, patch).await.map(|_| true)
            }
            RetryOp::Delete { entry_id } => self.run_delete(entry_id).await.map(|_| true),
        }
    }

    /// Replaces the projection with the server's current listing.
    ///
    /// Application is keyed on the projection version captured at issue
    /// time: if any mutation changed the projection while the listing was
    /// in flight, the stale listing is skipped. When it does apply, pending
    /// operations are merged back in so in-flight mutations are never
    /// clobbered; snapshots of pending updates are re-based onto the fresh
    /// rows.
    pub async fn refresh(&self, search: Option<&str>) -> Result<Vec<TrackedEntry>> {
        let filter = match search {
            Some(query) => ListFilter::default().with_search(query),
            None => ListFilter::default(),
        };
        let issued_version = self.projection.lock().await.version;

        let listing = self
            .transport
            .list_entries(&filter)
            .await
            .map_err(ClientError::Transport)?;

        let mut proj = self.projection.lock().await;
        if proj.version != issued_version {
            tracing::debug!(
                issued_version,
                current_version = proj.version,
                "skipping stale refresh"
            );
            return Ok(proj.entries.clone());
        }

        let mut merged = listing;
        let pending_ids: Vec<String> = proj.pending.keys().cloned().collect();
        for id in pending_ids {
            let Some(index) = proj.index_of(&id) else {
                // Pending delete: the entry is locally absent, keep it so.
                merged.retain(|e| e.id != id);
                continue;
            };
            let optimistic = proj.entries[index].clone();
            match merged.iter().position(|e| e.id == id) {
                Some(fresh_index) => {
                    // Re-base the rollback snapshot onto the fresh row, then
                    // keep the optimistic image on top of it.
                    let fresh = merged[fresh_index].clone();
                    if let Some(pending) = proj.pending.get_mut(&id) {
                        if pending.snapshot.is_some() {
                            pending.snapshot = Some(fresh);
                        }
                    }
                    merged[fresh_index] = optimistic;
                }
                None => {
                    // Unacknowledged create (or a row the server no longer
                    // lists): preserve the optimistic image at the head.
                    merged.insert(0, optimistic);
                }
            }
        }

        proj.entries = merged;
        proj.version += 1;
        Ok(proj.entries.clone())
    }

    async fn run_create(&self, new: NewEntry) -> Result<TrackedEntry> {
        let temp_id = format!("{LOCAL_ID_PREFIX}{}", Uuid::new_v4());
        let token;
        {
            let mut proj = self.projection.lock().await;
            proj.last_failed = None;
            token = proj.take_token();
            // The owner id is unknown until the server answers; the whole
            // record is replaced on acknowledgment.
            let optimistic = TrackedEntry::new(String::new(), &new.media, new.status)
                .with_id(temp_id.clone());
            proj.entries.insert(0, optimistic);
            proj.pending.insert(
                temp_id.clone(),
                PendingOp {
                    state: EntryState::PendingCreate,
                    token,
                    snapshot: None,
                    position: 0,
                },
            );
            proj.version += 1;
        }

        let result = self.transport.create_entry(&new).await;

        let mut proj = self.projection.lock().await;
        if !proj.token_current(&temp_id, token) {
            return result.map_err(ClientError::Transport);
        }
        match result {
            Ok(entry) => {
                proj.pending.remove(&temp_id);
                proj.replace(&temp_id, entry.clone());
                proj.version += 1;
                Ok(entry)
            }
            Err(err) => {
                proj.pending.remove(&temp_id);
                proj.entries.retain(|e| e.id != temp_id);
                proj.version += 1;
                if err.is_retryable() {
                    proj.last_failed = Some(FailedOp {
                        op: RetryOp::Create { new },
                        error: err.clone(),
                    });
                }
                Err(err.into())
            }
        }
    }

    async fn run_update(&self, entry_id: String, patch: EntryPatch) -> Result<TrackedEntry> {
        let token;
        {
            let mut proj = self.projection.lock().await;
            if entry_id.starts_with(LOCAL_ID_PREFIX) {
                return Err(ClientError::UnacknowledgedEntry { id: entry_id });
            }
            let Some(index) = proj.index_of(&entry_id) else {
                return Err(ClientError::UnknownEntry { id: entry_id });
            };
            proj.last_failed = None;
            token = proj.take_token();
            // When superseding an in-flight update, keep its snapshot: the
            // last settled image is still the rollback target.
            let snapshot = match proj.pending.remove(&entry_id) {
                Some(prior) => prior.snapshot,
                None => Some(proj.entries[index].clone()),
            };
            let entry = &mut proj.entries[index];
            patch.apply(entry);
            entry.updated_at = Utc::now();
            proj.pending.insert(
                entry_id.clone(),
                PendingOp {
                    state: EntryState::PendingUpdate,
                    token,
                    snapshot,
                    position: index,
                },
            );
            proj.version += 1;
        }

        let result = self.transport.update_entry(&entry_id, &patch).await;

        let mut proj = self.projection.lock().await;
        if !proj.token_current(&entry_id, token) {
            tracing::debug!(%entry_id, "discarding superseded update response");
            return result.map_err(ClientError::Transport);
        }
        match result {
            Ok(entry) => {
                proj.pending.remove(&entry_id);
                proj.replace(&entry_id, entry.clone());
                proj.version += 1;
                Ok(entry)
            }
            Err(err) => {
                if let Some(pending) = proj.pending.remove(&entry_id) {
                    if let Some(snapshot) = pending.snapshot {
                        proj.replace(&entry_id, snapshot);
                    }
                }
                proj.version += 1;
                if err.is_retryable() {
                    proj.last_failed = Some(FailedOp {
                        op: RetryOp::Update {
                            entry_id: entry_id.clone(),
                            patch,
                        },
                        error: err.clone(),
                    });
                }
                Err(err.into())
            }
        }
    }

    async fn run_delete(&self, entry_id: String) -> Result<()> {
        let token;
        {
            let mut proj = self.projection.lock().await;
            if entry_id.starts_with(LOCAL_ID_PREFIX) {
                return Err(ClientError::UnacknowledgedEntry { id: entry_id });
            }
            let Some(index) = proj.index_of(&entry_id) else {
                return Err(ClientError::UnknownEntry { id: entry_id });
            };
            proj.last_failed = None;
            token = proj.take_token();
            let snapshot = match proj.pending.remove(&entry_id) {
                Some(prior) => prior.snapshot,
                None => Some(proj.entries[index].clone()),
            };
            proj.entries.remove(index);
            proj.pending.insert(
                entry_id.clone(),
                PendingOp {
                    state: EntryState::PendingDelete,
                    token,
                    snapshot,
                    position: index,
                },
            );
            proj.version += 1;
        }

        let result = self.transport.delete_entry(&entry_id).await;

        let mut proj = self.projection.lock().await;
        if !proj.token_current(&entry_id, token) {
            tracing::debug!(%entry_id, "discarding superseded delete response");
            return result.map_err(ClientError::Transport);
        }
        match result {
            Ok(()) => {
                proj.pending.remove(&entry_id);
                proj.version += 1;
                Ok(())
            }
            Err(err) => {
                if let Some(pending) = proj.pending.remove(&entry_id) {
                    if let Some(snapshot) = pending.snapshot {
                        let at = pending.position.min(proj.entries.len());
                        proj.entries.insert(at, snapshot);
                    }
                }
                proj.version += 1;
                if err.is_retryable() {
                    proj.last_failed = Some(FailedOp {
                        op: RetryOp::Delete {
                            entry_id: entry_id.clone(),
                        },
                        error: err.clone(),
                    });
                }
                Err(err.into())
            }
        }
    }
}
