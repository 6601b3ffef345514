//! The client-side transport boundary.
//!
//! `SyncTransport` is what the optimistic session talks to; production
//! implementations carry the caller's credential and put the operations on
//! the wire. `WithTimeout` bounds every call with a caller-supplied
//! timeout, surfacing an elapsed timeout as its own error kind rather than
//! a server failure - the underlying call may still land, and the caller
//! decides whether to retry.

use std::time::Duration;

use async_trait::async_trait;

use watchsync_core::media::{EntryPatch, NewEntry, TrackedEntry};
use watchsync_core::storage::ListFilter;

use crate::error::TransportError;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Remote sync API as seen by one authenticated caller.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Creates an entry, returning the server-assigned record.
    async fn create_entry(&self, new: &NewEntry) -> Result<TrackedEntry>;

    /// Applies a patch, returning the server's updated record.
    async fn update_entry(&self, entry_id: &str, patch: &EntryPatch) -> Result<TrackedEntry>;

    /// Deletes an entry.
    async fn delete_entry(&self, entry_id: &str) -> Result<()>;

    /// Lists the caller's entries in server order.
    async fn list_entries(&self, filter: &ListFilter) -> Result<Vec<TrackedEntry>>;
}

/// Default per-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout decorator over any transport.
pub struct WithTimeout<T>
where
    T: SyncTransport,
{
    inner: T,
    timeout: Duration,
}

impl<T> WithTimeout<T>
where
    T: SyncTransport,
{
    /// Wraps a transport with the default 10-second call timeout.
    pub fn new(inner: T) -> Self {
        Self::with_timeout(inner, DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_timeout(inner: T, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<F, R>(&self, call: F) -> Result<R>
    where
        F: std::future::Future<Output = Result<R>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "call timed out");
                Err(TransportError::Timeout)
            }
        }
    }
}

#[async_trait]
impl<T> SyncTransport for WithTimeout<T>
where
    T: SyncTransport + 'static,
{
    async fn create_entry(&self, new: &NewEntry) -> Result<TrackedEntry> {
        self.bounded(self.inner.create_entry(new)).await
    }

    async fn update_entry(&self, entry_id: &str, patch: &EntryPatch) -> Result<TrackedEntry> {
        self.bounded(self.inner.update_entry(entry_id, patch)).await
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<()> {
        self.bounded(self.inner.delete_entry(entry_id)).await
    }

    async fn list_entries(&self, filter: &ListFilter) -> Result<Vec<TrackedEntry>> {
        self.bounded(self.inner.list_entries(filter)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchsync_core::media::{MediaKind, MediaRef, WatchStatus};

    /// Transport that answers after a fixed delay.
    struct SlowTransport {
        delay: Duration,
    }

    #[async_trait]
    impl SyncTransport for SlowTransport {
        async fn create_entry(&self, new: &NewEntry) -> Result<TrackedEntry> {
            tokio::time::sleep(self.delay).await;
            Ok(TrackedEntry::new("u1", &new.media, new.status))
        }

        async fn update_entry(&self, _entry_id: &str, _patch: &EntryPatch) -> Result<TrackedEntry> {
            tokio::time::sleep(self.delay).await;
            Err(TransportError::NotFound("nope".to_string()))
        }

        async fn delete_entry(&self, _entry_id: &str) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        async fn list_entries(&self, _filter: &ListFilter) -> Result<Vec<TrackedEntry>> {
            tokio::time::sleep(self.delay).await;
            Ok(Vec::new())
        }
    }

    fn new_movie() -> NewEntry {
        NewEntry::new(
            MediaRef::new(42, MediaKind::Movie, "Heat"),
            WatchStatus::PlanToWatch,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_call_passes_through() {
        let transport = WithTimeout::new(SlowTransport {
            delay: Duration::from_secs(1),
        });

        let entry = transport.create_entry(&new_movie()).await.unwrap();
        assert_eq!(entry.media_id, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out_distinctly() {
        let transport = WithTimeout::new(SlowTransport {
            delay: Duration::from_secs(30),
        });

        let result = transport.create_entry(&new_movie()).await;

        assert_eq!(result, Err(TransportError::Timeout));
        assert!(result.unwrap_err().is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inner_error_is_not_rewritten() {
        let transport = WithTimeout::new(SlowTransport {
            delay: Duration::from_secs(1),
        });

        let result = transport.update_entry("e1", &EntryPatch::default()).await;

        assert_eq!(result, Err(TransportError::NotFound("nope".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeout() {
        let transport = WithTimeout::with_timeout(
            SlowTransport {
                delay: Duration::from_secs(3),
            },
            Duration::from_secs(2),
        );

        assert_eq!(
            transport.list_entries(&ListFilter::default()).await,
            Err(TransportError::Timeout)
        );
    }
}
