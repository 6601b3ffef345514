//! Cached entry store decorator.
//!
//! Wraps an `EntryStore` with the cache-aside pattern:
//! - **Reads**: listing lookups go through the cache first and fall back to
//!   the store on a miss or on any cache failure.
//! - **Writes**: persist to the store, then synchronously invalidate every
//!   cached listing of that owner before the response is returned. A
//!   subsequent read can therefore never observe a pre-write snapshot.
//!
//! Invalidation failures are logged and swallowed: a cache that cannot be
//! reached cannot serve stale data either, since reads degrade to the
//! store too.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use watchsync_core::auth::UserIdentity;
use watchsync_core::cache::{read_through, watchlist_key, watchlist_pattern, Cache};
use watchsync_core::media::{EntryPatch, NewEntry, TrackedEntry};
use watchsync_core::storage::{EntryStore, ListFilter, Result};

/// Cache-aside decorator over an entry store.
pub struct CachedEntryStore<S, C>
where
    S: EntryStore,
    C: Cache,
{
    store: Arc<S>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<S, C> CachedEntryStore<S, C>
where
    S: EntryStore,
    C: Cache,
{
    /// Creates a new cached store with the given listing TTL.
    pub fn new(store: Arc<S>, cache: Arc<C>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    async fn invalidate_owner(&self, owner_id: &str) {
        let pattern = watchlist_pattern(owner_id);
        if let Err(err) = self.cache.delete_pattern(&pattern).await {
            tracing::warn!(
                owner_id,
                error = %err,
                "failed to invalidate watchlist cache"
            );
        }
    }
}

#[async_trait]
impl<S, C> EntryStore for CachedEntryStore<S, C>
where
    S: EntryStore + 'static,
    C: Cache + 'static,
{
    async fn create_entry(&self, owner: &UserIdentity, new: &NewEntry) -> Result<TrackedEntry> {
        let entry = self.store.create_entry(owner, new).await?;
        self.invalidate_owner(&owner.uid).await;
        tracing::debug!(entry_id = %entry.id, owner_id = %owner.uid, "entry created");
        Ok(entry)
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        owner: &UserIdentity,
        patch: &EntryPatch,
    ) -> Result<TrackedEntry> {
        let entry = self.store.update_entry(entry_id, owner, patch).await?;
        self.invalidate_owner(&owner.uid).await;
        tracing::debug!(entry_id, owner_id = %owner.uid, "entry updated");
        Ok(entry)
    }

    async fn delete_entry(&self, entry_id: &str, owner: &UserIdentity) -> Result<()> {
        self.store.delete_entry(entry_id, owner).await?;
        self.invalidate_owner(&owner.uid).await;
        tracing::debug!(entry_id, owner_id = %owner.uid, "entry deleted");
        Ok(())
    }

    async fn list_entries(&self, owner_id: &str, filter: &ListFilter) -> Result<Vec<TrackedEntry>> {
        let key = watchlist_key(owner_id, filter);
        read_through(self.cache.as_ref(), &key, Some(self.ttl), || {
            self.store.list_entries(owner_id, filter)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    use watchsync_core::cache::{pattern_matches, CacheError, Result as CacheResult};
    use watchsync_core::media::{MediaKind, MediaRef, WatchStatus};
    use watchsync_core::storage::RepositoryError;

    // Mock store that tracks list calls.
    #[derive(Default)]
    struct MockStore {
        entries: RwLock<HashMap<String, TrackedEntry>>,
        list_calls: AtomicUsize,
    }

    #[async_trait]
    impl EntryStore for MockStore {
        async fn create_entry(&self, owner: &UserIdentity, new: &NewEntry) -> Result<TrackedEntry> {
            let entry = TrackedEntry::new(owner.uid.clone(), &new.media, new.status);
            self.entries
                .write()
                .await
                .insert(entry.id.clone(), entry.clone());
            Ok(entry)
        }

        async fn update_entry(
            &self,
            entry_id: &str,
            _owner: &UserIdentity,
            patch: &EntryPatch,
        ) -> Result<TrackedEntry> {
            let mut entries = self.entries.write().await;
            let entry = entries
                .get_mut(entry_id)
                .ok_or_else(|| RepositoryError::NotFound {
                    entity_type: "TrackedEntry",
                    id: entry_id.to_string(),
                })?;
            patch.apply(entry);
            Ok(entry.clone())
        }

        async fn delete_entry(&self, entry_id: &str, _owner: &UserIdentity) -> Result<()> {
            self.entries.write().await.remove(entry_id);
            Ok(())
        }

        async fn list_entries(
            &self,
            owner_id: &str,
            _filter: &ListFilter,
        ) -> Result<Vec<TrackedEntry>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .entries
                .read()
                .await
                .values()
                .filter(|e| e.owner_id == owner_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MapCache {
        store: RwLock<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl Cache for MapCache {
        async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
            Ok(self.store.read().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
            self.store
                .write()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> CacheResult<()> {
            self.store.write().await.remove(key);
            Ok(())
        }

        async fn delete_pattern(&self, pattern: &str) -> CacheResult<()> {
            let mut store = self.store.write().await;
            store.retain(|key, _| !pattern_matches(pattern, key));
            Ok(())
        }
    }

    /// Cache backend where every operation fails.
    struct DownCache;

    #[async_trait]
    impl Cache for DownCache {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }

        async fn delete_pattern(&self, _pattern: &str) -> CacheResult<()> {
            Err(CacheError::ConnectionFailed("refused".to_string()))
        }
    }

    fn owner(uid: &str) -> UserIdentity {
        UserIdentity::new(uid)
    }

    fn new_movie(id: i64, title: &str) -> NewEntry {
        NewEntry::new(
            MediaRef::new(id, MediaKind::Movie, title),
            WatchStatus::PlanToWatch,
        )
    }

    fn cached(store: Arc<MockStore>, cache: Arc<MapCache>) -> CachedEntryStore<MockStore, MapCache> {
        CachedEntryStore::new(store, cache, Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_list_populates_and_serves_from_cache() {
        let store = Arc::new(MockStore::default());
        let cache = Arc::new(MapCache::default());
        let decorated = cached(store.clone(), cache.clone());

        decorated
            .create_entry(&owner("u1"), &new_movie(42, "Heat"))
            .await
            .unwrap();

        let first = decorated
            .list_entries("u1", &ListFilter::default())
            .await
            .unwrap();
        let second = decorated
            .list_entries("u1", &ListFilter::default())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_filters_use_distinct_keys() {
        let store = Arc::new(MockStore::default());
        let cache = Arc::new(MapCache::default());
        let decorated = cached(store.clone(), cache.clone());

        decorated
            .list_entries("u1", &ListFilter::default())
            .await
            .unwrap();
        decorated
            .list_entries("u1", &ListFilter::default().with_search("wire"))
            .await
            .unwrap();

        assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.store.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_update_invalidates_cached_listings() {
        let store = Arc::new(MockStore::default());
        let cache = Arc::new(MapCache::default());
        let decorated = cached(store.clone(), cache.clone());

        let u1 = owner("u1");
        let entry = decorated
            .create_entry(&u1, &new_movie(42, "Heat"))
            .await
            .unwrap();
        decorated
            .list_entries("u1", &ListFilter::default())
            .await
            .unwrap();
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);

        decorated
            .update_entry(&entry.id, &u1, &EntryPatch::status(WatchStatus::Watched))
            .await
            .unwrap();

        // The next listing must miss and observe the new status.
        let listed = decorated
            .list_entries("u1", &ListFilter::default())
            .await
            .unwrap();
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(listed[0].status, WatchStatus::Watched);
    }

    #[tokio::test]
    async fn test_create_and_delete_invalidate_every_filtered_listing() {
        let store = Arc::new(MockStore::default());
        let cache = Arc::new(MapCache::default());
        let decorated = cached(store.clone(), cache.clone());

        let u1 = owner("u1");
        decorated
            .list_entries("u1", &ListFilter::default())
            .await
            .unwrap();
        decorated
            .list_entries("u1", &ListFilter::default().with_search("heat"))
            .await
            .unwrap();
        assert_eq!(cache.store.read().await.len(), 2);

        let entry = decorated
            .create_entry(&u1, &new_movie(42, "Heat"))
            .await
            .unwrap();
        assert!(cache.store.read().await.is_empty());

        decorated
            .list_entries("u1", &ListFilter::default())
            .await
            .unwrap();
        decorated.delete_entry(&entry.id, &u1).await.unwrap();
        assert!(cache.store.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalidation_spares_other_owners() {
        let store = Arc::new(MockStore::default());
        let cache = Arc::new(MapCache::default());
        let decorated = cached(store.clone(), cache.clone());

        decorated
            .list_entries("u2", &ListFilter::default())
            .await
            .unwrap();
        decorated
            .create_entry(&owner("u1"), &new_movie(42, "Heat"))
            .await
            .unwrap();

        let keys: Vec<String> = cache.store.read().await.keys().cloned().collect();
        assert_eq!(keys, vec!["watchlist:userId=u2".to_string()]);
    }

    #[tokio::test]
    async fn test_dead_cache_never_fails_callers() {
        let store = Arc::new(MockStore::default());
        let decorated =
            CachedEntryStore::new(store.clone(), Arc::new(DownCache), Duration::from_secs(300));

        let u1 = owner("u1");
        let entry = decorated
            .create_entry(&u1, &new_movie(42, "Heat"))
            .await
            .unwrap();
        let listed = decorated
            .list_entries("u1", &ListFilter::default())
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, entry.id);
        // Every read went straight to the store.
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
    }
}
