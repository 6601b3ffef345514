//! In-memory cache implementation with LRU eviction.
//!
//! Thread-safe cache with TTL support using tokio synchronization
//! primitives. Expiry is absolute (fixed at write time, no sliding
//! expiration) and lazy: expired slots are detected on access and reported
//! as misses. Pattern deletion scans the whole map with the shared glob
//! matcher.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;
use tokio::time::Instant;

use watchsync_core::cache::{pattern_matches, Cache, Result};

/// A single cache slot with optional absolute expiry.
#[derive(Debug, Clone)]
struct CacheSlot {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheSlot {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-memory cache with LRU eviction.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheSlot>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;
        let hit = match store.get(key) {
            Some(slot) if slot.is_expired() => None,
            Some(slot) => Some(slot.value.clone()),
            None => return Ok(None),
        };
        if hit.is_none() {
            // Lazy cleanup: drop the expired slot on access.
            store.pop(key);
        }
        Ok(hit)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), CacheSlot::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let matching: Vec<String> = store
            .iter()
            .filter(|(key, _)| pattern_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in matching {
            store.pop(&key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchsync_core::cache::read_through;

    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("test:key", b"value", None).await.unwrap();

        assert_eq!(
            cache.get("test:key").await.unwrap(),
            Some(b"value".to_vec())
        );
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        assert_eq!(cache.get("nonexistent:key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("test:delete", b"gone soon", None).await.unwrap();
        cache.delete("test:delete").await.unwrap();

        assert_eq!(cache.get("test:delete").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("key", b"first", None).await.unwrap();
        cache.set("key", b"second", None).await.unwrap();

        assert_eq!(cache.get("key").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiration_is_absolute() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache
            .set("key", b"short-lived", Some(Duration::from_secs(10)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(cache.get("key").await.unwrap().is_some());

        // The read above must not have refreshed the TTL.
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(cache.get("key").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ttl_never_expires() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("key", b"persistent", None).await.unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;

        assert!(cache.get("key").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_pattern() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache
            .set("watchlist:userId=u1", b"1", None)
            .await
            .unwrap();
        cache
            .set("watchlist:search=wire&userId=u1", b"2", None)
            .await
            .unwrap();
        cache
            .set("watchlist:userId=u2", b"3", None)
            .await
            .unwrap();

        cache.delete_pattern("watchlist:*userId=u1*").await.unwrap();

        assert!(cache.get("watchlist:userId=u1").await.unwrap().is_none());
        assert!(cache
            .get("watchlist:search=wire&userId=u1")
            .await
            .unwrap()
            .is_none());
        assert!(cache.get("watchlist:userId=u2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_pattern_no_matches() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("user:u1", b"value", None).await.unwrap();
        cache.delete_pattern("watchlist:*userId=zzz*").await.unwrap();

        assert!(cache.get("user:u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(3);

        cache.set("key1", b"1", None).await.unwrap();
        cache.set("key2", b"2", None).await.unwrap();
        cache.set("key3", b"3", None).await.unwrap();

        // Touch key1 so key2 becomes the least recently used.
        cache.get("key1").await.unwrap();
        cache.set("key4", b"4", None).await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_some());
        assert!(cache.get("key2").await.unwrap().is_none());
        assert!(cache.get("key3").await.unwrap().is_some());
        assert!(cache.get("key4").await.unwrap().is_some());
    }

    #[tokio::test]
    #[should_panic(expected = "max_entries must be > 0")]
    async fn test_zero_max_entries_panics() {
        let _ = MemoryCache::new(0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_through_respects_ttl() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let computes = AtomicUsize::new(0);
        let ttl = Some(Duration::from_secs(10));
        let compute = || {
            let n = computes.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<u32, watchsync_core::storage::RepositoryError>(n as u32) }
        };

        let first = read_through(&cache, "k", ttl, compute).await.unwrap();
        assert_eq!(first, 0);

        // 5 seconds in: still served from cache.
        tokio::time::advance(Duration::from_secs(5)).await;
        let second = read_through(&cache, "k", ttl, compute).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(computes.load(Ordering::SeqCst), 1);

        // 11 seconds in: expired, recomputed.
        tokio::time::advance(Duration::from_secs(6)).await;
        let third = read_through(&cache, "k", ttl, compute).await.unwrap();
        assert_eq!(third, 1);
        assert_eq!(computes.load(Ordering::SeqCst), 2);
    }
}
