//! Read-through helper implementing the cache-aside read path.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Cache;

/// Looks up `key`; on a hit returns the cached value unmodified (the TTL is
/// fixed at write time, a hit does not refresh it). On a miss - or on ANY
/// cache-backend failure - falls through to `compute`, then writes the
/// result back with the given TTL.
///
/// Cache failures on either side are logged and swallowed: a broken cache
/// must never fail the caller's read. Only `compute` errors propagate.
pub async fn read_through<C, T, E, F, Fut>(
    cache: &C,
    key: &str,
    ttl: Option<Duration>,
    compute: F,
) -> Result<T, E>
where
    C: Cache + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match cache.get(key).await {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => {
                tracing::trace!(key, "cache hit");
                return Ok(value);
            }
            // Treat undecodable values as a miss.
            Err(err) => tracing::warn!(key, error = %err, "cache value failed to deserialize"),
        },
        Ok(None) => tracing::trace!(key, "cache miss"),
        Err(err) => tracing::warn!(key, error = %err, "cache read failed, computing directly"),
    }

    let value = compute().await?;

    match serde_json::to_vec(&value) {
        Ok(bytes) => {
            if let Err(err) = cache.set(key, &bytes, ttl).await {
                tracing::warn!(key, error = %err, "cache write-back failed");
            }
        }
        Err(err) => tracing::warn!(key, error = %err, "cache value failed to serialize"),
    }

    Ok(value)
}
