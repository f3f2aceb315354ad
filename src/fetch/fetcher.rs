//! Caching Fetcher Module
//!
//! Interposes the TTL cache in front of idempotent network reads.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{CacheView, TtlCache};
use crate::error::{FetchError, Result};
use crate::fetch::{derive_key, is_operation_key, HttpClient};

// == Caching Fetcher ==
/// Read-through cache over an `HttpClient`.
///
/// Concurrent identical misses each reach the network; the last write wins.
#[derive(Clone)]
pub struct CachingFetcher {
    client: Arc<dyn HttpClient>,
    cache: Arc<TtlCache>,
}

impl CachingFetcher {
    // == Constructor ==
    pub fn new(client: Arc<dyn HttpClient>, cache: Arc<TtlCache>) -> Self {
        Self { client, cache }
    }

    /// The injected cache handle.
    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    /// The injected network client.
    pub fn client(&self) -> &Arc<dyn HttpClient> {
        &self.client
    }

    /// Typed view over the same cache for a caller-managed payload.
    pub fn view<V>(&self, ttl: Duration) -> CacheView<V>
    where
        V: Serialize + DeserializeOwned,
    {
        CacheView::new(Arc::clone(&self.cache), ttl)
    }

    // == Fetch Cached ==
    /// Returns the cached result for `operation` + `params`, or fetches `path`
    /// with `params` as its query and caches the decoded result for `ttl`.
    ///
    /// Network and decode failures propagate unchanged and write nothing.
    pub async fn fetch_cached<T, P>(
        &self,
        operation: &str,
        path: &str,
        params: &P,
        ttl: Duration,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.fetch_cached_with_query(operation, params, path, params, ttl)
            .await
    }

    /// Like `fetch_cached`, but keys the entry on `key_params` while sending
    /// `query` on the wire.
    ///
    /// Used when part of the identity lives in the path, e.g. a product id.
    pub async fn fetch_cached_with_query<T, K, Q>(
        &self,
        operation: &str,
        key_params: &K,
        path: &str,
        query: &Q,
        ttl: Duration,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        K: Serialize + ?Sized,
        Q: Serialize + ?Sized,
    {
        let key = derive_key(operation, key_params)?;

        if let Some(cached) = self.cache.get::<T>(&key).await {
            return Ok(cached);
        }

        let query =
            serde_json::to_value(query).map_err(|e| FetchError::InvalidParams(e.to_string()))?;
        let body = self.client.fetch(path, &query).await?;
        let result: T = serde_json::from_value(body).map_err(FetchError::Decode)?;

        if !self.cache.set(&key, &result, ttl).await {
            debug!("Serving '{}' uncached, cache write failed", key);
        }
        Ok(result)
    }

    // == Invalidate ==
    /// Drops the cached result for one `operation` + `params`.
    pub async fn invalidate<P>(&self, operation: &str, params: &P) -> Result<bool>
    where
        P: Serialize + ?Sized,
    {
        let key = derive_key(operation, params)?;
        info!("Invalidating cache key '{}'", key);
        Ok(self.cache.remove(&key).await)
    }

    /// Drops every cached result for the given operation tags.
    ///
    /// Returns the number removed, or None if the cache could not be fully purged.
    pub async fn invalidate_operations(&self, operations: &[&str]) -> Option<usize> {
        self.cache
            .remove_matching(|key| {
                operations
                    .iter()
                    .any(|op| is_operation_key(key, op))
            })
            .await
    }
}
