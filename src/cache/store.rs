//! Cache Store Module
//!
//! Main cache engine: namespaced, per-entry TTL storage over a persistent
//! key/value backend with lazy eviction.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};
use crate::cache::stats::StatsRecorder;
use crate::config::{Config, DEFAULT_NAMESPACE};
use crate::storage::KeyValueStore;

// == TTL Cache ==
/// Persistent cache where every entry expires `ttl` after its write.
///
/// Every operation absorbs storage faults: failures are logged and turned
/// into a miss, `false` or `0`, so a broken backend degrades the cache to
/// always-miss instead of failing the caller.
pub struct TtlCache {
    /// Shared backend, possibly holding unrelated application state
    storage: Arc<dyn KeyValueStore>,
    /// Time source for write timestamps and expiry checks
    clock: Arc<dyn Clock>,
    /// Prefix isolating this cache's keys inside `storage`
    namespace: String,
    /// Effectiveness counters
    stats: StatsRecorder,
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("namespace", &self.namespace)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl TtlCache {
    // == Constructor ==
    /// Creates a cache over `storage` with the default namespace and wall-clock time.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            namespace: DEFAULT_NAMESPACE.to_string(),
            stats: StatsRecorder::default(),
        }
    }

    /// Creates a cache using the namespace from configuration.
    pub fn from_config(storage: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        Self::new(storage).with_namespace(config.namespace.clone())
    }

    /// Replaces the namespace prefix.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    ///
    /// Returns `false` (after logging) if the key is empty, the value cannot
    /// be serialized, or the backend rejects the write.
    pub async fn set<V>(&self, key: &str, value: &V, ttl: Duration) -> bool
    where
        V: Serialize + ?Sized,
    {
        if key.is_empty() {
            warn!("Refusing to cache value under an empty key");
            self.stats.record_failure();
            return false;
        }

        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl_ms);
        let encoded = match serde_json::to_string(&entry) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Failed to serialize cache entry '{}': {}", key, e);
                self.stats.record_failure();
                return false;
            }
        };

        match self.storage.set_item(&self.storage_key(key), encoded).await {
            Ok(()) => {
                debug!("Cache SET '{}' (ttl {}ms)", key, ttl_ms);
                self.stats.record_write();
                true
            }
            Err(e) => {
                error!("Failed to write cache entry '{}': {}", key, e);
                self.stats.record_failure();
                false
            }
        }
    }

    // == Get ==
    /// Returns the fresh value stored under `key`.
    ///
    /// Stale entries are removed as a side effect and reported as a miss.
    /// Reads never extend an entry's lifetime.
    pub async fn get<V>(&self, key: &str) -> Option<V>
    where
        V: DeserializeOwned,
    {
        if key.is_empty() {
            self.stats.record_miss();
            return None;
        }

        let storage_key = self.storage_key(key);
        let raw = match self.storage.get_item(&storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache MISS '{}'", key);
                self.stats.record_miss();
                return None;
            }
            Err(e) => {
                error!("Failed to read cache entry '{}': {}", key, e);
                self.stats.record_failure();
                self.stats.record_miss();
                return None;
            }
        };

        let entry: CacheEntry<Value> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Dropping corrupt cache entry '{}': {}", key, e);
                self.stats.record_failure();
                self.stats.record_miss();
                self.discard(&storage_key).await;
                return None;
            }
        };

        if entry.is_expired_at(self.clock.now_ms()) {
            debug!("Cache EXPIRED '{}'", key);
            self.stats.record_expiration();
            self.stats.record_miss();
            self.discard(&storage_key).await;
            return None;
        }

        match serde_json::from_value(entry.data) {
            Ok(value) => {
                debug!("Cache HIT '{}'", key);
                self.stats.record_hit();
                Some(value)
            }
            Err(e) => {
                warn!("Cached value '{}' has an unexpected shape: {}", key, e);
                self.stats.record_failure();
                self.stats.record_miss();
                None
            }
        }
    }

    async fn discard(&self, storage_key: &str) {
        if let Err(e) = self.storage.remove_item(storage_key).await {
            error!("Failed to evict cache entry '{}': {}", storage_key, e);
            self.stats.record_failure();
        }
    }

    // == Has ==
    /// True if a fresh entry exists under `key`.
    pub async fn has(&self, key: &str) -> bool {
        self.get::<Value>(key).await.is_some()
    }

    // == Remove ==
    /// Removes `key`. Succeeds whether or not it was present.
    pub async fn remove(&self, key: &str) -> bool {
        match self.storage.remove_item(&self.storage_key(key)).await {
            Ok(()) => {
                debug!("Cache REMOVE '{}'", key);
                true
            }
            Err(e) => {
                error!("Failed to remove cache entry '{}': {}", key, e);
                self.stats.record_failure();
                false
            }
        }
    }

    /// Lists every stored namespaced key in storage form.
    async fn storage_keys(&self) -> Option<Vec<String>> {
        match self.storage.get_all_keys().await {
            Ok(keys) => Some(
                keys.into_iter()
                    .filter(|k| k.starts_with(&self.namespace))
                    .collect(),
            ),
            Err(e) => {
                error!("Failed to enumerate cache keys: {}", e);
                self.stats.record_failure();
                None
            }
        }
    }

    // == Clear ==
    /// Removes every entry under this cache's namespace, leaving other keys alone.
    pub async fn clear(&self) -> bool {
        let Some(keys) = self.storage_keys().await else {
            return false;
        };
        if keys.is_empty() {
            return true;
        }

        match self.storage.multi_remove(&keys).await {
            Ok(()) => {
                info!("Cache cleared: removed {} entries", keys.len());
                true
            }
            Err(e) => {
                error!("Failed to clear cache: {}", e);
                self.stats.record_failure();
                false
            }
        }
    }

    // == Size ==
    /// Number of stored entries under the namespace.
    ///
    /// Expired entries not yet discovered by a read are still counted.
    pub async fn size(&self) -> usize {
        self.storage_keys().await.map_or(0, |keys| keys.len())
    }

    // == Keys ==
    /// Logical keys (namespace stripped) currently stored, expired ones included.
    pub async fn keys(&self) -> Vec<String> {
        self.storage_keys()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|k| k[self.namespace.len()..].to_string())
            .collect()
    }

    // == Remove Matching ==
    /// Removes every entry whose logical key satisfies `predicate` in one
    /// bulk storage call.
    ///
    /// Returns the number removed, or None if enumeration or removal failed
    /// (the failure is logged).
    pub async fn remove_matching<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        let targets: Vec<String> = self
            .storage_keys()
            .await?
            .into_iter()
            .filter(|k| predicate(&k[self.namespace.len()..]))
            .collect();
        if targets.is_empty() {
            return Some(0);
        }

        match self.storage.multi_remove(&targets).await {
            Ok(()) => {
                info!("Cache invalidation removed {} entries", targets.len());
                Some(targets.len())
            }
            Err(e) => {
                error!("Failed to remove matching cache entries: {}", e);
                self.stats.record_failure();
                None
            }
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.size().await)
    }
}
