//! Typed Cache View Module
//!
//! Statically typed handle over the shared, payload-agnostic cache.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::TtlCache;

// == Cache View ==
/// A call site's window onto `TtlCache`: one payload type, one TTL.
pub struct CacheView<V> {
    cache: Arc<TtlCache>,
    ttl: Duration,
    _payload: PhantomData<fn() -> V>,
}

impl<V> Clone for CacheView<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
            _payload: PhantomData,
        }
    }
}

impl<V> CacheView<V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn new(cache: Arc<TtlCache>, ttl: Duration) -> Self {
        Self {
            cache,
            ttl,
            _payload: PhantomData,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn set(&self, key: &str, value: &V) -> bool {
        self.cache.set(key, value, self.ttl).await
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.cache.remove(key).await
    }
}
