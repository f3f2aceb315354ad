//! Cache Entry Module
//!
//! Defines the persisted envelope for individual cache entries.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached payload with its write time and lifetime.
///
/// Serialized as `{"data": ..., "timestamp": <epoch-ms>, "ttl": <ms>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The stored payload
    pub data: T,
    /// Write timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Lifetime in milliseconds
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry written at `now_ms` that lives for `ttl_ms`.
    pub fn new(data: T, now_ms: i64, ttl_ms: u64) -> Self {
        Self {
            data,
            timestamp: now_ms,
            ttl: ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is stale at `now_ms`.
    ///
    /// Boundary condition: stale only once strictly more than `ttl` has
    /// elapsed, so an entry read exactly at `timestamp + ttl` is still fresh.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        let elapsed = now_ms.saturating_sub(self.timestamp);
        elapsed > 0 && elapsed as u64 > self.ttl
    }

    /// Unix milliseconds after which the entry is stale.
    pub fn expires_at(&self) -> i64 {
        self.timestamp
            .saturating_add(i64::try_from(self.ttl).unwrap_or(i64::MAX))
    }

    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn remaining_ms(&self, now_ms: i64) -> u64 {
        let left = self.expires_at().saturating_sub(now_ms);
        if left > 0 {
            left as u64
        } else {
            0
        }
    }

    /// Write time as a UTC datetime, for diagnostics.
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
