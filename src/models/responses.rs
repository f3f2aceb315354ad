//! Reports produced by the cache management surface.

use serde::Serialize;

use crate::cache::CacheStats;

/// Diagnostics snapshot shown in the cache-management control.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    /// Stored entries, expired ones included
    pub size: usize,
    /// Counters since process start
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Report time in ISO 8601 format
    pub generated_at: String,
}

impl CacheReport {
    /// Builds a report from a stats snapshot.
    pub fn new(stats: CacheStats) -> Self {
        Self {
            size: stats.total_entries,
            hit_rate: stats.hit_rate(),
            stats,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
