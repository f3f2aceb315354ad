//! Cache Module
//!
//! Persistent, namespaced key/value cache with per-entry TTL and lazy eviction.

mod clock;
mod entry;
mod stats;
mod store;
mod typed;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::TtlCache;
pub use typed::CacheView;
