//! Storefront Cache - persistent TTL response cache for a storefront API client
//!
//! Provides a namespaced key/value cache with per-entry expiry and a
//! read-through fetcher that consults it before any network read.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod storage;

pub use cache::{CacheStats, CacheView, TtlCache};
pub use catalog::{CachePolicy, ProductCatalog};
pub use config::Config;
pub use error::{FetchError, StorageError};
pub use fetch::{CachingFetcher, HttpClient, ReqwestClient};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
