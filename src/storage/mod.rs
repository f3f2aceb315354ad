//! Storage Module
//!
//! Durable string-keyed backends the cache persists its entries into.

mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::StorageResult;

pub use file::FileStorage;
pub use memory::MemoryStorage;

// == Key/Value Store ==
/// Async string-keyed store shared by the cache and other application state.
///
/// Implementations must treat removal of an absent key as success.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: String) -> StorageResult<()>;

    /// Deletes `key`.
    async fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Lists every key in the store, namespaced or not.
    async fn get_all_keys(&self) -> StorageResult<Vec<String>>;

    /// Deletes all of `keys` in one operation.
    async fn multi_remove(&self, keys: &[String]) -> StorageResult<()>;
}

/// Opens the configured backend: a `FileStorage` when a path is set,
/// otherwise a fresh `MemoryStorage`.
pub async fn open_from_config(config: &Config) -> StorageResult<Arc<dyn KeyValueStore>> {
    match &config.storage_path {
        Some(path) => Ok(Arc::new(FileStorage::open(path.clone()).await?)),
        None => Ok(Arc::new(MemoryStorage::new())),
    }
}
