//! File Storage Module
//!
//! Durable backend persisting the whole key/value map as one JSON object.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::KeyValueStore;
use crate::error::StorageResult;

// == File Storage ==
/// JSON-file backed store.
///
/// Every mutation writes the full map to `<path>.tmp` and renames it over
/// `path`. A failed write rolls the in-memory map back, so memory and disk
/// never diverge.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    // == Constructor ==
    /// Opens the store at `path`, loading existing contents if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let items = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!("Opened file storage at {} with {} items", path.display(), items.len());

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, items: &HashMap<String, String>) -> StorageResult<()> {
        let encoded = serde_json::to_vec(items)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &encoded).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted {} bytes to {}", encoded.len(), self.path.display());
        Ok(())
    }

    /// Applies `mutate` and persists; restores the previous map if persisting fails.
    async fn mutate<F>(&self, mutate: F) -> StorageResult<()>
    where
        F: FnOnce(&mut HashMap<String, String>) + Send,
    {
        let mut items = self.items.lock().await;
        let previous = items.clone();
        mutate(&mut items);

        if let Err(e) = self.persist(&items).await {
            *items = previous;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> StorageResult<()> {
        let key = key.to_string();
        self.mutate(move |items| {
            items.insert(key, value);
        })
        .await
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        if !self.items.lock().await.contains_key(key) {
            return Ok(());
        }
        let key = key.to_string();
        self.mutate(move |items| {
            items.remove(&key);
        })
        .await
    }

    async fn get_all_keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.items.lock().await.keys().cloned().collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> StorageResult<()> {
        self.mutate(|items| {
            for key in keys {
                items.remove(key);
            }
        })
        .await
    }
}
