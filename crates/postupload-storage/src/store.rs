//! Object store abstraction for the delivery tree
//!
//! This module provides the core storage trait and an in-memory
//! implementation for testing and dry runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::metadata::ObjectMetadata;

/// Abstraction for object storage backends holding the delivery tree
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store data at the given key
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError>;

    /// Retrieve data by key
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Store the contents of a local file at the given key
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
        self.put(key, data, metadata).await
    }

    /// Copy an object already in the store to another key
    ///
    /// The copy is stored with `metadata`, not the metadata of `from`.
    async fn copy(
        &self,
        from: &str,
        to: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        let data = self.get(from).await?;
        self.put(to, data, metadata).await
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    metadata: ObjectMetadata,
}

/// In-memory storage implementation for testing
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.data
            .lock()
            .map(|data| data.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Metadata an object was stored with
    pub fn metadata(&self, key: &str) -> Option<ObjectMetadata> {
        self.data
            .lock()
            .ok()
            .and_then(|data| data.get(key).map(|object| object.metadata.clone()))
    }

    /// Get number of stored objects
    pub fn len(&self) -> usize {
        self.data.lock().map(|data| data.len()).unwrap_or(0)
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>>, StorageError> {
        self.data
            .lock()
            .map_err(|_| StorageError::Backend("Lock poisoned".into()))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        let object = StoredObject {
            data,
            metadata: metadata.clone(),
        };
        self.lock()?.insert(key.to_string(), object);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.lock()?
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}
