//! Transfers of local files into the store

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::cache::TransferCache;
use crate::error::{StorageError, TransferError};
use crate::metadata::ObjectMetadata;
use crate::store::ObjectStore;

/// Places one local file at one destination key
#[async_trait]
pub trait Copier: Send + Sync {
    async fn copy(
        &self,
        source: &Path,
        key: &str,
        cache: &TransferCache,
    ) -> Result<(), TransferError>;
}

/// Copier backed by an [`ObjectStore`]
///
/// The first destination of a source is uploaded from disk. Further
/// destinations of the same source are copied from that first key inside the
/// store, and a repeat of the first destination is a no-op. Every object gets
/// the [`ObjectMetadata`] of its own key.
pub struct StoreCopier<S> {
    store: S,
}

impl<S: ObjectStore> StoreCopier<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: ObjectStore> Copier for StoreCopier<S> {
    async fn copy(
        &self,
        source: &Path,
        key: &str,
        cache: &TransferCache,
    ) -> Result<(), TransferError> {
        let metadata = ObjectMetadata::for_key(key);

        if let Some(first) = cache.lookup(source) {
            if first == key {
                debug!(source = %source.display(), key, "already uploaded");
                return Ok(());
            }

            info!(from = %first, to = key, "copying");
            let copied = self.store.copy(&first, key, &metadata).await;
            return copied.map_err(|e| TransferError::Copy {
                from: first,
                to: key.to_string(),
                source: e,
            });
        }

        info!(source = %source.display(), key, content_type = %metadata.content_type, "uploading");
        self.store
            .put_file(key, source, &metadata)
            .await
            .map_err(|e| match e {
                StorageError::Read { path, source } => TransferError::Read { path, source },
                other => TransferError::Store {
                    key: key.to_string(),
                    source: other,
                },
            })?;

        cache.record(source, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_upload_then_copy() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("firefox.zip");
        std::fs::write(&source, b"zip").unwrap();

        let copier = StoreCopier::new(MemoryStore::new());
        let cache = TransferCache::new();

        copier.copy(&source, "pub/a/firefox.zip", &cache).await.unwrap();
        assert_eq!(cache.lookup(&source).as_deref(), Some("pub/a/firefox.zip"));

        // The source is no longer needed for further destinations
        std::fs::remove_file(&source).unwrap();
        copier.copy(&source, "pub/b/firefox.zip", &cache).await.unwrap();
        copier.copy(&source, "pub/a/firefox.zip", &cache).await.unwrap();

        assert_eq!(
            copier.store().keys(),
            vec!["pub/a/firefox.zip", "pub/b/firefox.zip"]
        );
        assert_eq!(copier.store().get("pub/b/firefox.zip").await.unwrap(), b"zip");
    }

    #[tokio::test]
    async fn test_each_key_gets_its_own_metadata() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("firefox.dmg");
        std::fs::write(&source, b"dmg").unwrap();

        let copier = StoreCopier::new(MemoryStore::new());
        let cache = TransferCache::new();
        let latest = "pub/firefox/nightly/latest-mozilla-central/firefox.dmg";
        let dated = "pub/firefox/nightly/2015/05/2015-05-13-mozilla-central/firefox.dmg";

        copier.copy(&source, latest, &cache).await.unwrap();
        copier.copy(&source, dated, &cache).await.unwrap();

        let latest_metadata = copier.store().metadata(latest).unwrap();
        assert_eq!(latest_metadata.content_type, "application/x-apple-diskimage");
        assert_eq!(latest_metadata.cache_control.as_deref(), Some("max-age=3600"));

        let dated_metadata = copier.store().metadata(dated).unwrap();
        assert_eq!(dated_metadata.content_type, "application/x-apple-diskimage");
        assert_eq!(dated_metadata.cache_control, None);
    }

    #[tokio::test]
    async fn test_missing_source() {
        let dir = tempdir().unwrap();
        let copier = StoreCopier::new(MemoryStore::new());
        let cache = TransferCache::new();

        let err = copier
            .copy(&dir.path().join("missing"), "pub/missing", &cache)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Read { .. }));
        assert!(cache.is_empty());
    }
}
