//! Integration tests for publishing release files

use async_trait::async_trait;
use postupload::{BuildId, Channel, Field, PathContext, ReleaseError};
use postupload_storage::*;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::{TempDir, tempdir};

/// Memory store that records every operation and can be told to fail
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    ops: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingStore {
    fn failing_on(key: &str) -> Self {
        Self {
            fail_on: Some(key.to_string()),
            ..Default::default()
        }
    }

    fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        self.ops.lock().unwrap().push(format!("put {key}"));
        if self.fail_on.as_deref() == Some(key) {
            return Err(StorageError::Backend("refusing".into()));
        }
        self.inner.put(key, data, metadata).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.inner.get(key).await
    }

    async fn copy(
        &self,
        from: &str,
        to: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        self.ops.lock().unwrap().push(format!("copy {from} {to}"));
        self.inner.copy(from, to, metadata).await
    }
}

/// An upload directory with the given files written into it
fn upload_dir(files: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempdir().unwrap();
    let paths = files
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, name.as_bytes()).unwrap();
            path
        })
        .collect();
    (dir, paths)
}

fn context(dir: &Path) -> PathContext {
    let mut ctx = PathContext::new(dir, "firefox");
    ctx.branch = "mozilla-central".to_string();
    ctx.tinderbox_builds_dir = "mozilla-central-win32".to_string();
    ctx
}

#[tokio::test]
async fn test_latest_uploads_once_and_copies_duplicate() {
    let (dir, files) = upload_dir(&["firefox-55.0a1.en-US.win32.zip"]);
    let ctx = context(dir.path());
    let copier = StoreCopier::new(RecordingStore::default());
    let cache = TransferCache::new();

    let report = Publisher::new(&ctx, &cache, &copier)
        .publish(&[Channel::Latest], &files)
        .await
        .unwrap();

    let primary = "pub/firefox/nightly/latest-mozilla-central/firefox-55.0a1.en-US.win32.zip";
    let duplicate =
        "pub/firefox/nightly/latest-mozilla-central-l10n/firefox-55.0a1.en-US.win32.zip";

    assert!(report.is_success());
    assert_eq!(report.keys(), vec![primary, duplicate]);
    assert!(report.placements.iter().all(|p| p.copied));
    assert_eq!(
        copier.store().ops(),
        vec![format!("put {primary}"), format!("copy {primary} {duplicate}")]
    );
    assert_eq!(cache.lookup(&files[0]).as_deref(), Some(primary));
    assert_eq!(
        copier.store().get(duplicate).await.unwrap(),
        b"firefox-55.0a1.en-US.win32.zip"
    );

    // The copy carries the headers of its own key
    let metadata = copier.store().inner.metadata(duplicate).unwrap();
    assert_eq!(metadata.content_type, "application/zip");
    assert_eq!(metadata.cache_control.as_deref(), Some("max-age=3600"));
}

#[tokio::test]
async fn test_cache_spans_channels() {
    let (dir, files) = upload_dir(&["subdir/firefox.tar.bz2"]);
    let mut ctx = context(dir.path());
    ctx.build_id = Some(BuildId::parse("20150101223305").unwrap());
    let copier = StoreCopier::new(RecordingStore::default());
    let cache = TransferCache::new();

    let report = Publisher::new(&ctx, &cache, &copier)
        .publish(&[Channel::Latest, Channel::Dated], &files)
        .await
        .unwrap();

    assert_eq!(
        report.keys(),
        vec![
            "pub/firefox/nightly/latest-mozilla-central/firefox.tar.bz2",
            "pub/firefox/nightly/2015/01/2015-01-01-22-33-05-mozilla-central/firefox.tar.bz2",
        ]
    );
    let ops = copier.store().ops();
    assert_eq!(ops.iter().filter(|op| op.starts_with("put ")).count(), 1);
    assert_eq!(ops.iter().filter(|op| op.starts_with("copy ")).count(), 1);
}

#[tokio::test]
async fn test_dry_run_transfers_nothing() {
    let (dir, files) = upload_dir(&["a.zip", "crashreporter-symbols.zip", "b/c.txt"]);
    let ctx = context(dir.path());
    let cache = TransferCache::new();

    let report = Publisher::dry_run(&ctx, &cache)
        .with_concurrency(2)
        .publish(&[Channel::Latest], &files)
        .await
        .unwrap();

    // Input order is kept even though files are handled concurrently
    assert_eq!(
        report.keys(),
        vec![
            "pub/firefox/nightly/latest-mozilla-central/a.zip",
            "pub/firefox/nightly/latest-mozilla-central/c.txt",
        ]
    );
    assert!(report.placements.iter().all(|p| !p.copied));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_missing_field_aborts_before_transfer() {
    let (dir, files) = upload_dir(&["a.zip"]);
    let ctx = context(dir.path());
    let copier = StoreCopier::new(RecordingStore::default());
    let cache = TransferCache::new();

    let err = Publisher::new(&ctx, &cache, &copier)
        .publish(&[Channel::Latest, Channel::TryBuilds], &files)
        .await
        .unwrap_err();

    match err {
        PublishError::Release(ReleaseError::MissingField { channel, field }) => {
            assert_eq!(channel, Channel::TryBuilds);
            assert_eq!(field, Field::Who);
        }
        other => panic!("Expected MissingField, got {other:?}"),
    }
    assert!(copier.store().ops().is_empty());
}

#[tokio::test]
async fn test_missing_file_aborts_before_transfer() {
    let (dir, mut files) = upload_dir(&["a.zip"]);
    files.push(dir.path().join("not-built.zip"));
    let ctx = context(dir.path());
    let copier = StoreCopier::new(RecordingStore::default());
    let cache = TransferCache::new();

    let err = Publisher::new(&ctx, &cache, &copier)
        .publish(&[Channel::Latest], &files)
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::MissingSource(path) if path.ends_with("not-built.zip")));
    assert!(copier.store().ops().is_empty());
}

#[tokio::test]
async fn test_out_of_tree_file_does_not_stop_the_batch() {
    let (dir, mut files) = upload_dir(&["a.zip"]);
    let (_elsewhere, stray) = upload_dir(&["stray.zip"]);
    files.insert(0, stray[0].clone());

    let ctx = context(dir.path());
    let copier = StoreCopier::new(RecordingStore::default());
    let cache = TransferCache::new();

    let report = Publisher::new(&ctx, &cache, &copier)
        .publish(&[Channel::Latest], &files)
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, stray[0]);
    assert_eq!(report.failures[0].key, None);
    assert_eq!(
        report.keys(),
        vec!["pub/firefox/nightly/latest-mozilla-central/a.zip"]
    );
}

#[tokio::test]
async fn test_failed_primary_skips_duplicate() {
    let (dir, files) = upload_dir(&["firefox-55.0a1.en-US.mac.dmg", "other.zip"]);
    let ctx = context(dir.path());
    let primary = "pub/firefox/nightly/latest-mozilla-central/firefox-55.0a1.en-US.mac.dmg";
    let copier = StoreCopier::new(RecordingStore::failing_on(primary));
    let cache = TransferCache::new();

    let report = Publisher::new(&ctx, &cache, &copier)
        .with_concurrency(1)
        .publish(&[Channel::Latest], &files)
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].key.as_deref(), Some(primary));
    assert_eq!(
        report.keys(),
        vec!["pub/firefox/nightly/latest-mozilla-central/other.zip"]
    );
    assert_eq!(
        copier.store().ops(),
        vec![
            format!("put {primary}"),
            "put pub/firefox/nightly/latest-mozilla-central/other.zip".to_string(),
        ]
    );
    assert!(cache.lookup(&files[0]).is_none());
}
