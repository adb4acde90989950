//! Memo of files already transferred during a run

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Maps each source file to the first key it was stored under
///
/// Later requests for the same source can then be served by a copy inside
/// the store instead of another upload. The cache is owned by whoever drives
/// the run and handed to every copy; it never outlives that run.
#[derive(Debug, Default)]
pub struct TransferCache {
    entries: Mutex<HashMap<PathBuf, String>>,
}

impl TransferCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key `source` was first stored under, if any
    pub fn lookup(&self, source: &Path) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(source).cloned())
    }

    /// Remember `key` for `source` unless another key was recorded first
    pub fn record(&self, source: &Path, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries
                .entry(source.to_path_buf())
                .or_insert_with(|| key.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every recorded transfer
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
