//! Error types for storage, transfers and publishing

use std::path::PathBuf;
use thiserror::Error;

use postupload::ReleaseError;

/// Errors raised by an object store backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Invalid key format: {0}")]
    InvalidKey(String),

    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failed transfer of one file to one destination
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storing {key}: {source}")]
    Store {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("copying {from} to {to}: {source}")]
    Copy {
        from: String,
        to: String,
        #[source]
        source: StorageError,
    },
}

/// Errors that stop a publishing run before or while it processes files
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error("{} does not exist", .0.display())]
    MissingSource(PathBuf),
}

/// Result type for publishing operations
pub type Result<T> = std::result::Result<T, PublishError>;
