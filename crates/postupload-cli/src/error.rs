//! Error handling for the post_upload command

use postupload::ReleaseError;
use postupload_storage::{PublishError, StorageError};
use thiserror::Error;

/// Result type for command operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Every problem found with the flags
    #[error("{}", .0.join("\n"))]
    Usage(Vec<String>),

    #[error("Error parsing options: {0}")]
    Options(#[from] ReleaseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
