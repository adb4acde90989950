//! Error types for destination resolution

use std::path::PathBuf;
use thiserror::Error;

use crate::channel::{Channel, Field};

/// Errors raised while resolving where a release file belongs
///
/// `InvalidFormat` and `MissingField` describe a misconfigured invocation and
/// should abort the run. `OutOfTree` concerns a single file only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("Invalid build id {raw:?}: {reason}")]
    InvalidFormat { raw: String, reason: String },

    #[error("--{field} must be set to release to {channel}")]
    MissingField { channel: Channel, field: Field },

    #[error("{} is not under the source directory {}", .path.display(), .source_dir.display())]
    OutOfTree { path: PathBuf, source_dir: PathBuf },
}

impl ReleaseError {
    /// Whether the error invalidates the whole run rather than a single file
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ReleaseError::OutOfTree { .. })
    }
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ReleaseError>;
