//! Run configuration management

use postupload_storage::S3Settings;

use crate::cli::Args;
use crate::error::{CliError, Result};

/// Log filter used when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "post_upload=info,postupload=info,postupload_storage=info";

/// Configuration of one run, from flags and environment
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Store connection; absent in a dry run
    pub storage: Option<S3Settings>,

    /// Files of a channel copied at the same time
    pub concurrency: usize,
}

impl UploadConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        if args.concurrency == 0 {
            return Err(CliError::Config(
                "Invalid POST_UPLOAD_CONCURRENCY value: must be at least 1".to_string(),
            ));
        }

        let storage = if args.dry_run {
            None
        } else {
            Some(S3Settings::from_env(args.bucket.clone())?)
        };

        Ok(Self {
            storage,
            concurrency: args.concurrency,
        })
    }
}

/// Log filter from RUST_LOG, falling back to [`DEFAULT_LOG_FILTER`]
pub fn log_filter() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_dry_run_needs_no_storage() {
        let args = Args::try_parse_from([
            "post_upload", "-p", "firefox", "--dry-run", "--concurrency", "2", "/up", "/up/a",
        ])
        .unwrap();

        let config = UploadConfig::from_args(&args).unwrap();
        assert!(config.storage.is_none());
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let args = Args::try_parse_from([
            "post_upload", "-p", "firefox", "--dry-run", "--concurrency", "0", "/up", "/up/a",
        ])
        .unwrap();

        assert!(matches!(
            UploadConfig::from_args(&args),
            Err(CliError::Config(_))
        ));
    }
}
