//! Drives release channels over a batch of uploaded files

use futures_util::stream::{self, StreamExt};
use postupload::{Channel, PathContext};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::cache::TransferCache;
use crate::copier::Copier;
use crate::error::{PublishError, Result};

/// Files of one channel handled at the same time unless configured otherwise
pub const DEFAULT_CONCURRENCY: usize = 4;

/// A file placed, or in a dry run planned, at a destination key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub channel: Channel,
    pub source: PathBuf,
    pub key: String,
    /// False in a dry run
    pub copied: bool,
}

/// A file that could not be placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub channel: Channel,
    pub source: PathBuf,
    /// Destination being written when the failure happened, if any
    pub key: Option<String>,
    pub message: String,
}

/// Outcome of a publishing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub placements: Vec<Placement>,
    pub failures: Vec<Failure>,
}

impl PublishReport {
    /// True when every file was placed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Destination keys in placement order
    pub fn keys(&self) -> Vec<&str> {
        self.placements.iter().map(|p| p.key.as_str()).collect()
    }

    fn merge(&mut self, other: PublishReport) {
        self.placements.extend(other.placements);
        self.failures.extend(other.failures);
    }
}

/// Publishes files to release channels
///
/// Without a copier the publisher performs a dry run: destinations are
/// resolved and reported but nothing is transferred.
pub struct Publisher<'a> {
    context: &'a PathContext,
    cache: &'a TransferCache,
    copier: Option<&'a dyn Copier>,
    concurrency: usize,
}

impl<'a> Publisher<'a> {
    pub fn new(context: &'a PathContext, cache: &'a TransferCache, copier: &'a dyn Copier) -> Self {
        Self {
            context,
            cache,
            copier: Some(copier),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// A publisher that resolves destinations without transferring anything
    pub fn dry_run(context: &'a PathContext, cache: &'a TransferCache) -> Self {
        Self {
            context,
            cache,
            copier: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Number of files of a channel processed concurrently, at least one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.copier.is_none()
    }

    /// Validate a run before anything is transferred
    ///
    /// Every channel must have its required metadata and every file must
    /// exist on disk.
    pub async fn check(&self, channels: &[Channel], files: &[PathBuf]) -> Result<()> {
        for channel in channels {
            self.context.check_required(*channel)?;
        }
        for file in files {
            if tokio::fs::metadata(file).await.is_err() {
                return Err(PublishError::MissingSource(file.clone()));
            }
        }
        Ok(())
    }

    /// Publish `files` to each of `channels`, in order
    ///
    /// Files that fall outside the source tree or fail to transfer are logged
    /// and reported; the remaining files are still published.
    pub async fn publish(&self, channels: &[Channel], files: &[PathBuf]) -> Result<PublishReport> {
        self.check(channels, files).await?;

        let mut report = PublishReport::default();
        for channel in channels {
            info!(%channel, files = files.len(), dry_run = self.is_dry_run(), "publishing");

            let outcomes: Vec<Result<PublishReport>> = stream::iter(files)
                .map(|file| self.publish_file(*channel, file))
                .buffered(self.concurrency)
                .collect()
                .await;

            for outcome in outcomes {
                report.merge(outcome?);
            }
        }

        info!(
            placed = report.placements.len(),
            failed = report.failures.len(),
            "publishing finished"
        );
        Ok(report)
    }

    /// Place one file in one channel, destinations strictly in order
    async fn publish_file(&self, channel: Channel, file: &Path) -> Result<PublishReport> {
        let mut report = PublishReport::default();

        let keys = match self.context.destinations(channel, file) {
            Ok(keys) => keys,
            Err(e) if !e.is_fatal() => {
                warn!(%channel, file = %file.display(), "{e}");
                report.failures.push(Failure {
                    channel,
                    source: file.to_path_buf(),
                    key: None,
                    message: e.to_string(),
                });
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        };

        if keys.is_empty() {
            debug!(%channel, file = %file.display(), "nothing to publish");
        }

        for key in keys {
            let copied = match self.copier {
                None => {
                    info!(%channel, file = %file.display(), key = %key, "dry run");
                    false
                }
                Some(copier) => {
                    if let Err(e) = copier.copy(file, &key, self.cache).await {
                        error!(%channel, file = %file.display(), key = %key, "{e}");
                        report.failures.push(Failure {
                            channel,
                            source: file.to_path_buf(),
                            key: Some(key),
                            message: e.to_string(),
                        });
                        // Later destinations duplicate this one
                        break;
                    }
                    true
                }
            };

            report.placements.push(Placement {
                channel,
                source: file.to_path_buf(),
                key,
                copied,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_helpers() {
        let mut report = PublishReport::default();
        assert!(report.is_success());

        report.placements.push(Placement {
            channel: Channel::Latest,
            source: PathBuf::from("/tmp/src/a"),
            key: "pub/a".to_string(),
            copied: true,
        });
        report.failures.push(Failure {
            channel: Channel::Latest,
            source: PathBuf::from("/etc/passwd"),
            key: None,
            message: "out of tree".to_string(),
        });

        assert_eq!(report.keys(), vec!["pub/a"]);
        assert!(!report.is_success());
    }

    #[test]
    fn test_report_serializes() {
        let report = PublishReport {
            placements: vec![Placement {
                channel: Channel::TryBuilds,
                source: PathBuf::from("/tmp/src/a"),
                key: "pub/firefox/try-builds/who-rev/a".to_string(),
                copied: false,
            }],
            failures: Vec::new(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["placements"][0]["channel"], "try-builds");
        assert_eq!(json["placements"][0]["copied"], false);
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let ctx = PathContext::new("/tmp/src", "firefox");
        let cache = TransferCache::new();
        let publisher = Publisher::dry_run(&ctx, &cache).with_concurrency(0);
        assert_eq!(publisher.concurrency, 1);
        assert!(publisher.is_dry_run());
    }
}
