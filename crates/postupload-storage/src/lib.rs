//! # Postupload storage
//!
//! Everything around the destination resolution of [`postupload`] that
//! touches the outside world:
//! - [`ObjectStore`] backends: in memory, and S3-compatible via MinIO
//! - [`ObjectMetadata`], the content type and cache lifetime of each key
//! - [`BucketMap`], which spreads keys over buckets by prefix
//! - [`TransferCache`], the per-run memo of already uploaded files
//! - [`Copier`], which places one local file at one key
//! - [`Publisher`], which runs channels over a batch of files
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use postupload::{Channel, PathContext};
//! use postupload_storage::{MemoryStore, Publisher, StoreCopier, TransferCache};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ctx = PathContext::new("/builds/upload", "firefox");
//! ctx.branch = "mozilla-central".to_string();
//!
//! let copier = StoreCopier::new(MemoryStore::new());
//! let cache = TransferCache::new();
//! let report = Publisher::new(&ctx, &cache, &copier)
//!     .publish(&[Channel::Latest], &[PathBuf::from("/builds/upload/firefox.zip")])
//!     .await?;
//!
//! for key in report.keys() {
//!     println!("{key}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod bucket_map;
pub mod cache;
pub mod copier;
pub mod error;
pub mod metadata;
pub mod publish;
pub mod store;

#[cfg(feature = "s3")]
pub mod s3_store;

pub use bucket_map::{BucketMap, BucketMount};
pub use cache::TransferCache;
pub use copier::{Copier, StoreCopier};
pub use error::{PublishError, StorageError, TransferError};
pub use metadata::ObjectMetadata;
pub use publish::{Failure, Placement, PublishReport, Publisher};
pub use store::{MemoryStore, ObjectStore};

#[cfg(feature = "s3")]
pub use s3_store::{S3Settings, S3Store};
