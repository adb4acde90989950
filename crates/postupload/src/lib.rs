//! Postupload works out where freshly built release artifacts belong in the
//! product delivery tree.
//!
//! A [`PathContext`] carries the release metadata of one upload. Each
//! [`Channel`] policy maps a source file to zero, one or two storage keys;
//! nothing here performs I/O.
//!
//! ```rust
//! use postupload::{Channel, PathContext};
//! use std::path::Path;
//!
//! let mut ctx = PathContext::new("/builds/upload", "firefox");
//! ctx.branch = "mozilla-central".to_string();
//!
//! let dests = ctx
//!     .destinations(Channel::Latest, Path::new("/builds/upload/firefox-55.0a1.en-US.win32.zip"))
//!     .unwrap();
//! assert_eq!(
//!     dests,
//!     vec![
//!         "pub/firefox/nightly/latest-mozilla-central/firefox-55.0a1.en-US.win32.zip",
//!         "pub/firefox/nightly/latest-mozilla-central-l10n/firefox-55.0a1.en-US.win32.zip",
//!     ]
//! );
//! ```

pub mod build_id;
pub mod channel;
pub mod context;
pub mod error;
pub mod patterns;
mod policies;

pub use build_id::{BUILD_TIMEZONE, BuildId};
pub use channel::{Channel, Field};
pub use context::{DEFAULT_NIGHTLY_DIR, DEFAULT_ROOT_DIR, PathContext, join_key};
pub use error::{ReleaseError, Result};

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
