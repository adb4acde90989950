//! Release metadata and the path helpers shared by every channel

use std::path::{Component, Path, PathBuf};

use crate::build_id::BuildId;
use crate::channel::{Channel, Field};
use crate::error::{ReleaseError, Result};
use crate::patterns;

/// Top level segment of every destination key
pub const DEFAULT_ROOT_DIR: &str = "pub";

/// Directory holding nightlies under each product
pub const DEFAULT_NIGHTLY_DIR: &str = "nightly";

/// Everything known about the release being uploaded
///
/// Populated once before any file is resolved and read-only afterwards.
/// Empty strings mean "not provided"; each channel checks only the fields it
/// needs (see [`Channel::required_fields`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    /// Local directory the uploaded files live under
    pub source_dir: PathBuf,
    /// First segment of every destination key
    pub root_dir: String,
    pub product: String,
    pub branch: String,
    /// Optional sub directory appended to most destinations
    pub build_dir: String,
    pub nightly_dir: String,
    pub tinderbox_builds_dir: String,
    pub version: String,
    pub build_number: String,
    /// Uploader of a try build
    pub who: String,
    pub revision: String,
    /// Whether Windows builds have already been signed
    pub signed: bool,
    pub build_id: Option<BuildId>,
}

impl PathContext {
    /// Create a context with default root and nightly directories
    pub fn new(source_dir: impl Into<PathBuf>, product: impl Into<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            root_dir: DEFAULT_ROOT_DIR.to_string(),
            product: product.into(),
            branch: String::new(),
            build_dir: String::new(),
            nightly_dir: DEFAULT_NIGHTLY_DIR.to_string(),
            tinderbox_builds_dir: String::new(),
            version: String::new(),
            build_number: String::new(),
            who: String::new(),
            revision: String::new(),
            signed: false,
            build_id: None,
        }
    }

    /// Fail with `MissingField` if `channel` lacks any of its metadata
    pub fn check_required(&self, channel: Channel) -> Result<()> {
        for field in channel.required_fields() {
            if !self.has(*field) {
                return Err(ReleaseError::MissingField {
                    channel,
                    field: *field,
                });
            }
        }
        Ok(())
    }

    fn has(&self, field: Field) -> bool {
        match field {
            Field::BuildId => self.build_id.is_some(),
            Field::Branch => !self.branch.is_empty(),
            Field::Version => !self.version.is_empty(),
            Field::BuildNumber => !self.build_number.is_empty(),
            Field::Who => !self.who.is_empty(),
            Field::Revision => !self.revision.is_empty(),
            Field::Product => !self.product.is_empty(),
        }
    }

    /// The build id, or `MissingField` on behalf of `channel`
    pub(crate) fn require_build_id(&self, channel: Channel) -> Result<&BuildId> {
        self.build_id.as_ref().ok_or(ReleaseError::MissingField {
            channel,
            field: Field::BuildId,
        })
    }

    /// Platform tag derived from the tinderbox builds directory
    pub fn platform(&self) -> Option<&'static str> {
        patterns::platform_of(&self.tinderbox_builds_dir)
    }

    /// Whether `file` is an update generation tool
    pub fn is_release_tool(&self, file: &Path) -> bool {
        file_name(file).is_some_and(patterns::is_release_tool)
    }

    /// `file` relative to the source directory
    ///
    /// The relative part may not climb back out through `..`.
    pub fn relative_source<'a>(&self, file: &'a Path) -> Result<&'a Path> {
        file.strip_prefix(&self.source_dir)
            .ok()
            .filter(|relative| file_name(relative).is_some())
            .filter(|relative| {
                !relative
                    .components()
                    .any(|component| component == Component::ParentDir)
            })
            .ok_or_else(|| ReleaseError::OutOfTree {
                path: file.to_path_buf(),
                source_dir: self.source_dir.clone(),
            })
    }

    /// Place `file` inside `dest_dir`
    ///
    /// With `preserve_dir` the file's directory relative to the source
    /// directory is kept between `dest_dir` and the file name; otherwise the
    /// file lands directly in `dest_dir`.
    pub fn resolve_path(
        &self,
        file: &Path,
        dest_dir: &str,
        preserve_dir: bool,
    ) -> Result<Vec<String>> {
        let relative = self.relative_source(file)?;

        let mut segments = vec![dest_dir.to_string()];
        if preserve_dir {
            if let Some(parent) = relative.parent() {
                segments.extend(path_segments(parent));
            }
        }
        segments.extend(path_segments(relative).last());

        Ok(vec![join_key(&segments)])
    }

    /// Key under `<root>/<product>` built from `segments`
    pub(crate) fn product_key(&self, segments: &[&str]) -> String {
        let mut parts = vec![self.root_dir.as_str(), self.product.as_str()];
        parts.extend_from_slice(segments);
        join_key(&parts)
    }
}

/// Base name of `path` as UTF-8, if any
pub(crate) fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn path_segments(path: &Path) -> impl Iterator<Item = String> + '_ {
    path.components().filter_map(|component| match component {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    })
}

/// Join key segments with `/`, skipping empty segments and stray slashes
pub fn join_key<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| segment.as_ref().trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
