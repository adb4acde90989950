//! HTTP metadata stored alongside each object
//!
//! Browsers and mirrors download straight from the bucket, so every object
//! carries the content type, encoding and cache lifetime it is served with.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::time::Duration;

/// Content type used when nothing more specific is known
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Gzipped text logs are served as text the browser inflates itself
const GZIPPED_TEXT_SUFFIX: &str = ".txt.gz";
const GZIPPED_TEXT_CONTENT_TYPE: &str = "text/plain; charset=UTF-8";
const GZIP_ENCODING: &str = "gzip";

/// Release formats the generic extension table gets wrong or lacks
const CONTENT_TYPE_OVERRIDES: [(&str, &str); 9] = [
    ("mar", "application/octet-stream"),
    ("msi", "application/octet-stream"),
    ("apk", "application/vnd.android.package-archive"),
    ("cab", "application/vnd.ms-cab-compressed"),
    ("dmg", "application/x-apple-diskimage"),
    ("deb", "application/x-debian-package"),
    ("install", "application/x-install-instructions"),
    ("jar", "application/x-java-archive"),
    ("xpi", "application/x-xpinstall"),
];

/// A key pattern and how long matching objects may be cached
struct CacheRule {
    pattern: Regex,
    max_age: Duration,
}

/// Keys that are overwritten in place and must expire quickly
static CACHE_RULES: Lazy<Vec<CacheRule>> = Lazy::new(|| {
    vec![CacheRule {
        pattern: Regex::new(r"^pub/.*/nightly/latest.*").expect("valid cache pattern"),
        max_age: Duration::from_secs(60 * 60),
    }]
});

/// Headers an object is stored with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectMetadata {
    pub content_type: String,
    pub content_encoding: Option<String>,
    pub cache_control: Option<String>,
}

impl ObjectMetadata {
    /// Metadata for an object stored at `key`
    pub fn for_key(key: &str) -> Self {
        let cache_control = cache_control(key);

        if key.ends_with(GZIPPED_TEXT_SUFFIX) {
            return Self {
                content_type: GZIPPED_TEXT_CONTENT_TYPE.to_string(),
                content_encoding: Some(GZIP_ENCODING.to_string()),
                cache_control,
            };
        }

        Self {
            content_type: content_type(key),
            content_encoding: None,
            cache_control,
        }
    }
}

impl Default for ObjectMetadata {
    fn default() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            content_encoding: None,
            cache_control: None,
        }
    }
}

/// `Cache-Control` value for `key`, if it expires early
pub fn cache_control(key: &str) -> Option<String> {
    CACHE_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(key))
        .map(|rule| format!("max-age={}", rule.max_age.as_secs()))
}

/// Content type of `path`, judged by its last extension
pub fn content_type(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    let extension = match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => return DEFAULT_CONTENT_TYPE.to_string(),
    };

    if let Some((_, mime)) = CONTENT_TYPE_OVERRIDES
        .iter()
        .find(|(candidate, _)| *candidate == extension)
    {
        return mime.to_string();
    }

    match mime_guess::from_ext(&extension).first_raw() {
        Some(mime) if mime.starts_with("text/") => format!("{mime}; charset=utf-8"),
        Some(mime) => mime.to_string(),
        None => DEFAULT_CONTENT_TYPE.to_string(),
    }
}
