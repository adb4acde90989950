//! Routing of delivery keys to the buckets that hold them

use serde::Serialize;

/// Bucket for keys no mount claims
pub const PRODUCTION_DEFAULT_BUCKET: &str = "archive";

/// Production key prefixes and their buckets
const PRODUCTION_MOUNTS: [(&str, &str); 16] = [
    ("pub/calendar/", "calendar"),
    ("pub/firefox/bundles/", "hg-bundles"),
    ("pub/firefox/try-builds/", "firefox-try"),
    ("pub/firefox/", "firefox"),
    ("pub/labs/", "labs"),
    ("pub/mobile/try-builds/", "firefox-android-try"),
    ("pub/mobile/", "firefox-android"),
    ("pub/nspr/", "security"),
    ("pub/opus/", "opus"),
    ("pub/seamonkey/", "seamonkey"),
    ("pub/security/", "security"),
    ("pub/thunderbird/try-builds/", "thunderbird-try"),
    ("pub/thunderbird/", "thunderbird"),
    ("pub/xulrunner/try-builds/", "xulrunner-try"),
    ("pub/xulrunner/", "xulrunner"),
    ("pub/webtools/", "webtools"),
];

/// A key prefix served from one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketMount {
    pub prefix: String,
    pub bucket: String,
}

/// Maps keys to buckets by their longest matching prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketMap {
    /// Bucket for keys outside every mount
    pub default: String,
    pub mounts: Vec<BucketMount>,
}

impl BucketMap {
    /// A map sending every key to `bucket`
    pub fn single(bucket: impl Into<String>) -> Self {
        Self {
            default: bucket.into(),
            mounts: Vec::new(),
        }
    }

    /// The production delivery layout
    ///
    /// Every bucket name, the default included, gets `bucket_prefix` in
    /// front of it.
    pub fn production(bucket_prefix: &str) -> Self {
        Self {
            default: format!("{bucket_prefix}{PRODUCTION_DEFAULT_BUCKET}"),
            mounts: PRODUCTION_MOUNTS
                .iter()
                .map(|(prefix, bucket)| BucketMount {
                    prefix: prefix.to_string(),
                    bucket: format!("{bucket_prefix}{bucket}"),
                })
                .collect(),
        }
    }

    /// Route keys under `prefix` to `bucket`
    pub fn mount(mut self, prefix: impl Into<String>, bucket: impl Into<String>) -> Self {
        self.mounts.push(BucketMount {
            prefix: prefix.into(),
            bucket: bucket.into(),
        });
        self
    }

    /// Bucket holding `key`
    pub fn bucket_for(&self, key: &str) -> &str {
        self.mounts
            .iter()
            .filter(|mount| key.starts_with(&mount.prefix))
            .max_by_key(|mount| mount.prefix.len())
            .map_or(self.default.as_str(), |mount| mount.bucket.as_str())
    }

    /// Every bucket a key can land in, default first
    pub fn buckets(&self) -> Vec<&str> {
        let mut buckets = vec![self.default.as_str()];
        for mount in &self.mounts {
            if !buckets.contains(&mount.bucket.as_str()) {
                buckets.push(&mount.bucket);
            }
        }
        buckets
    }
}
