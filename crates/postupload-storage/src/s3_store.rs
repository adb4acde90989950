//! S3-compatible storage implementation using MinIO client
//!
//! Works with AWS S3, MinIO, and any S3-compatible object storage holding the
//! delivery tree. Keys are spread over buckets by a [`BucketMap`].

use async_trait::async_trait;
use bytes::Bytes;
use minio::s3::{
    builders::{CopySource, ObjectContent},
    client::Client,
    creds::StaticProvider,
    http::BaseUrl,
    types::S3Api,
};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::bucket_map::BucketMap;
use crate::error::StorageError;
use crate::metadata::ObjectMetadata;
use crate::store::ObjectStore;

const MAX_KEY_LEN: usize = 1024;

/// Connection settings for an S3-compatible endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub endpoint_url: String,
    pub access_key: String,
    pub secret_key: String,
    pub buckets: BucketMap,
}

impl S3Settings {
    /// Read settings from environment variables
    ///
    /// Expects:
    /// - S3_ENDPOINT_URL
    /// - S3_ACCESS_KEY_ID
    /// - S3_SECRET_ACCESS_KEY
    ///
    /// Every key goes to `bucket` when given, else to S3_BUCKET when set.
    /// Otherwise keys follow the production [`BucketMap`], with bucket names
    /// prefixed by S3_BUCKET_PREFIX (empty by default).
    pub fn from_env(bucket: Option<String>) -> Result<Self, StorageError> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| {
                StorageError::Backend(format!("{name} environment variable not set"))
            })
        };

        let buckets = match bucket.or_else(|| std::env::var("S3_BUCKET").ok()) {
            Some(bucket) => BucketMap::single(bucket),
            None => {
                let prefix = std::env::var("S3_BUCKET_PREFIX").unwrap_or_default();
                BucketMap::production(&prefix)
            }
        };

        Ok(Self {
            endpoint_url: var("S3_ENDPOINT_URL")?,
            access_key: var("S3_ACCESS_KEY_ID")?,
            secret_key: var("S3_SECRET_ACCESS_KEY")?,
            buckets,
        })
    }
}

/// S3-compatible storage implementation using MinIO client
pub struct S3Store {
    client: Client,
    buckets: BucketMap,
}

impl S3Store {
    /// Create a new S3 store over an existing client
    pub fn new(client: Client, buckets: BucketMap) -> Self {
        Self { client, buckets }
    }

    /// Connect to the endpoint described by `settings`
    pub fn connect(settings: &S3Settings) -> Result<Self, StorageError> {
        let base_url = BaseUrl::from_str(&settings.endpoint_url)
            .map_err(|e| StorageError::Backend(format!("Invalid S3_ENDPOINT_URL: {}", e)))?;

        let creds_provider = StaticProvider::new(&settings.access_key, &settings.secret_key, None);

        let client = Client::new(
            base_url,
            Some(Box::new(creds_provider)),
            None, // Default region
            None, // No custom HTTP client
        )
        .map_err(|e| StorageError::Backend(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self::new(client, settings.buckets.clone()))
    }

    pub fn buckets(&self) -> &BucketMap {
        &self.buckets
    }

    /// Keys are relative: never empty, never starting or ending with `/`
    fn validate_key(&self, key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(
                "Key must be between 1 and 1024 characters".into(),
            ));
        }

        if key.starts_with('/') || key.ends_with('/') {
            return Err(StorageError::InvalidKey(format!(
                "Key cannot start or end with '/': {key}"
            )));
        }

        Ok(())
    }

    async fn put_content(
        &self,
        key: &str,
        content: ObjectContent,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        self.validate_key(key)?;
        let bucket = self.buckets.bucket_for(key);
        debug!(bucket, key, content_type = %metadata.content_type, "putting object");

        self.client
            .put_object_content(bucket, key, content)
            .content_type(metadata.content_type.clone())
            .extra_headers(Some(object_headers(metadata).into_iter().collect()))
            .send()
            .await
            .map_err(|e| {
                StorageError::Backend(format!("Failed to put '{}/{}': {}", bucket, key, e))
            })?;

        Ok(())
    }
}

fn is_not_found(message: &str) -> bool {
    message.contains("NoSuchKey") || message.contains("404")
}

/// Headers besides `Content-Type` an object is stored with
fn object_headers(metadata: &ObjectMetadata) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    if let Some(cache_control) = &metadata.cache_control {
        headers.push(("Cache-Control".to_string(), cache_control.clone()));
    }
    if let Some(encoding) = &metadata.content_encoding {
        headers.push(("Content-Encoding".to_string(), encoding.clone()));
    }
    headers
}

/// Headers replacing the metadata of a copied object with `metadata`
fn copy_headers(metadata: &ObjectMetadata) -> Vec<(String, String)> {
    let mut headers = vec![
        ("x-amz-metadata-directive".to_string(), "REPLACE".to_string()),
        ("Content-Type".to_string(), metadata.content_type.clone()),
    ];
    headers.extend(object_headers(metadata));
    headers
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        let content = ObjectContent::from(Bytes::from(data));
        self.put_content(key, content, metadata).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.validate_key(key)?;
        let bucket = self.buckets.bucket_for(key);

        let response = self
            .client
            .get_object(bucket, key)
            .send()
            .await
            .map_err(|e| {
                let message = e.to_string();
                if is_not_found(&message) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend(format!("Failed to get '{}': {}", key, message))
                }
            })?;

        let content = response.content.to_segmented_bytes().await.map_err(|e| {
            StorageError::Backend(format!("Failed to read '{}' content: {}", key, e))
        })?;

        Ok(content.to_bytes().to_vec())
    }

    /// Streams the file from disk instead of reading it into memory
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        if let Err(e) = tokio::fs::metadata(path).await {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
        self.put_content(key, ObjectContent::from(path), metadata).await
    }

    /// Server-side copy, across buckets when the keys map to different ones
    async fn copy(
        &self,
        from: &str,
        to: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StorageError> {
        self.validate_key(from)?;
        self.validate_key(to)?;
        let from_bucket = self.buckets.bucket_for(from);
        let to_bucket = self.buckets.bucket_for(to);
        debug!(from_bucket, from, to_bucket, to, "copying object");

        let source = CopySource::new(from_bucket, from).map_err(|e| {
            StorageError::Backend(format!("Invalid copy source '{}/{}': {}", from_bucket, from, e))
        })?;

        self.client
            .copy_object(to_bucket, to)
            .source(source)
            .extra_headers(Some(copy_headers(metadata).into_iter().collect()))
            .send()
            .await
            .map_err(|e| {
                let message = e.to_string();
                if is_not_found(&message) {
                    StorageError::NotFound(from.to_string())
                } else {
                    StorageError::Backend(format!(
                        "Failed to copy '{}/{}' to '{}/{}': {}",
                        from_bucket, from, to_bucket, to, message
                    ))
                }
            })?;

        Ok(())
    }
}
