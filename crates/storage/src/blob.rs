//! Blob storage for fetched thumbnail bytes (MinIO/S3 compatible).

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use truth_common::{TruthError, TruthResult};

/// Content type of every stored thumbnail, for the serving layer.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/png";

/// Write/read access to the blob store.
///
/// Paths double as storage keys; the serving layer turns a key into a
/// locally-dereferenceable download URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write bytes under a path, overwriting any existing object.
    async fn put(&self, path: &str, data: Bytes) -> TruthResult<()>;

    /// Read bytes from a path.
    async fn get(&self, path: &str) -> TruthResult<Bytes>;

    /// Check if an object exists.
    async fn exists(&self, path: &str) -> TruthResult<bool>;
}

/// Configuration for object storage connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// S3/MinIO endpoint URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// AWS region (use "us-east-1" for MinIO)
    pub region: String,
    /// Allow HTTP (for local MinIO)
    pub allow_http: bool,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://minio:9000".to_string(),
            bucket: "truth-imagery".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            allow_http: true,
        }
    }
}

/// Object storage client for thumbnail blobs.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStorage {
    /// Create a new object storage client from config.
    pub fn new(config: &ObjectStorageConfig) -> TruthResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_region(&config.region);

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| TruthError::Storage(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl BlobStore for ObjectStorage {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, path = %path))]
    async fn put(&self, path: &str, data: Bytes) -> TruthResult<()> {
        let location = Path::from(path);
        debug!(size = data.len(), "Writing blob");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| TruthError::Storage(format!("Failed to write {}: {}", path, e)))?;

        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, path = %path))]
    async fn get(&self, path: &str) -> TruthResult<Bytes> {
        let location = Path::from(path);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| TruthError::Storage(format!("Failed to read {}: {}", path, e)))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| TruthError::Storage(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Read blob");
        Ok(bytes)
    }

    async fn exists(&self, path: &str) -> TruthResult<bool> {
        let location = Path::from(path);

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(TruthError::Storage(format!(
                "Failed to check {}: {}",
                path, e
            ))),
        }
    }
}

/// Path builder for consistent storage layout.
pub struct BlobPath;

impl BlobPath {
    /// Build the deterministic path for a rendered thumbnail.
    /// Format: thumbnails/{thumbnail_id}.png
    pub fn thumbnail(thumbnail_id: &str) -> String {
        format!("thumbnails/{}.png", thumbnail_id)
    }
}
