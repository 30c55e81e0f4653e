//! Resolver configuration.

use serde::{Deserialize, Serialize};
use std::env;

use imagery_client::ImageryConfig;
use storage::ObjectStorageConfig;

/// Top-level resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Object storage configuration for thumbnail blobs
    pub storage: ObjectStorageConfig,

    /// Redis URL for the bundle cache
    pub redis_url: String,

    /// Imagery service connection
    pub imagery: ImageryConfig,

    /// Catalog collection the pipeline resolves against
    pub collection: String,

    /// Public base URL under which stored blobs are served
    pub blob_public_base: String,

    /// Deadline for thumbnail byte fetches, seconds
    pub fetch_deadline_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            storage: ObjectStorageConfig::default(),
            redis_url: "redis://redis:6379".to_string(),
            imagery: ImageryConfig::default(),
            collection: "LANDSAT/LE7_L1T".to_string(),
            blob_public_base: "http://minio:9000/truth-imagery".to_string(),
            fetch_deadline_secs: 50,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults suitable for local compose setups.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let storage = ObjectStorageConfig {
            endpoint: env::var("S3_ENDPOINT").unwrap_or(defaults.storage.endpoint),
            bucket: env::var("S3_BUCKET").unwrap_or(defaults.storage.bucket),
            access_key_id: env::var("S3_ACCESS_KEY").unwrap_or(defaults.storage.access_key_id),
            secret_access_key: env::var("S3_SECRET_KEY")
                .unwrap_or(defaults.storage.secret_access_key),
            region: env::var("S3_REGION").unwrap_or(defaults.storage.region),
            allow_http: env::var("S3_ALLOW_HTTP")
                .map(|v| v == "true")
                .unwrap_or(defaults.storage.allow_http),
        };

        let imagery = ImageryConfig {
            endpoint: env::var("IMAGERY_ENDPOINT").unwrap_or(defaults.imagery.endpoint),
            api_key: env::var("IMAGERY_API_KEY").ok(),
            deadline_secs: env::var("IMAGERY_DEADLINE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.imagery.deadline_secs),
        };

        Self {
            storage,
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            imagery,
            collection: env::var("IMAGERY_COLLECTION").unwrap_or(defaults.collection),
            blob_public_base: env::var("BLOB_PUBLIC_URL").unwrap_or(defaults.blob_public_base),
            fetch_deadline_secs: env::var("FETCH_DEADLINE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_deadline_secs),
        }
    }
}
