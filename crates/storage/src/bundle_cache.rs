//! Durable, write-once cache of resolved artifact bundles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use truth_common::{ArtifactBundle, TruthError, TruthResult};

/// A cached resolution, keyed by request id.
///
/// Created on first resolution of a request id and never mutated; the blob
/// keys record which stored objects the bundle owns, for lifecycle
/// accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub bundle: ArtifactBundle,
    pub blob_keys: Vec<String>,
    pub resolved_at: DateTime<Utc>,
}

/// Get/put-by-key persistence for resolved bundles.
#[async_trait]
pub trait BundleCache: Send + Sync {
    /// Look up the record for a request id.
    async fn get(&self, request_id: &str) -> TruthResult<Option<CacheRecord>>;

    /// Persist a record for a request id.
    ///
    /// First writer wins: if a record already exists the store keeps it and
    /// the call succeeds without overwriting.
    async fn put(&self, request_id: &str, record: &CacheRecord) -> TruthResult<()>;
}

/// Redis-backed bundle cache.
///
/// Entries carry no TTL; they are durable until externally deleted.
pub struct RedisBundleCache {
    conn: MultiplexedConnection,
}

impl RedisBundleCache {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> TruthResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| TruthError::Cache(format!("Redis connection failed: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| TruthError::Cache(format!("Redis connection failed: {}", e)))?;

        Ok(Self { conn })
    }

    fn key(request_id: &str) -> String {
        format!("truth:bundle:{}", request_id)
    }
}

#[async_trait]
impl BundleCache for RedisBundleCache {
    #[instrument(skip(self))]
    async fn get(&self, request_id: &str) -> TruthResult<Option<CacheRecord>> {
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(Self::key(request_id))
            .await
            .map_err(|e| TruthError::Cache(format!("Cache get failed: {}", e)))?;

        match raw {
            Some(json) => {
                let record: CacheRecord = serde_json::from_str(&json)?;
                debug!("Cache hit");
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, record))]
    async fn put(&self, request_id: &str, record: &CacheRecord) -> TruthResult<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(record)?;

        // SET NX: the first completed resolution owns the entry; later
        // writers for the same id are no-ops.
        let was_set: bool = conn
            .set_nx(Self::key(request_id), json)
            .await
            .map_err(|e| TruthError::Cache(format!("Cache put failed: {}", e)))?;

        if !was_set {
            debug!("Entry already present, keeping first write");
        }
        Ok(())
    }
}
