//! Idempotent caching gateway in front of the resolver.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, instrument};

use storage::{BlobPath, BlobStore, BundleCache, CacheRecord};
use truth_common::{ArtifactBundle, ImageArtifact, ResolutionRequest, TruthError, TruthResult};

use crate::fetch::ThumbnailFetcher;
use crate::resolver::ArtifactResolver;

/// Serves artifact bundles, resolving on cache miss.
///
/// A bundle cached under a request id is immutable truth for that id: the
/// pipeline never re-runs for an id that already has an entry. On a miss
/// the freshly rendered thumbnails are fetched, persisted as blobs, and
/// the bundle is stored with locally-servable URLs.
pub struct CacheGateway {
    resolver: ArtifactResolver,
    cache: Arc<dyn BundleCache>,
    blobs: Arc<dyn BlobStore>,
    fetcher: Arc<dyn ThumbnailFetcher>,
    blob_public_base: String,
    locks: KeyLocks,
}

impl CacheGateway {
    pub fn new(
        resolver: ArtifactResolver,
        cache: Arc<dyn BundleCache>,
        blobs: Arc<dyn BlobStore>,
        fetcher: Arc<dyn ThumbnailFetcher>,
        blob_public_base: impl Into<String>,
    ) -> Self {
        let blob_public_base = blob_public_base
            .into()
            .trim_end_matches('/')
            .to_string();
        Self {
            resolver,
            cache,
            blobs,
            fetcher,
            blob_public_base,
            locks: KeyLocks::new(),
        }
    }

    /// Wire a gateway from configuration: HTTP imagery backend, redis
    /// bundle cache, S3 blob store, HTTP thumbnail fetcher.
    pub async fn from_config(config: &crate::config::ResolverConfig) -> TruthResult<Self> {
        use imagery_client::{HttpImageryBackend, ImageryBackend};
        use storage::{ObjectStorage, RedisBundleCache};

        let backend: Arc<dyn ImageryBackend> = Arc::new(HttpImageryBackend::new(&config.imagery)?);
        let resolver = ArtifactResolver::new(backend, config.collection.clone());

        let cache: Arc<dyn BundleCache> =
            Arc::new(RedisBundleCache::connect(&config.redis_url).await?);
        let blobs: Arc<dyn BlobStore> = Arc::new(ObjectStorage::new(&config.storage)?);
        let fetcher: Arc<dyn ThumbnailFetcher> = Arc::new(crate::fetch::HttpFetcher::new(
            std::time::Duration::from_secs(config.fetch_deadline_secs),
        )?);

        Ok(Self::new(
            resolver,
            cache,
            blobs,
            fetcher,
            config.blob_public_base.clone(),
        ))
    }

    /// Resolve a request, serving from cache when possible.
    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn resolve_and_cache(
        &self,
        request: &ResolutionRequest,
    ) -> TruthResult<ArtifactBundle> {
        if let Some(record) = self.cache.get(&request.request_id).await? {
            debug!("Serving cached bundle");
            return Ok(record.bundle);
        }

        // Concurrent misses for one id coalesce into a single in-flight
        // resolution behind a per-id lock.
        let guard = self.locks.acquire(&request.request_id).await;
        let result = self.resolve_and_persist(request).await;
        drop(guard);
        self.locks.release(&request.request_id);

        result
    }

    async fn resolve_and_persist(
        &self,
        request: &ResolutionRequest,
    ) -> TruthResult<ArtifactBundle> {
        // Re-check under the lock: another caller may have resolved this
        // id while we waited.
        if let Some(record) = self.cache.get(&request.request_id).await? {
            debug!("Resolved by concurrent caller, serving cached bundle");
            return Ok(record.bundle);
        }

        info!(
            lat = request.latitude,
            lon = request.longitude,
            width_m = request.width_m,
            height_m = request.height_m,
            date = %request.alert_date,
            "Resolving alert imagery"
        );

        let bundle = self.resolver.resolve(request).await?;

        let (final_image, final_key) = self.localize(bundle.final_image).await?;
        let (reference_image, reference_key) = self.localize(bundle.reference_image).await?;

        let bundle = ArtifactBundle {
            final_image,
            reference_image,
            request: bundle.request,
        };
        let record = CacheRecord {
            bundle: bundle.clone(),
            blob_keys: vec![final_key, reference_key],
            resolved_at: Utc::now(),
        };
        self.cache.put(&request.request_id, &record).await?;

        info!("Bundle cached");
        Ok(bundle)
    }

    /// Fetch one remote thumbnail, persist its bytes, and rewrite the
    /// artifact URL to the stored blob's location.
    async fn localize(&self, artifact: ImageArtifact) -> TruthResult<(ImageArtifact, String)> {
        let id = thumbnail_id(&artifact.url)?;
        let bytes = self.fetcher.fetch(&artifact.url).await?;

        let key = BlobPath::thumbnail(&id);
        self.blobs.put(&key, bytes).await?;
        debug!(key = %key, "Thumbnail stored");

        let url = format!("{}/{}", self.blob_public_base, key);
        Ok((
            ImageArtifact {
                url,
                cloud_score: artifact.cloud_score,
            },
            key,
        ))
    }
}

/// Extract the thumbnail-id component from a service thumbnail URL.
///
/// The id doubles as the deterministic blob filename, so re-fetching the
/// same rendered thumbnail overwrites rather than duplicates.
fn thumbnail_id(url: &str) -> TruthResult<String> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| TruthError::RemoteService(format!("invalid thumbnail URL {}: {}", url, e)))?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "thumbid")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            TruthError::RemoteService(format!("thumbnail URL missing thumbid: {}", url))
        })
}

/// Registry of per-request-id async locks.
struct KeyLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyLocks {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(&self, key: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap();
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop a key's entry once no caller holds or awaits its lock.
    fn release(&self, key: &str) {
        let mut map = self.inner.lock().unwrap();
        if let Some(lock) = map.get(key) {
            if Arc::strong_count(lock) == 1 {
                map.remove(key);
            }
        }
    }
}
