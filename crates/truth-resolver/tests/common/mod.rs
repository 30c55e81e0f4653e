//! Shared wiring for resolver integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use test_utils::{MemoryBlobStore, MemoryBundleCache, StubImagery};
use truth_common::TruthResult;
use truth_resolver::{ArtifactResolver, CacheGateway, ThumbnailFetcher};

pub const BLOB_BASE: &str = "http://blobs.test/truth-imagery";

/// Fetcher returning fixed bytes, counting calls.
#[derive(Default)]
pub struct StubFetcher {
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThumbnailFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> TruthResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Bytes::from_static(b"\x89PNG\r\n\x1a\nstub"))
    }
}

pub struct Harness {
    pub gateway: CacheGateway,
    pub imagery: Arc<StubImagery>,
    pub blobs: Arc<MemoryBlobStore>,
    pub cache: Arc<MemoryBundleCache>,
    pub fetcher: Arc<StubFetcher>,
}

/// Initialize test logging once; safe to call from every test.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Wire a gateway over the given imagery stub and fresh in-memory stores.
pub fn harness(imagery: StubImagery) -> Harness {
    init_tracing();
    let imagery = Arc::new(imagery);
    let blobs = Arc::new(MemoryBlobStore::new());
    let cache = Arc::new(MemoryBundleCache::new());
    let fetcher = Arc::new(StubFetcher::default());

    let resolver = ArtifactResolver::new(imagery.clone(), "L7");
    let gateway = CacheGateway::new(
        resolver,
        cache.clone(),
        blobs.clone(),
        fetcher.clone(),
        BLOB_BASE,
    );

    Harness {
        gateway,
        imagery,
        blobs,
        cache,
        fetcher,
    }
}
