//! Call-counting stub of the imagery analysis service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use imagery_client::{CatalogQuery, ImageOp, ImageryBackend, RenderParams, SceneRecord};
use truth_common::{Footprint, TruthResult};

/// An in-memory imagery service with configurable catalog contents and
/// region statistics, counting every remote call.
pub struct StubImagery {
    scenes: Vec<SceneRecord>,
    region_mean: f64,
    delay: Option<Duration>,
    search_calls: AtomicUsize,
    render_calls: AtomicUsize,
    reduce_calls: AtomicUsize,
}

impl StubImagery {
    /// A stub whose catalog holds the single scene `S1`.
    pub fn new() -> Self {
        Self {
            scenes: vec![SceneRecord {
                id: "S1".to_string(),
                captured_at: Utc.with_ymd_and_hms(2014, 9, 11, 3, 21, 0).unwrap(),
            }],
            region_mean: 0.125,
            delay: None,
            search_calls: AtomicUsize::new(0),
            render_calls: AtomicUsize::new(0),
            reduce_calls: AtomicUsize::new(0),
        }
    }

    /// A stub whose catalog is empty (every search yields no scenes).
    pub fn empty() -> Self {
        Self {
            scenes: Vec::new(),
            ..Self::new()
        }
    }

    pub fn with_scenes(mut self, scenes: Vec<SceneRecord>) -> Self {
        self.scenes = scenes;
        self
    }

    pub fn with_region_mean(mut self, mean: f64) -> Self {
        self.region_mean = mean;
        self
    }

    /// Delay every call, to widen race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn render_calls(&self) -> usize {
        self.render_calls.load(Ordering::SeqCst)
    }

    pub fn reduce_calls(&self) -> usize {
        self.reduce_calls.load(Ordering::SeqCst)
    }

    /// Total remote calls made against the stub.
    pub fn total_calls(&self) -> usize {
        self.search_calls() + self.render_calls() + self.reduce_calls()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for StubImagery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageryBackend for StubImagery {
    async fn search_scenes(&self, query: &CatalogQuery) -> TruthResult<Vec<SceneRecord>> {
        self.pause().await;
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .scenes
            .iter()
            .filter(|s| {
                query
                    .window
                    .contains(s.captured_at.date_naive())
            })
            .cloned()
            .collect())
    }

    async fn render_thumbnail(
        &self,
        _image: &ImageOp,
        _params: &RenderParams,
        _region: &Footprint,
    ) -> TruthResult<String> {
        self.pause().await;
        let n = self.render_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://imagery.example/api/thumb?thumbid=thumb-{}&token=tok",
            n
        ))
    }

    async fn region_mean(
        &self,
        _image: &ImageOp,
        _region: &Footprint,
        _scale_m: f64,
    ) -> TruthResult<f64> {
        self.pause().await;
        self.reduce_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.region_mean)
    }
}
