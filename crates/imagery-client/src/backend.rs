//! Imagery-service capability object.
//!
//! The service is injected everywhere as an explicit `Arc<dyn
//! ImageryBackend>`, constructed once per process from [`ImageryConfig`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};

use truth_common::{Footprint, SearchWindow, TruthError, TruthResult};

use crate::ops::ImageOp;
use crate::visualize::RenderParams;

/// A catalog search: scenes of one collection intersecting a footprint
/// within a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub collection: String,
    pub window: SearchWindow,
    pub footprint: Footprint,
}

/// One catalog scene returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Opaque catalog identifier.
    pub id: String,
    /// Capture timestamp.
    pub captured_at: DateTime<Utc>,
}

/// Capabilities consumed from the remote imagery analysis service.
#[async_trait]
pub trait ImageryBackend: Send + Sync {
    /// Search the scene catalog.
    async fn search_scenes(&self, query: &CatalogQuery) -> TruthResult<Vec<SceneRecord>>;

    /// Render an image-operation tree to a thumbnail URL.
    async fn render_thumbnail(
        &self,
        image: &ImageOp,
        params: &RenderParams,
        region: &Footprint,
    ) -> TruthResult<String>;

    /// Reduce a raster to its mean over a region at the given ground scale.
    async fn region_mean(
        &self,
        image: &ImageOp,
        region: &Footprint,
        scale_m: f64,
    ) -> TruthResult<f64>;
}

/// Configuration for the imagery-service connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageryConfig {
    /// Service base URL
    pub endpoint: String,
    /// Bearer token, if the deployment requires one
    pub api_key: Option<String>,
    /// Per-request deadline in seconds
    pub deadline_secs: u64,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://imagery:8080".to_string(),
            api_key: None,
            deadline_secs: 60,
        }
    }
}

/// HTTP/JSON client for the imagery service.
pub struct HttpImageryBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpImageryBackend {
    /// Create a client from config.
    pub fn new(config: &ImageryConfig) -> TruthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.deadline_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                TruthError::RemoteService(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> TruthResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.endpoint, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TruthError::RemoteService(format!("{} request failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TruthError::RemoteService(format!(
                "{} returned {}",
                path, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TruthError::RemoteService(format!("{} returned invalid body: {}", path, e)))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    scenes: Vec<SceneRecord>,
}

#[derive(Debug, Serialize)]
struct ThumbnailRequest<'a> {
    image: &'a ImageOp,
    params: &'a RenderParams,
    region: &'a Footprint,
}

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    url: String,
}

#[derive(Debug, Serialize)]
struct ReduceRequest<'a> {
    image: &'a ImageOp,
    region: &'a Footprint,
    scale_m: f64,
}

#[derive(Debug, Deserialize)]
struct ReduceResponse {
    value: f64,
}

#[async_trait]
impl ImageryBackend for HttpImageryBackend {
    #[instrument(skip(self, query), fields(collection = %query.collection))]
    async fn search_scenes(&self, query: &CatalogQuery) -> TruthResult<Vec<SceneRecord>> {
        let response: SearchResponse = self.post("catalog/search", query).await?;
        debug!(count = response.scenes.len(), "Catalog search completed");
        Ok(response.scenes)
    }

    #[instrument(skip_all)]
    async fn render_thumbnail(
        &self,
        image: &ImageOp,
        params: &RenderParams,
        region: &Footprint,
    ) -> TruthResult<String> {
        let body = ThumbnailRequest {
            image,
            params,
            region,
        };
        let response: ThumbnailResponse = self.post("thumbnail", &body).await?;
        debug!(url = %response.url, "Thumbnail rendered");
        Ok(response.url)
    }

    #[instrument(skip_all)]
    async fn region_mean(
        &self,
        image: &ImageOp,
        region: &Footprint,
        scale_m: f64,
    ) -> TruthResult<f64> {
        let body = ReduceRequest {
            image,
            region,
            scale_m,
        };
        let response: ReduceResponse = self.post("reduce/mean", &body).await?;
        Ok(response.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_is_stripped() {
        let backend = HttpImageryBackend::new(&ImageryConfig {
            endpoint: "http://imagery:8080/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(backend.endpoint, "http://imagery:8080");
    }

    #[test]
    fn test_scene_record_deserializes() {
        let json = r#"{"id": "LE7_127059_20140911", "captured_at": "2014-09-11T03:21:00Z"}"#;
        let record: SceneRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "LE7_127059_20140911");
    }
}
