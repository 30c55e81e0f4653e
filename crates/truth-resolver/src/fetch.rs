//! Thumbnail byte fetching.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, instrument};

use truth_common::{TruthError, TruthResult};

/// Fetches rendered thumbnail bytes from the imagery service's URLs.
#[async_trait]
pub trait ThumbnailFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> TruthResult<Bytes>;
}

/// HTTP fetcher with a fixed per-request deadline.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests are bounded by `deadline`.
    pub fn new(deadline: Duration) -> TruthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(deadline)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                TruthError::RemoteService(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ThumbnailFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> TruthResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TruthError::RemoteService(format!("Fetch failed for {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TruthError::RemoteService(format!(
                "Fetch of {} returned {}",
                url, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TruthError::RemoteService(format!("Failed to read body: {}", e)))?;

        debug!(size = bytes.len(), "Fetched thumbnail");
        Ok(bytes)
    }
}
