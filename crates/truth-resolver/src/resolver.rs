//! Artifact resolution: final scene and reference composite.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use imagery_client::{
    cloud_free_composite, find_nearest_scene, pan_sharpen, region_cloud_score, ImageOp,
    ImageryBackend, RenderParams,
};
use truth_common::{
    ArtifactBundle, Footprint, ImageArtifact, ResolutionRequest, SearchWindow, TruthResult,
};

/// Search horizon for the single best date-anchored scene, days.
pub const FINAL_SEARCH_DAYS: i64 = 120;

/// Lookback window for the reference composite, days. Composites tolerate
/// looking further back than a single scene.
pub const REFERENCE_WINDOW_DAYS: i64 = 180;

/// Resolves a request into its two-image artifact bundle. No caching.
pub struct ArtifactResolver {
    backend: Arc<dyn ImageryBackend>,
    collection: String,
}

impl ArtifactResolver {
    /// Create a resolver over an imagery backend and catalog collection.
    pub fn new(backend: Arc<dyn ImageryBackend>, collection: impl Into<String>) -> Self {
        Self {
            backend,
            collection: collection.into(),
        }
    }

    /// Resolve the final and reference products for one request.
    ///
    /// The two branches have no data dependency and run concurrently.
    /// Failure in either fails the whole resolution; there is no
    /// partial-bundle result.
    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn resolve(&self, request: &ResolutionRequest) -> TruthResult<ArtifactBundle> {
        let footprint = Footprint::compute(
            request.longitude,
            request.latitude,
            request.width_m,
            request.height_m,
        )?;

        let (final_image, reference_image) = tokio::try_join!(
            self.resolve_final(&footprint, request.alert_date),
            self.resolve_reference(&footprint, request.alert_date),
        )?;

        Ok(ArtifactBundle {
            final_image,
            reference_image,
            request: request.clone(),
        })
    }

    /// Most-recent scene at the alert date, pan-sharpened and scored.
    async fn resolve_final(
        &self,
        footprint: &Footprint,
        alert_date: NaiveDate,
    ) -> TruthResult<ImageArtifact> {
        let scene = find_nearest_scene(
            self.backend.as_ref(),
            &self.collection,
            footprint,
            alert_date,
            FINAL_SEARCH_DAYS,
        )
        .await?;

        let source = ImageOp::scene(scene.id);
        let url = self
            .backend
            .render_thumbnail(
                &pan_sharpen(source.clone()),
                &RenderParams::final_product(),
                footprint,
            )
            .await?;
        let cloud_score = region_cloud_score(self.backend.as_ref(), &source, footprint).await?;

        debug!(cloud_score, "Final image resolved");
        Ok(ImageArtifact { url, cloud_score })
    }

    /// Pre-alert cloud-free composite, pan-sharpened and scored.
    async fn resolve_reference(
        &self,
        footprint: &Footprint,
        alert_date: NaiveDate,
    ) -> TruthResult<ImageArtifact> {
        let window = SearchWindow::ending_at(alert_date, REFERENCE_WINDOW_DAYS);
        let composite = cloud_free_composite(&self.collection, window, footprint);

        let url = self
            .backend
            .render_thumbnail(
                &pan_sharpen(composite.clone()),
                &RenderParams::reference_product(),
                footprint,
            )
            .await?;
        let cloud_score = region_cloud_score(self.backend.as_ref(), &composite, footprint).await?;

        debug!(cloud_score, "Reference image resolved");
        Ok(ImageArtifact { url, cloud_score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_utils::StubImagery;
    use truth_common::TruthError;

    fn request() -> ResolutionRequest {
        ResolutionRequest::new(
            1.5,
            101.1,
            500,
            500,
            NaiveDate::from_ymd_opt(2014, 9, 30).unwrap(),
            "R1",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_produces_two_scored_artifacts() {
        let imagery = Arc::new(StubImagery::new());
        let resolver = ArtifactResolver::new(imagery.clone(), "L7");

        let bundle = resolver.resolve(&request()).await.unwrap();

        assert!((0.0..=1.0).contains(&bundle.final_image.cloud_score));
        assert!((0.0..=1.0).contains(&bundle.reference_image.cloud_score));
        // URLs are still the service's remote thumbnails at this layer.
        assert!(bundle.final_image.url.contains("thumbid="));
        assert!(bundle.reference_image.url.contains("thumbid="));
        assert_ne!(bundle.final_image.url, bundle.reference_image.url);

        // One search for the final branch; one render and one reduction
        // per branch.
        assert_eq!(imagery.search_calls(), 1);
        assert_eq!(imagery.render_calls(), 2);
        assert_eq!(imagery.reduce_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_catalog_fails_whole_resolution() {
        let imagery = Arc::new(StubImagery::empty());
        let resolver = ArtifactResolver::new(imagery, "L7");

        let err = resolver.resolve(&request()).await.unwrap_err();
        assert!(matches!(err, TruthError::NoScenesFound { .. }));
    }

    #[tokio::test]
    async fn test_malformed_coordinates_fail_fast() {
        let imagery = Arc::new(StubImagery::new());
        let resolver = ArtifactResolver::new(imagery.clone(), "L7");

        let mut bad = request();
        bad.latitude = 95.0;
        let err = resolver.resolve(&bad).await.unwrap_err();
        assert!(matches!(err, TruthError::InvalidArgument(_)));
        assert_eq!(imagery.total_calls(), 0);
    }
}
