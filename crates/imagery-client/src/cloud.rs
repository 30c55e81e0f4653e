//! Cloud-probability scoring.
//!
//! The per-pixel score is the minimum of five brightness/temperature/index
//! heuristics, each linearly rescaled into [0, 1] against fixed calibration
//! thresholds. The calibration values encode empirical tuning and are kept
//! as literals.

use tracing::instrument;

use truth_common::{Footprint, TruthError, TruthResult};

use crate::backend::ImageryBackend;
use crate::ops::{bands, ImageOp};

/// Per-pixel probability above which a pixel counts as cloud.
pub const CLOUD_MASK_THRESHOLD: f64 = 0.5;

/// Ground scale for region reductions, in meters.
pub const SCORE_SCALE_M: f64 = 30.0;

const BLUE_BRIGHTNESS: [f64; 2] = [0.1, 0.3];
const VISIBLE_BRIGHTNESS: [f64; 2] = [0.2, 0.8];
const INFRARED_BRIGHTNESS: [f64; 2] = [0.3, 0.8];
const THERMAL_COOLNESS: [f64; 2] = [300.0, 290.0];
const SNOW_INDEX: [f64; 2] = [0.8, 0.6];

/// Per-pixel cloud probability of `source`, in [0, 1].
///
/// Clouds are bright in the blue band, bright across all visible bands,
/// bright in the infrared bands, and cold; the snow-index term keeps
/// bright-and-cold snow from being flagged. The thermal and snow ranges are
/// inverted so colder / less-snowy pixels score higher.
pub fn pixel_cloud_score(source: &ImageOp) -> ImageOp {
    ImageOp::min_of(vec![
        source.clone().rescale(bands::BLUE, BLUE_BRIGHTNESS),
        source
            .clone()
            .rescale("red + green + blue", VISIBLE_BRIGHTNESS),
        source
            .clone()
            .rescale("nir + swir1 + swir2", INFRARED_BRIGHTNESS),
        source.clone().rescale(bands::TEMP, THERMAL_COOLNESS),
        source
            .clone()
            .normalized_difference(bands::GREEN, bands::SWIR1)
            .rescale(bands::ND, SNOW_INDEX),
    ])
}

/// Fraction of footprint pixels whose cloud probability exceeds the fixed
/// threshold, in [0, 1].
///
/// The score is the request's sole image-quality signal and is surfaced
/// unmodified; a value outside [0, 1] from the service is a contract
/// violation, not something to clamp.
#[instrument(skip_all)]
pub async fn region_cloud_score(
    backend: &dyn ImageryBackend,
    source: &ImageOp,
    footprint: &Footprint,
) -> TruthResult<f64> {
    let mask = pixel_cloud_score(source).greater_than(CLOUD_MASK_THRESHOLD);
    let score = backend.region_mean(&mask, footprint, SCORE_SCALE_M).await?;

    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(TruthError::RemoteService(format!(
            "cloud score out of range: {}",
            score
        )));
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::backend::{CatalogQuery, SceneRecord};
    use crate::visualize::RenderParams;

    #[test]
    fn test_score_is_minimum_of_five_heuristics() {
        let op = pixel_cloud_score(&ImageOp::scene("S1"));

        let sources = match op {
            ImageOp::Min { sources } => sources,
            other => panic!("expected Min, got {:?}", other),
        };
        assert_eq!(sources.len(), 5);

        let ranges: Vec<[f64; 2]> = sources
            .iter()
            .map(|s| match s {
                ImageOp::Rescale { range, .. } => *range,
                other => panic!("expected Rescale, got {:?}", other),
            })
            .collect();
        assert_eq!(
            ranges,
            vec![
                [0.1, 0.3],
                [0.2, 0.8],
                [0.3, 0.8],
                [300.0, 290.0],
                [0.8, 0.6],
            ]
        );
    }

    #[test]
    fn test_snow_heuristic_uses_normalized_difference() {
        let op = pixel_cloud_score(&ImageOp::scene("S1"));
        let sources = match op {
            ImageOp::Min { sources } => sources,
            other => panic!("expected Min, got {:?}", other),
        };

        match &sources[4] {
            ImageOp::Rescale { source, .. } => match source.as_ref() {
                ImageOp::NormalizedDifference { bands: nd, .. } => {
                    assert_eq!(nd, &["green".to_string(), "swir1".to_string()]);
                }
                other => panic!("expected NormalizedDifference, got {:?}", other),
            },
            other => panic!("expected Rescale, got {:?}", other),
        }
    }

    struct FixedMean(f64);

    #[async_trait]
    impl ImageryBackend for FixedMean {
        async fn search_scenes(&self, _query: &CatalogQuery) -> TruthResult<Vec<SceneRecord>> {
            unimplemented!("not used by cloud tests")
        }

        async fn render_thumbnail(
            &self,
            _image: &ImageOp,
            _params: &RenderParams,
            _region: &Footprint,
        ) -> TruthResult<String> {
            unimplemented!("not used by cloud tests")
        }

        async fn region_mean(
            &self,
            _image: &ImageOp,
            _region: &Footprint,
            _scale_m: f64,
        ) -> TruthResult<f64> {
            Ok(self.0)
        }
    }

    fn footprint() -> Footprint {
        Footprint::compute(101.1, 1.5, 500, 500).unwrap()
    }

    #[tokio::test]
    async fn test_region_score_passes_through_in_range_values() {
        let score = region_cloud_score(&FixedMean(0.125), &ImageOp::scene("S1"), &footprint())
            .await
            .unwrap();
        assert_eq!(score, 0.125);
    }

    #[tokio::test]
    async fn test_region_score_rejects_out_of_range_values() {
        for bad in [-0.1, 1.5, f64::NAN] {
            let err = region_cloud_score(&FixedMean(bad), &ImageOp::scene("S1"), &footprint())
                .await
                .unwrap_err();
            assert!(matches!(err, TruthError::RemoteService(_)));
        }
    }
}
