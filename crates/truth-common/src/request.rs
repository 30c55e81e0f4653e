//! Typed resolution request and artifact bundle model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{TruthError, TruthResult};

/// A request to resolve the imagery artifact set for one alert.
///
/// Immutable once constructed. `request_id` is the cache key: the caller is
/// trusted to keep it unique per distinct (location, date, dimensions) it
/// cares to distinguish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub height_m: u32,
    pub width_m: u32,
    pub alert_date: NaiveDate,
    pub request_id: String,
}

impl ResolutionRequest {
    /// Build a request, failing fast on malformed numeric input.
    ///
    /// Format validation (string parsing, presence checks) belongs to the
    /// boundary layer; this only rejects values no footprint can be
    /// computed from.
    pub fn new(
        latitude: f64,
        longitude: f64,
        height_m: u32,
        width_m: u32,
        alert_date: NaiveDate,
        request_id: impl Into<String>,
    ) -> TruthResult<Self> {
        let request_id = request_id.into();
        if request_id.is_empty() {
            return Err(TruthError::InvalidArgument(
                "request_id must not be empty".to_string(),
            ));
        }
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(TruthError::InvalidArgument(format!(
                "coordinates must be finite: ({}, {})",
                latitude, longitude
            )));
        }
        if height_m == 0 || width_m == 0 {
            return Err(TruthError::InvalidArgument(format!(
                "dimensions must be positive: {}x{} m",
                width_m, height_m
            )));
        }

        Ok(Self {
            latitude,
            longitude,
            height_m,
            width_m,
            alert_date,
            request_id,
        })
    }
}

/// One rendered image product with its cloud contamination score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageArtifact {
    /// Dereferenceable thumbnail URL.
    pub url: String,
    /// Fraction of footprint pixels flagged cloudy, in [0, 1].
    pub cloud_score: f64,
}

/// The two-image product set resolved for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    /// Most-recent scene at the alert date.
    pub final_image: ImageArtifact,
    /// Pre-alert cloud-free composite of the same footprint.
    pub reference_image: ImageArtifact,
    /// The request this bundle answers.
    pub request: ResolutionRequest,
}
