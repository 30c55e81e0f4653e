//! Pan-sharpening and thumbnail rendering parameters.

use serde::{Deserialize, Serialize};

use crate::ops::{bands, ImageOp};

/// Ground scale for rendered thumbnails, in meters.
pub const THUMBNAIL_SCALE_M: f64 = 30.0;

const THUMBNAIL_PROJECTION: &str = "EPSG:4326";

/// Fuse the color triplet with the panchromatic band.
///
/// Converts red/green/blue to hue/saturation/value, discards the coarse
/// value channel, substitutes the finer panchromatic band, and converts
/// back, raising the color product to the panchromatic resolution.
pub fn pan_sharpen(source: ImageOp) -> ImageOp {
    let hue_sat = source
        .clone()
        .select([bands::RED, bands::GREEN, bands::BLUE])
        .rgb_to_hsv()
        .select([bands::HUE, bands::SATURATION]);
    let pan = source.select([bands::PAN]);

    ImageOp::concat(vec![hue_sat, pan]).hsv_to_rgb()
}

/// Display-stretch and projection parameters for thumbnail rendering.
///
/// The stretch values are fixed calibration constants, distinct per
/// product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    pub stretch_min: f64,
    pub stretch_max: f64,
    pub gamma: f64,
    pub scale_m: f64,
    pub projection: String,
}

impl RenderParams {
    /// Stretch for the date-anchored final scene.
    pub fn final_product() -> Self {
        Self {
            stretch_min: 0.01,
            stretch_max: 0.5,
            gamma: 1.7,
            scale_m: THUMBNAIL_SCALE_M,
            projection: THUMBNAIL_PROJECTION.to_string(),
        }
    }

    /// Stretch for the pre-alert reference composite.
    pub fn reference_product() -> Self {
        Self {
            stretch_min: 0.01,
            stretch_max: 0.4,
            gamma: 1.5,
            scale_m: THUMBNAIL_SCALE_M,
            projection: THUMBNAIL_PROJECTION.to_string(),
        }
    }
}
