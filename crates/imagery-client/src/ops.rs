//! Serializable image-operation trees.
//!
//! An [`ImageOp`] describes a derived image as a tree of transformations
//! over catalog scenes. Trees are built locally and evaluated by the
//! imagery service, which keeps the raster math on the service side while
//! the recipe stays in this codebase.

use serde::{Deserialize, Serialize};
use truth_common::{Footprint, SearchWindow};

/// Spectral band names used across the pipeline.
pub mod bands {
    pub const BLUE: &str = "blue";
    pub const GREEN: &str = "green";
    pub const RED: &str = "red";
    pub const NIR: &str = "nir";
    pub const SWIR1: &str = "swir1";
    pub const SWIR2: &str = "swir2";
    pub const TEMP: &str = "temp";
    pub const PAN: &str = "pan";

    pub const HUE: &str = "hue";
    pub const SATURATION: &str = "saturation";

    /// Output band of a normalized-difference operation.
    pub const ND: &str = "nd";
}

/// One node in an image-operation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ImageOp {
    /// A catalog scene loaded by identifier.
    Scene { id: String },

    /// Placeholder for the current scene inside a per-scene mapping
    /// (see [`ImageOp::StackMin`]).
    MappedScene,

    /// Band selection.
    Select {
        source: Box<ImageOp>,
        bands: Vec<String>,
    },

    /// Evaluate a band-arithmetic expression, then linearly rescale the
    /// result so `range[0]` maps to 0 and `range[1]` maps to 1. An
    /// inverted range (`range[0] > range[1]`) flips the slope.
    Rescale {
        source: Box<ImageOp>,
        expression: String,
        range: [f64; 2],
    },

    /// `(a - b) / (a + b)` over two bands, emitted as band `nd`.
    NormalizedDifference {
        source: Box<ImageOp>,
        bands: [String; 2],
    },

    /// Pixelwise minimum across images.
    Min { sources: Vec<ImageOp> },

    /// Binary image: 1 where the source exceeds the threshold.
    GreaterThan {
        source: Box<ImageOp>,
        threshold: f64,
    },

    /// Binary image: 1 where the source does not exceed the threshold.
    AtMost {
        source: Box<ImageOp>,
        threshold: f64,
    },

    /// Keep only pixels where the mask is nonzero.
    UpdateMask {
        source: Box<ImageOp>,
        mask: Box<ImageOp>,
    },

    /// Apply `per_scene` (with [`ImageOp::MappedScene`] as the scene
    /// placeholder) to every catalog scene in the window intersecting the
    /// footprint, then reduce the stack with a pixelwise minimum.
    StackMin {
        collection: String,
        window: SearchWindow,
        footprint: Footprint,
        per_scene: Box<ImageOp>,
    },

    /// RGB to hue/saturation/value color-space conversion.
    RgbToHsv { source: Box<ImageOp> },

    /// Hue/saturation/value to RGB color-space conversion.
    HsvToRgb { source: Box<ImageOp> },

    /// Band concatenation, in order.
    Concat { sources: Vec<ImageOp> },

    /// Restrict the image to a footprint.
    Clip {
        source: Box<ImageOp>,
        footprint: Footprint,
    },
}

impl ImageOp {
    pub fn scene(id: impl Into<String>) -> Self {
        ImageOp::Scene { id: id.into() }
    }

    pub fn select<S: Into<String>>(self, bands: impl IntoIterator<Item = S>) -> Self {
        ImageOp::Select {
            source: Box::new(self),
            bands: bands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn rescale(self, expression: impl Into<String>, range: [f64; 2]) -> Self {
        ImageOp::Rescale {
            source: Box::new(self),
            expression: expression.into(),
            range,
        }
    }

    pub fn normalized_difference(self, a: impl Into<String>, b: impl Into<String>) -> Self {
        ImageOp::NormalizedDifference {
            source: Box::new(self),
            bands: [a.into(), b.into()],
        }
    }

    pub fn min_of(sources: Vec<ImageOp>) -> Self {
        ImageOp::Min { sources }
    }

    pub fn greater_than(self, threshold: f64) -> Self {
        ImageOp::GreaterThan {
            source: Box::new(self),
            threshold,
        }
    }

    pub fn at_most(self, threshold: f64) -> Self {
        ImageOp::AtMost {
            source: Box::new(self),
            threshold,
        }
    }

    pub fn update_mask(self, mask: ImageOp) -> Self {
        ImageOp::UpdateMask {
            source: Box::new(self),
            mask: Box::new(mask),
        }
    }

    pub fn rgb_to_hsv(self) -> Self {
        ImageOp::RgbToHsv {
            source: Box::new(self),
        }
    }

    pub fn hsv_to_rgb(self) -> Self {
        ImageOp::HsvToRgb {
            source: Box::new(self),
        }
    }

    pub fn concat(sources: Vec<ImageOp>) -> Self {
        ImageOp::Concat { sources }
    }

    pub fn clip(self, footprint: Footprint) -> Self {
        ImageOp::Clip {
            source: Box::new(self),
            footprint,
        }
    }
}
