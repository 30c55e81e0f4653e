//! Client for the remote imagery analysis service.
//!
//! The service itself is an opaque collaborator: it can search a scene
//! catalog, evaluate image-operation trees, render thumbnails, and reduce
//! rasters to region statistics. Everything with algorithmic content (the
//! cloud-score heuristics, the compositing recipe, the HSV pan-sharpen)
//! is built client-side as an [`ImageOp`] tree and shipped to the service
//! for evaluation.

pub mod backend;
pub mod cloud;
pub mod composite;
pub mod ops;
pub mod search;
pub mod visualize;

pub use backend::{CatalogQuery, HttpImageryBackend, ImageryBackend, ImageryConfig, SceneRecord};
pub use cloud::{pixel_cloud_score, region_cloud_score, CLOUD_MASK_THRESHOLD};
pub use composite::cloud_free_composite;
pub use ops::ImageOp;
pub use search::find_nearest_scene;
pub use visualize::{pan_sharpen, RenderParams};
