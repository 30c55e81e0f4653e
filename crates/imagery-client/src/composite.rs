//! Cloud-filtered temporal compositing.

use truth_common::{Footprint, SearchWindow};

use crate::cloud::{pixel_cloud_score, CLOUD_MASK_THRESHOLD};
use crate::ops::ImageOp;

/// Build a cloud-free composite over a date window and footprint.
///
/// Every intersecting scene has pixels above the cloud threshold masked
/// out, then the stack is reduced with a pixelwise minimum, clipped to the
/// footprint. Temporal redundancy suppresses transient cloud; pixels cloudy
/// in every scene stay unresolved, which is acceptable degraded output
/// rather than an error.
pub fn cloud_free_composite(
    collection: &str,
    window: SearchWindow,
    footprint: &Footprint,
) -> ImageOp {
    let per_scene = ImageOp::MappedScene
        .update_mask(pixel_cloud_score(&ImageOp::MappedScene).at_most(CLOUD_MASK_THRESHOLD));

    ImageOp::StackMin {
        collection: collection.to_string(),
        window,
        footprint: *footprint,
        per_scene: Box::new(per_scene),
    }
    .clip(*footprint)
}
