//! Temporal catalog search.

use chrono::NaiveDate;
use tracing::{debug, instrument};

use truth_common::{Footprint, SearchWindow, TruthError, TruthResult};

use crate::backend::{CatalogQuery, ImageryBackend, SceneRecord};

/// Find the scene closest to `target_date`, searching backward by at most
/// `offset_days`.
///
/// Most recent capture wins. Scenes with identical capture timestamps are
/// ordered by ascending id, so selection is deterministic. Fails with
/// [`TruthError::NoScenesFound`] when the window yields nothing; callers
/// may retry with a larger window.
#[instrument(skip(backend, footprint), fields(collection = %collection))]
pub async fn find_nearest_scene(
    backend: &dyn ImageryBackend,
    collection: &str,
    footprint: &Footprint,
    target_date: NaiveDate,
    offset_days: i64,
) -> TruthResult<SceneRecord> {
    let window = SearchWindow::ending_at(target_date, offset_days);
    let query = CatalogQuery {
        collection: collection.to_string(),
        window,
        footprint: *footprint,
    };

    let mut scenes = backend.search_scenes(&query).await?;
    if scenes.is_empty() {
        return Err(TruthError::NoScenesFound {
            begin: window.begin,
            end: window.end,
        });
    }

    scenes.sort_by(|a, b| {
        b.captured_at
            .cmp(&a.captured_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    let chosen = scenes.swap_remove(0);
    debug!(scene = %chosen.id, captured_at = %chosen.captured_at, "Selected nearest scene");
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::ops::ImageOp;
    use crate::visualize::RenderParams;

    struct FixedCatalog {
        scenes: Vec<SceneRecord>,
    }

    #[async_trait]
    impl ImageryBackend for FixedCatalog {
        async fn search_scenes(&self, _query: &CatalogQuery) -> TruthResult<Vec<SceneRecord>> {
            Ok(self.scenes.clone())
        }

        async fn render_thumbnail(
            &self,
            _image: &ImageOp,
            _params: &RenderParams,
            _region: &Footprint,
        ) -> TruthResult<String> {
            unimplemented!("not used by search tests")
        }

        async fn region_mean(
            &self,
            _image: &ImageOp,
            _region: &Footprint,
            _scale_m: f64,
        ) -> TruthResult<f64> {
            unimplemented!("not used by search tests")
        }
    }

    fn scene(id: &str, y: i32, m: u32, d: u32) -> SceneRecord {
        SceneRecord {
            id: id.to_string(),
            captured_at: Utc.with_ymd_and_hms(y, m, d, 3, 21, 0).unwrap(),
        }
    }

    fn footprint() -> Footprint {
        Footprint::compute(101.1, 1.5, 500, 500).unwrap()
    }

    fn target() -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 9, 30).unwrap()
    }

    #[tokio::test]
    async fn test_latest_capture_wins() {
        let backend = FixedCatalog {
            scenes: vec![
                scene("older", 2014, 7, 2),
                scene("newest", 2014, 9, 11),
                scene("middle", 2014, 8, 20),
            ],
        };

        let found = find_nearest_scene(&backend, "L7", &footprint(), target(), 120)
            .await
            .unwrap();
        assert_eq!(found.id, "newest");
    }

    #[tokio::test]
    async fn test_tie_between_simultaneous_captures_is_deterministic() {
        let backend = FixedCatalog {
            scenes: vec![scene("b-scene", 2014, 9, 11), scene("a-scene", 2014, 9, 11)],
        };

        for _ in 0..3 {
            let found = find_nearest_scene(&backend, "L7", &footprint(), target(), 120)
                .await
                .unwrap();
            assert_eq!(found.id, "a-scene");
        }
    }

    #[tokio::test]
    async fn test_empty_window_is_no_scenes_found() {
        let backend = FixedCatalog { scenes: vec![] };

        let err = find_nearest_scene(&backend, "L7", &footprint(), target(), 120)
            .await
            .unwrap_err();
        match err {
            TruthError::NoScenesFound { begin, end } => {
                assert_eq!(end, target());
                assert_eq!(begin, NaiveDate::from_ymd_opt(2014, 6, 2).unwrap());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
