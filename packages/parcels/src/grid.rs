//! Bounding-box cache and uniform-cell grid index.
//!
//! The grid maps integer cell keys `(floor(x / cell), floor(y / cell))`
//! to the indices of every feature whose bounding box overlaps that
//! cell. A feature spanning several cells is listed in all of them, so a
//! query only ever consults the cells it physically overlaps. Per-cell
//! lists follow feature array order, which is what makes "first match"
//! point lookups reproducible across rebuilds.

use std::collections::{BTreeMap, BTreeSet};

use geo::BoundingRect;
use zoning_map_parcels_models::BoundingBox;

use crate::loader::ParcelFeature;

/// Grid-bucket spatial index over feature bounding boxes.
///
/// Built once, read-only afterwards. Holds only integer indices into the
/// feature arena; feature data is never duplicated across cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GridIndex {
    cell_size: f64,
    /// Per-feature bounding box, same index as the arena. `None` marks a
    /// feature whose geometry could not be indexed.
    bboxes: Vec<Option<BoundingBox>>,
    cells: BTreeMap<(i64, i64), Vec<u32>>,
    skipped: usize,
}

impl GridIndex {
    /// Builds the bounding-box cache and grid from the feature arena.
    ///
    /// Features without a computable bounding box get a `None` slot and
    /// are skipped: one bad polygon must not abort indexing the other
    /// several hundred thousand.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(features: &[ParcelFeature], cell_size: f64) -> Self {
        let mut bboxes = Vec::with_capacity(features.len());
        let mut cells: BTreeMap<(i64, i64), Vec<u32>> = BTreeMap::new();
        let mut skipped = 0usize;

        for (i, feature) in features.iter().enumerate() {
            let bbox = feature
                .geometry
                .as_ref()
                .and_then(|mp| mp.bounding_rect())
                .map(|rect| {
                    BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
                });

            let Some(bbox) = bbox else {
                bboxes.push(None);
                skipped += 1;
                continue;
            };

            let (x0, y0) = Self::cell_key(bbox.min_x, bbox.min_y, cell_size);
            let (x1, y1) = Self::cell_key(bbox.max_x, bbox.max_y, cell_size);
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    cells.entry((cx, cy)).or_default().push(i as u32);
                }
            }

            bboxes.push(Some(bbox));
        }

        if skipped > 0 {
            log::warn!("Grid index: skipped {skipped} features with unusable geometry");
        }
        log::info!(
            "Grid index: {} features across {} cells (cell size {cell_size}\u{b0})",
            features.len() - skipped,
            cells.len()
        );

        Self {
            cell_size,
            bboxes,
            cells,
            skipped,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_key(x: f64, y: f64, cell_size: f64) -> (i64, i64) {
        ((x / cell_size).floor() as i64, (y / cell_size).floor() as i64)
    }

    /// Cached bounding box for a feature index.
    #[must_use]
    pub fn bbox(&self, index: usize) -> Option<&BoundingBox> {
        self.bboxes.get(index).and_then(Option::as_ref)
    }

    /// Candidate feature indices for the cell containing `(lng, lat)`.
    ///
    /// An unpopulated cell yields an empty slice: a valid "nothing
    /// there", not an error.
    #[must_use]
    pub fn candidates_for_point(&self, lng: f64, lat: f64) -> &[u32] {
        self.cells
            .get(&Self::cell_key(lng, lat, self.cell_size))
            .map_or(&[], Vec::as_slice)
    }

    /// De-duplicated candidate indices for every cell `bbox` spans, in
    /// feature array order.
    #[must_use]
    pub fn candidates_in_bbox(&self, bbox: &BoundingBox) -> Vec<u32> {
        let (x0, y0) = Self::cell_key(bbox.min_x, bbox.min_y, self.cell_size);
        let (x1, y1) = Self::cell_key(bbox.max_x, bbox.max_y, self.cell_size);

        let mut unique = BTreeSet::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(indices) = self.cells.get(&(cx, cy)) {
                    unique.extend(indices.iter().copied());
                }
            }
        }

        unique.into_iter().collect()
    }

    /// Number of populated grid cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of features excluded for unusable geometry.
    #[must_use]
    pub const fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Grid cell edge length in degrees.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPolygon, Polygon};

    fn square_feature(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> ParcelFeature {
        let ring = LineString::from(vec![
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (min_x, min_y),
        ]);
        ParcelFeature {
            geometry: Some(MultiPolygon(vec![Polygon::new(ring, vec![])])),
            raw_geometry: None,
            properties: serde_json::Map::new(),
        }
    }

    fn broken_feature() -> ParcelFeature {
        ParcelFeature {
            geometry: None,
            raw_geometry: None,
            properties: serde_json::Map::new(),
        }
    }

    #[test]
    fn feature_appears_in_every_spanned_cell() {
        // Spans a 3x3 cell block at cell size 0.01
        let features = vec![square_feature(0.005, 0.005, 0.025, 0.025)];
        let grid = GridIndex::build(&features, 0.01);

        assert_eq!(grid.cell_count(), 9);
        for cx in 0..3 {
            for cy in 0..3 {
                let lng = f64::from(cx).mul_add(0.01, 0.005);
                let lat = f64::from(cy).mul_add(0.01, 0.005);
                assert_eq!(grid.candidates_for_point(lng, lat), &[0]);
            }
        }
    }

    #[test]
    fn unpopulated_cell_returns_empty() {
        let features = vec![square_feature(0.0, 0.0, 0.005, 0.005)];
        let grid = GridIndex::build(&features, 0.01);

        assert!(grid.candidates_for_point(5.0, 5.0).is_empty());
    }

    #[test]
    fn malformed_geometry_skipped_and_counted() {
        let features = vec![
            square_feature(0.0, 0.0, 0.005, 0.005),
            broken_feature(),
            square_feature(0.02, 0.02, 0.025, 0.025),
        ];
        let grid = GridIndex::build(&features, 0.01);

        assert_eq!(grid.skipped_count(), 1);
        assert!(grid.bbox(1).is_none());
        assert!(grid.bbox(0).is_some());
        assert!(grid.bbox(2).is_some());
        // The broken feature is unreachable by spatial queries
        assert_eq!(grid.candidates_for_point(0.001, 0.001), &[0]);
    }

    #[test]
    fn per_cell_order_follows_feature_order() {
        let features = vec![
            square_feature(0.001, 0.001, 0.004, 0.004),
            square_feature(0.002, 0.002, 0.005, 0.005),
            square_feature(0.003, 0.003, 0.006, 0.006),
        ];
        let grid = GridIndex::build(&features, 0.01);

        assert_eq!(grid.candidates_for_point(0.003, 0.003), &[0, 1, 2]);
    }

    #[test]
    fn candidates_in_bbox_deduplicates_spanning_features() {
        // One feature spanning many cells must appear once in the union
        let features = vec![square_feature(0.0, 0.0, 0.05, 0.05)];
        let grid = GridIndex::build(&features, 0.01);

        let query = BoundingBox::new(0.0, 0.0, 0.05, 0.05);
        assert_eq!(grid.candidates_in_bbox(&query), vec![0]);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let features = vec![
            square_feature(0.0, 0.0, 0.025, 0.025),
            broken_feature(),
            square_feature(-0.01, -0.01, 0.005, 0.005),
            square_feature(10.0, 10.0, 10.001, 10.001),
        ];

        let a = GridIndex::build(&features, 0.01);
        let b = GridIndex::build(&features, 0.01);
        assert_eq!(a, b);
    }

    #[test]
    fn negative_coordinates_floor_correctly() {
        // floor(-0.005 / 0.01) = -1, not 0
        let features = vec![square_feature(-0.005, -0.005, -0.001, -0.001)];
        let grid = GridIndex::build(&features, 0.01);

        assert_eq!(grid.candidates_for_point(-0.002, -0.002), &[0]);
        assert!(grid.candidates_for_point(0.002, 0.002).is_empty());
    }
}
