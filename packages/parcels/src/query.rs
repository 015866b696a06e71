//! Point, buffer, and text query engines over the grid index.
//!
//! [`ParcelIndex`] owns the feature arena, bounding-box cache, and grid.
//! It is built once at process startup and shared immutably across
//! request handlers: nothing is mutated after the build, so concurrent
//! reads need no locking.

use geo::{BoundingRect, Contains, Intersects, Point};
use zoning_map_parcels_models::{BoundingBox, BufferResult, IndexStats, LatLng, ParcelRecord};

use crate::config::ParcelsConfig;
use crate::geometry::disk_polygon;
use crate::grid::GridIndex;
use crate::loader::{self, ParcelFeature};
use crate::{ParcelsError, normalize};

/// The parcel spatial index service.
///
/// Candidate selection goes through the grid; every candidate is then
/// verified with an exact geometry test, so a feature whose bounding box
/// overlaps a query cell but whose polygon does not cover the query area
/// is correctly rejected.
pub struct ParcelIndex {
    features: Vec<ParcelFeature>,
    grid: GridIndex,
    config: ParcelsConfig,
}

impl ParcelIndex {
    /// Resolves the source path, loads the feature store, and builds the
    /// grid index.
    ///
    /// # Errors
    ///
    /// Returns [`ParcelsError::DataUnavailable`] (listing every path
    /// tried) when the source file is missing, or an I/O / parse error
    /// when it cannot be read.
    pub fn from_config(config: ParcelsConfig) -> Result<Self, ParcelsError> {
        let path = loader::resolve_source_path(&config)?;
        let features = loader::load_features(&path)?;
        Ok(Self::from_features(features, config))
    }

    /// Builds the index from an already-loaded feature arena.
    #[must_use]
    pub fn from_features(features: Vec<ParcelFeature>, config: ParcelsConfig) -> Self {
        let grid = GridIndex::build(&features, config.cell_size_degrees);
        Self {
            features,
            grid,
            config,
        }
    }

    /// Build-time statistics, including the malformed-geometry count.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            feature_count: self.features.len(),
            indexed_count: self.features.len() - self.grid.skipped_count(),
            skipped_malformed: self.grid.skipped_count(),
            cell_count: self.grid.cell_count(),
            cell_size_degrees: self.grid.cell_size(),
        }
    }

    /// Finds the parcel containing `(lat, lng)`.
    ///
    /// Consults only the owning grid cell, pre-filters candidates by
    /// bounding box, then runs the exact point-in-polygon test (holes
    /// honored: a point inside a hole ring is outside the parcel).
    /// First match in stored order wins, which is deterministic across
    /// rebuilds of the same source file. `Ok(None)` means no parcel
    /// contains the point.
    ///
    /// # Errors
    ///
    /// Returns [`ParcelsError::InvalidQuery`] for non-finite or
    /// out-of-range coordinates.
    pub fn query_point(&self, lat: f64, lng: f64) -> Result<Option<ParcelRecord>, ParcelsError> {
        validate_coordinates(lat, lng)?;

        let point = Point::new(lng, lat);

        for &candidate in self.grid.candidates_for_point(lng, lat) {
            let index = candidate as usize;
            let Some(bbox) = self.grid.bbox(index) else {
                continue;
            };
            if !bbox.contains_point(lng, lat) {
                continue;
            }

            let feature = &self.features[index];
            if let Some(geometry) = &feature.geometry {
                if geometry.contains(&point) {
                    return Ok(Some(normalize::normalize(feature, &self.config)));
                }
            }
        }

        Ok(None)
    }

    /// Finds every parcel intersecting a disk of `radius_feet` around
    /// `(lat, lng)`. Boundary contact counts as intersecting.
    ///
    /// The disk is a fixed-vertex planar approximation (see
    /// [`disk_polygon`]). Candidates come from every grid cell the
    /// disk's bounding box spans, de-duplicated, bbox-pre-filtered, then
    /// verified with the exact intersection test. Results are capped at
    /// the configured maximum to bound response size.
    ///
    /// # Errors
    ///
    /// Returns [`ParcelsError::InvalidQuery`] for invalid coordinates or
    /// a non-positive / non-finite radius.
    pub fn query_buffer(
        &self,
        lat: f64,
        lng: f64,
        radius_feet: f64,
    ) -> Result<BufferResult, ParcelsError> {
        validate_coordinates(lat, lng)?;
        if !radius_feet.is_finite() || radius_feet <= 0.0 {
            return Err(ParcelsError::InvalidQuery {
                message: format!("radiusFeet must be a positive number, got {radius_feet}"),
            });
        }

        let disk = disk_polygon(lat, lng, radius_feet, self.config.disk_segments);
        let mut parcels = Vec::new();

        if let Some(rect) = disk.bounding_rect() {
            let disk_bbox =
                BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);

            for candidate in self.grid.candidates_in_bbox(&disk_bbox) {
                let index = candidate as usize;
                let Some(bbox) = self.grid.bbox(index) else {
                    continue;
                };
                if !bbox.intersects(&disk_bbox) {
                    continue;
                }

                let feature = &self.features[index];
                if let Some(geometry) = &feature.geometry {
                    if geometry.intersects(&disk) {
                        parcels.push(normalize::normalize(feature, &self.config));
                        if parcels.len() >= self.config.max_buffer_results {
                            log::warn!(
                                "Buffer query at ({lat}, {lng}) r={radius_feet}ft truncated at {} parcels",
                                parcels.len()
                            );
                            break;
                        }
                    }
                }
            }
        }

        Ok(BufferResult {
            center: LatLng { lat, lng },
            radius_feet,
            parcels,
        })
    }

    /// Finds parcels whose normalized identifier equals `id`
    /// (case-insensitive, whitespace-trimmed).
    #[must_use]
    pub fn search_by_id(&self, id: &str) -> Vec<ParcelRecord> {
        let needle = id.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.search_matching(|feature| normalize::normalized_id(feature) == needle)
    }

    /// Finds parcels whose normalized address contains `fragment`
    /// (case-insensitive substring).
    #[must_use]
    pub fn search_by_address(&self, fragment: &str) -> Vec<ParcelRecord> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.search_matching(|feature| normalize::normalized_address(feature).contains(&needle))
    }

    fn search_matching(&self, matches: impl Fn(&ParcelFeature) -> bool) -> Vec<ParcelRecord> {
        let mut results = Vec::new();
        for feature in &self.features {
            if matches(feature) {
                results.push(normalize::normalize(feature, &self.config));
                if results.len() >= self.config.max_search_results {
                    break;
                }
            }
        }
        results
    }
}

fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ParcelsError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(ParcelsError::InvalidQuery {
            message: format!("lat must be in [-90, 90], got {lat}"),
        });
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(ParcelsError::InvalidQuery {
            message: format!("lng must be in [-180, 180], got {lng}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPolygon, Polygon};
    use serde_json::json;

    fn feature(id: &str, polygon: Polygon<f64>) -> ParcelFeature {
        let serde_json::Value::Object(props) = json!({"parcel_id": id}) else {
            unreachable!()
        };
        ParcelFeature {
            geometry: Some(MultiPolygon(vec![polygon])),
            raw_geometry: None,
            properties: props,
        }
    }

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (max_x, min_y),
                (max_x, max_y),
                (min_x, max_y),
                (min_x, min_y),
            ]),
            vec![],
        )
    }

    /// P1 at (0,0)-(1,1), P2 at (10,10)-(11,11).
    fn two_square_index() -> ParcelIndex {
        ParcelIndex::from_features(
            vec![
                feature("P1", square(0.0, 0.0, 1.0, 1.0)),
                feature("P2", square(10.0, 10.0, 11.0, 11.0)),
            ],
            ParcelsConfig::default(),
        )
    }

    fn result_ids(result: &BufferResult) -> Vec<String> {
        result.parcels.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn point_inside_returns_the_parcel() {
        let index = two_square_index();
        let record = index.query_point(0.5, 0.5).expect("query").expect("hit");
        assert_eq!(record.id, "P1");
    }

    #[test]
    fn point_outside_everything_is_not_found() {
        let index = two_square_index();
        assert!(index.query_point(2.0, 2.0).expect("query").is_none());
    }

    #[test]
    fn point_in_hole_is_not_contained() {
        let outer = LineString::from(vec![
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (0.0, 4.0),
            (0.0, 0.0),
        ]);
        let hole = LineString::from(vec![
            (1.0, 1.0),
            (3.0, 1.0),
            (3.0, 3.0),
            (1.0, 3.0),
            (1.0, 1.0),
        ]);
        let index = ParcelIndex::from_features(
            vec![feature("DONUT", Polygon::new(outer, vec![hole]))],
            ParcelsConfig::default(),
        );

        // Inside the hole: outside the feature, despite the outer ring
        assert!(index.query_point(2.0, 2.0).expect("query").is_none());
        // Between outer ring and hole: inside
        let record = index.query_point(0.5, 0.5).expect("query").expect("hit");
        assert_eq!(record.id, "DONUT");
    }

    #[test]
    fn grid_candidate_outside_polygon_is_rejected() {
        // Triangle whose bbox covers the whole unit square
        let triangle = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        );
        let index = ParcelIndex::from_features(
            vec![feature("TRI", triangle)],
            ParcelsConfig::default(),
        );

        // (0.9, 0.9) is inside the bbox (a grid-level candidate) but
        // outside the triangle; the exact test must reject it
        assert!(index.query_point(0.9, 0.9).expect("query").is_none());
    }

    #[test]
    fn buffer_covering_square_finds_it() {
        let index = two_square_index();
        let result = index.query_buffer(0.5, 0.5, 100_000.0).expect("query");
        assert!(result_ids(&result).contains(&"P1".to_string()));
        assert!(!result_ids(&result).contains(&"P2".to_string()));
    }

    #[test]
    fn tiny_buffer_still_finds_enclosing_parcel() {
        // The disk is entirely inside P1, so it intersects it
        let index = two_square_index();
        let result = index.query_buffer(0.5, 0.5, 0.001).expect("query");
        assert_eq!(result_ids(&result), vec!["P1".to_string()]);
    }

    #[test]
    fn distant_parcel_never_appears_for_small_radii() {
        let index = two_square_index();
        for radius in [0.001, 100.0, 5000.0] {
            let result = index.query_buffer(0.5, 0.5, radius).expect("query");
            assert!(
                !result_ids(&result).contains(&"P2".to_string()),
                "P2 leaked in at radius {radius}"
            );
        }
    }

    #[test]
    fn buffer_is_monotonic_in_radius() {
        let index = ParcelIndex::from_features(
            vec![
                feature("A", square(0.0, 0.0, 1.0, 1.0)),
                feature("B", square(1.01, 0.0, 2.0, 1.0)),
                feature("C", square(0.0, 1.02, 1.0, 2.0)),
            ],
            ParcelsConfig::default(),
        );

        let mut previous: Vec<String> = Vec::new();
        for radius in [100.0, 5_000.0, 50_000.0, 500_000.0] {
            let ids = result_ids(&index.query_buffer(0.5, 0.5, radius).expect("query"));
            for id in &previous {
                assert!(ids.contains(id), "{id} vanished when radius grew to {radius}");
            }
            previous = ids;
        }
    }

    #[test]
    fn buffer_results_overlap_disk_bbox() {
        let index = two_square_index();
        let radius = 100_000.0;
        let result = index.query_buffer(0.5, 0.5, radius).expect("query");

        let disk = disk_polygon(0.5, 0.5, radius, ParcelsConfig::default().disk_segments);
        let rect = disk.bounding_rect().expect("bbox");
        let disk_bbox = BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);

        let known_bbox = |id: &str| match id {
            "P1" => BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            "P2" => BoundingBox::new(10.0, 10.0, 11.0, 11.0),
            other => panic!("unexpected parcel {other}"),
        };
        for parcel in &result.parcels {
            assert!(disk_bbox.intersects(&known_bbox(&parcel.id)), "parcel {}", parcel.id);
        }
    }

    #[test]
    fn buffer_caps_at_configured_maximum() {
        let config = ParcelsConfig {
            max_buffer_results: 2,
            ..ParcelsConfig::default()
        };
        let index = ParcelIndex::from_features(
            vec![
                feature("A", square(0.0, 0.0, 1.0, 1.0)),
                feature("B", square(0.0, 0.0, 1.0, 1.0)),
                feature("C", square(0.0, 0.0, 1.0, 1.0)),
            ],
            config,
        );

        let result = index.query_buffer(0.5, 0.5, 1000.0).expect("query");
        assert_eq!(result.parcels.len(), 2);
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        let index = two_square_index();
        assert!(matches!(
            index.query_point(91.0, 0.0),
            Err(ParcelsError::InvalidQuery { .. })
        ));
        assert!(matches!(
            index.query_point(0.0, -181.0),
            Err(ParcelsError::InvalidQuery { .. })
        ));
        assert!(matches!(
            index.query_point(f64::NAN, 0.0),
            Err(ParcelsError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn non_positive_radius_rejected() {
        let index = two_square_index();
        for radius in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    index.query_buffer(0.5, 0.5, radius),
                    Err(ParcelsError::InvalidQuery { .. })
                ),
                "radius {radius} was not rejected"
            );
        }
    }

    #[test]
    fn invalid_input_never_reports_not_found() {
        // Invalid input must be distinguishable from "nothing there"
        let index = two_square_index();
        let err = index.query_point(200.0, 0.0).expect_err("invalid");
        assert!(err.to_string().contains("lat"));
    }

    #[test]
    fn search_by_id_is_exact_and_case_insensitive() {
        let index = two_square_index();

        let hits = index.search_by_id(" p1 ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "P1");

        // Substring of an id is not a match
        assert!(index.search_by_id("P").is_empty());
    }

    #[test]
    fn search_by_address_matches_substring() {
        let serde_json::Value::Object(props) = json!({
            "parcel_id": "A1",
            "address": "11700 Okeechobee Blvd"
        }) else {
            unreachable!()
        };
        let index = ParcelIndex::from_features(
            vec![ParcelFeature {
                geometry: None,
                raw_geometry: None,
                properties: props,
            }],
            ParcelsConfig::default(),
        );

        assert_eq!(index.search_by_address("okeechobee").len(), 1);
        assert!(index.search_by_address("main st").is_empty());
        assert!(index.search_by_address("  ").is_empty());
    }

    #[test]
    fn search_caps_at_configured_maximum() {
        let config = ParcelsConfig {
            max_search_results: 3,
            ..ParcelsConfig::default()
        };
        let features = (0..10)
            .map(|i| {
                let serde_json::Value::Object(props) = json!({
                    "parcel_id": format!("X{i}"),
                    "address": format!("{i} Elm Street")
                }) else {
                    unreachable!()
                };
                ParcelFeature {
                    geometry: None,
                    raw_geometry: None,
                    properties: props,
                }
            })
            .collect();
        let index = ParcelIndex::from_features(features, config);

        assert_eq!(index.search_by_address("elm").len(), 3);
    }

    #[test]
    fn stats_reports_skipped_features() {
        let index = ParcelIndex::from_features(
            vec![
                feature("P1", square(0.0, 0.0, 1.0, 1.0)),
                ParcelFeature {
                    geometry: None,
                    raw_geometry: None,
                    properties: serde_json::Map::new(),
                },
            ],
            ParcelsConfig::default(),
        );

        let stats = index.stats();
        assert_eq!(stats.feature_count, 2);
        assert_eq!(stats.indexed_count, 1);
        assert_eq!(stats.skipped_malformed, 1);
        assert!(stats.cell_count > 0);
    }

    #[test]
    fn unindexed_feature_is_still_text_searchable() {
        let serde_json::Value::Object(props) = json!({"parcel_id": "GHOST"}) else {
            unreachable!()
        };
        let index = ParcelIndex::from_features(
            vec![ParcelFeature {
                geometry: None,
                raw_geometry: None,
                properties: props,
            }],
            ParcelsConfig::default(),
        );

        assert_eq!(index.search_by_id("ghost").len(), 1);
        // But unreachable spatially
        assert!(index.query_point(0.5, 0.5).expect("query").is_none());
    }
}
