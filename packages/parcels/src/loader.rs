//! Parcel feature store loading.
//!
//! Reads the source `GeoJSON` file once and produces the feature arena
//! every other component indexes into. Geometry is converted to
//! [`MultiPolygon`] up front; a feature whose geometry cannot be
//! converted keeps its attributes (it stays text-searchable) but is
//! excluded from spatial queries.

use std::path::{Path, PathBuf};

use geo::MultiPolygon;
use geojson::GeoJson;

use crate::ParcelsError;
use crate::config::ParcelsConfig;

/// One parcel feature in the arena.
///
/// Immutable after load. The raw attribute bag keeps whatever schema the
/// source extract used; the normalizer maps it to the canonical record.
#[derive(Debug, Clone)]
pub struct ParcelFeature {
    /// Parsed geometry, `None` when conversion failed.
    pub geometry: Option<MultiPolygon<f64>>,
    /// Original `GeoJSON` geometry, echoed through to API responses.
    pub raw_geometry: Option<geojson::Geometry>,
    /// Raw source attributes, schema not fixed across the dataset.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Resolves the source file path: explicit override first, then each
/// conventional candidate location in order.
///
/// # Errors
///
/// Returns [`ParcelsError::DataUnavailable`] listing every path tried
/// when none exists.
pub fn resolve_source_path(config: &ParcelsConfig) -> Result<PathBuf, ParcelsError> {
    let mut tried = Vec::new();

    let candidates = config
        .source_path
        .iter()
        .chain(config.candidate_paths.iter());

    for candidate in candidates {
        if candidate.exists() {
            return Ok(candidate.clone());
        }
        tried.push(candidate.display().to_string());
    }

    Err(ParcelsError::DataUnavailable { tried })
}

/// Reads and parses the parcel `FeatureCollection` at `path`.
///
/// Features with unconvertible geometry are kept with `geometry: None`
/// and logged; the grid builder counts them as skipped.
///
/// # Errors
///
/// Returns [`ParcelsError::Io`] if the file cannot be read, or
/// [`ParcelsError::Parse`] if it is not a `GeoJSON` feature collection.
pub fn load_features(path: &Path) -> Result<Vec<ParcelFeature>, ParcelsError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ParcelsError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let geojson: GeoJson = raw.parse().map_err(|e: geojson::Error| ParcelsError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(ParcelsError::Parse {
            path: path.display().to_string(),
            message: "root is not a FeatureCollection".to_string(),
        });
    };

    let mut features = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let raw_geometry = feature.geometry;

        let geometry = raw_geometry.as_ref().and_then(to_multipolygon);
        if geometry.is_none() {
            log::warn!("Feature {i}: geometry missing or not polygonal, excluded from index");
        }

        features.push(ParcelFeature {
            geometry,
            raw_geometry,
            properties,
        });
    }

    log::info!(
        "Loaded {} parcel features from {}",
        features.len(),
        path.display()
    );

    Ok(features)
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
