#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the parcel spatial index.
//!
//! These types cross the boundary between the index core and the API
//! layer. They are serialized to JSON for the REST API, so field names
//! follow the camelCase contract the frontend expects.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in lng/lat degree space.
///
/// Invariant: `min_x <= max_x` and `min_y <= max_y`. A degenerate
/// (point) geometry produces a box with zero width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Western longitude bound.
    pub min_x: f64,
    /// Southern latitude bound.
    pub min_y: f64,
    /// Eastern longitude bound.
    pub max_x: f64,
    /// Northern latitude bound.
    pub max_y: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given bounds.
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Whether this box overlaps `other`, boundary contact included.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.min_x > other.max_x
            || self.max_x < other.min_x
            || self.min_y > other.max_y
            || self.max_y < other.min_y)
    }

    /// Whether the point `(x, y)` lies inside or on this box.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// A geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// A parcel in the canonical shape the API returns.
///
/// Produced by the normalizer from a source feature's raw attribute bag.
/// Construction never fails: every field has a defined fallback, so even
/// an empty attribute bag yields a well-formed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelRecord {
    /// Parcel identifier (PCN/folio). Empty when the source has no
    /// recognizable identifier field.
    pub id: String,
    /// Situs address, or a `"Parcel {id}"` placeholder.
    pub address: String,
    /// Owner name, empty when unknown.
    pub owner: String,
    /// Governing jurisdiction; falls back to the configured label.
    pub jurisdiction: String,
    /// Zoning district code.
    pub zoning: String,
    /// Future land use code.
    pub flu: String,
    /// Parcel area in acres, when derivable.
    pub area_acres: Option<f64>,
    /// Representative point latitude (attribute or centroid).
    pub lat: Option<f64>,
    /// Representative point longitude (attribute or centroid).
    pub lng: Option<f64>,
    /// Original source geometry, echoed through for map display.
    pub geometry: Option<geojson::Geometry>,
}

/// Result envelope for a buffer (notice-radius) query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferResult {
    /// Query center.
    pub center: LatLng,
    /// Query radius in feet.
    pub radius_feet: f64,
    /// All parcels whose geometry intersects the query disk.
    pub parcels: Vec<ParcelRecord>,
}

/// Build-time statistics for the spatial index.
///
/// `skipped_malformed` makes data-quality regressions in the source file
/// observable through the health endpoint instead of only in logs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Total features in the source file.
    pub feature_count: usize,
    /// Features reachable by spatial queries.
    pub indexed_count: usize,
    /// Features skipped because their geometry could not be indexed.
    pub skipped_malformed: usize,
    /// Number of populated grid cells.
    pub cell_count: usize,
    /// Grid cell edge length in degrees.
    pub cell_size_degrees: f64,
}
