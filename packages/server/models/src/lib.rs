#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the zoning map server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the index-core types to allow independent evolution of
//! the API contract.

use serde::{Deserialize, Serialize};
use zoning_map_parcels_models::{IndexStats, ParcelRecord};

/// Health check response, including index data-quality counters so a
/// systematically broken source file is visible without reading logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is up.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Spatial index build statistics.
    pub index: IndexStats,
}

/// Query parameters for the parcel-by-point endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointQueryParams {
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lng: Option<f64>,
}

/// Query parameters for the buffer (notice-radius) endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferQueryParams {
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lng: Option<f64>,
    /// Radius in feet, required and positive.
    pub radius_feet: Option<f64>,
}

/// Query parameters for the search endpoint. Exactly one of `parcel`
/// or `address` is expected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryParams {
    /// Parcel identifier for an exact match.
    pub parcel: Option<String>,
    /// Address fragment for a substring match.
    pub address: Option<String>,
}

/// Response envelope for the parcel-by-point endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiParcelResponse {
    /// The matched parcel.
    pub parcel: ParcelRecord,
}

/// Response envelope for the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSearchResponse {
    /// Matched parcels, capped server-side.
    pub results: Vec<ParcelRecord>,
}
