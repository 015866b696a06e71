#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for parcel lookups.
//!
//! Loads a parcel `GeoJSON` file once at startup, builds a uniform-cell
//! grid index over per-feature bounding boxes, and answers three query
//! shapes fast enough for interactive use:
//!
//! - point containment ("which parcel is under this map click")
//! - buffer intersection ("which parcels fall inside a notice radius")
//! - identifier / address text search
//!
//! The grid maps `floor(coord / cell_size)` cell keys to lists of feature
//! indices whose bounding box overlaps the cell. A feature spanning
//! several cells appears in all of them; only integer indices are
//! duplicated, never feature data. Queries consult only the cells they
//! physically overlap, then verify survivors with exact geometry tests
//! from the `geo` crate.

pub mod config;
pub mod geometry;
pub mod grid;
pub mod loader;
pub mod normalize;
pub mod query;

use thiserror::Error;

pub use config::ParcelsConfig;
pub use query::ParcelIndex;
pub use zoning_map_parcels_models::{
    BoundingBox, BufferResult, IndexStats, LatLng, ParcelRecord,
};

/// Errors that can occur in the parcel index subsystem.
///
/// A feature with unusable geometry is not an error: it is skipped,
/// counted, and reported through [`IndexStats`] instead of failing the
/// whole load.
#[derive(Debug, Error)]
pub enum ParcelsError {
    /// The source file was not found at any candidate location.
    #[error("parcel dataset not found; tried:\n- {}", tried.join("\n- "))]
    DataUnavailable {
        /// Every path that was checked, in order.
        tried: Vec<String>,
    },

    /// The source file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The source file is not a parseable `GeoJSON` feature collection.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// Path that failed.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// The caller supplied out-of-range or non-finite query input.
    #[error("Invalid query input: {message}")]
    InvalidQuery {
        /// Which parameter was rejected and why.
        message: String,
    },
}
