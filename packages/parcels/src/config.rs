//! Configuration for the parcel index.
//!
//! The source file path resolves from an explicit override (env var or
//! config field) or a short list of conventional locations tried in
//! order. Everything else is a tuning knob with a sensible default.

use std::path::PathBuf;

/// Environment variable overriding the parcel `GeoJSON` path.
pub const PARCELS_PATH_ENV: &str = "ZONING_MAP_PARCELS_PATH";

/// Grid cell edge length in degrees (~1.1 km at the equator).
///
/// Balances candidate-list length against cell count: smaller cells mean
/// more cells per buffer query, larger cells mean more false-positive
/// candidates per cell.
pub const DEFAULT_CELL_SIZE_DEGREES: f64 = 0.01;

/// Vertex count for the buffer-query disk approximation.
pub const DEFAULT_DISK_SEGMENTS: usize = 24;

/// Cap on buffer query results. Bounds response size against dense
/// urban parcel fabrics when the radius far exceeds the intended
/// "notice radius" use case.
pub const DEFAULT_MAX_BUFFER_RESULTS: usize = 500;

/// Cap on text search results.
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 20;

/// Jurisdiction label used when no attribute resolves one.
pub const DEFAULT_JURISDICTION_FALLBACK: &str = "Palm Beach County (unincorporated)";

/// Tunable settings for loading and querying the parcel index.
#[derive(Debug, Clone)]
pub struct ParcelsConfig {
    /// Explicit source file path; checked before `candidate_paths`.
    pub source_path: Option<PathBuf>,
    /// Conventional locations tried in order when no override is set.
    pub candidate_paths: Vec<PathBuf>,
    /// Grid cell edge length in degrees.
    pub cell_size_degrees: f64,
    /// Vertex count for the buffer disk polygon.
    pub disk_segments: usize,
    /// Maximum parcels returned by a buffer query.
    pub max_buffer_results: usize,
    /// Maximum parcels returned by a text search.
    pub max_search_results: usize,
    /// Jurisdiction label when no attribute resolves one.
    pub jurisdiction_fallback: String,
}

impl Default for ParcelsConfig {
    fn default() -> Self {
        Self {
            source_path: None,
            candidate_paths: vec![
                PathBuf::from("data/parcels_enriched.geojson"),
                PathBuf::from("server/data/parcels_enriched.geojson"),
                PathBuf::from("data/parcels_enriched.json"),
                PathBuf::from("server/data/parcels_enriched.json"),
            ],
            cell_size_degrees: DEFAULT_CELL_SIZE_DEGREES,
            disk_segments: DEFAULT_DISK_SEGMENTS,
            max_buffer_results: DEFAULT_MAX_BUFFER_RESULTS,
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            jurisdiction_fallback: DEFAULT_JURISDICTION_FALLBACK.to_string(),
        }
    }
}

impl ParcelsConfig {
    /// Builds the default config with the path override read from
    /// [`PARCELS_PATH_ENV`].
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            source_path: std::env::var(PARCELS_PATH_ENV).ok().map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Returns a copy with an explicit source path.
    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_candidate_paths() {
        let config = ParcelsConfig::default();
        assert!(config.source_path.is_none());
        assert!(!config.candidate_paths.is_empty());
    }

    #[test]
    fn with_source_path_sets_override() {
        let config = ParcelsConfig::default().with_source_path("/tmp/parcels.geojson");
        assert_eq!(
            config.source_path,
            Some(PathBuf::from("/tmp/parcels.geojson"))
        );
    }
}
