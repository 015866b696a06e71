//! Unit conversions and the buffer-disk polygon approximation.

use std::f64::consts::TAU;

use geo::{LineString, Polygon};

/// Feet to meters.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Square meters per acre, used to derive acreage from geometry.
pub const SQ_METERS_PER_ACRE: f64 = 4_046.856_422_4;

/// Square feet per acre, used when a source carries raw square footage.
pub const SQ_FEET_PER_ACRE: f64 = 43_560.0;

/// Approximate meters per degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Converts a radius in feet to degrees of latitude.
#[must_use]
pub fn feet_to_degrees_lat(feet: f64) -> f64 {
    feet * METERS_PER_FOOT / METERS_PER_DEGREE_LAT
}

/// Builds the query disk as a regular polygon of `segments` vertices
/// centered on `(lng, lat)`.
///
/// Planar degree-space approximation: the latitude radius converts feet
/// through meters-per-degree, and the longitude radius is widened by
/// `1 / cos(lat)` so the disk stays round away from the equator. Accurate
/// at parcel-notice scale (hundreds of feet); not a geodesic buffer, and
/// increasingly wrong at very large radii or extreme latitudes.
#[must_use]
pub fn disk_polygon(lat: f64, lng: f64, radius_feet: f64, segments: usize) -> Polygon<f64> {
    let radius_lat = feet_to_degrees_lat(radius_feet);
    // Clamp so polar latitudes degrade instead of dividing by zero
    let radius_lng = radius_lat / lat.to_radians().cos().abs().max(1e-6);

    let mut ring = Vec::with_capacity(segments + 1);
    for i in 0..segments {
        #[allow(clippy::cast_precision_loss)]
        let theta = TAU * (i as f64) / (segments as f64);
        ring.push((
            radius_lng.mul_add(theta.cos(), lng),
            radius_lat.mul_add(theta.sin(), lat),
        ));
    }
    ring.push(ring[0]);

    Polygon::new(LineString::from(ring), vec![])
}
