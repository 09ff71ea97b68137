//! Local geodetic projection and great-circle helpers.
//!
//! The local projection is equirectangular, anchored at an origin point
//! (usually the emplacement). Accurate enough for mortar ranges.

use fireplot_core::constants::{EARTH_RADIUS_M, METERS_PER_DEGREE};
use fireplot_core::types::{GeoPosition, Position};

/// Equirectangular projection anchored at an origin point.
///
/// The origin maps to local (0, 0). x = East, y = North, z = Up.
#[derive(Debug, Clone)]
pub struct GeoProjection {
    origin: GeoPosition,
    /// Cached cos(origin latitude) for longitude scaling.
    cos_origin_lat: f64,
}

impl GeoProjection {
    /// Create a projection anchored at `origin`.
    pub fn new(origin: GeoPosition) -> Self {
        Self {
            origin,
            cos_origin_lat: origin.lat.to_radians().cos(),
        }
    }

    /// Convert lat/lon + elevation to a local position.
    pub fn to_local(&self, geo: &GeoPosition, elevation: f64) -> Position {
        let x = (geo.lon - self.origin.lon) * self.lon_scale();
        let y = (geo.lat - self.origin.lat) * METERS_PER_DEGREE;
        Position::new(x, y, elevation)
    }

    /// Convert a local position back to lat/lon and elevation.
    pub fn to_geo(&self, pos: &Position) -> (GeoPosition, f64) {
        let lon = self.origin.lon + pos.x / self.lon_scale();
        let lat = self.origin.lat + pos.y / METERS_PER_DEGREE;
        (GeoPosition::new(lat, lon), pos.z)
    }

    pub fn origin(&self) -> GeoPosition {
        self.origin
    }

    /// Meters per degree of longitude at the origin latitude.
    pub fn lon_scale(&self) -> f64 {
        METERS_PER_DEGREE * self.cos_origin_lat
    }
}

/// Great-circle initial bearing from `from` to `to`, degrees in [0, 360).
pub fn initial_bearing(from: &GeoPosition, to: &GeoPosition) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlon = (to.lon - from.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Haversine distance in meters.
pub fn haversine_distance(a: &GeoPosition, b: &GeoPosition) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Wrap an angle in degrees into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}
