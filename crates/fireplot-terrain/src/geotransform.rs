//! Affine georeferencing for north-up elevation rasters.

use fireplot_core::types::GeoPosition;
use serde::{Deserialize, Serialize};

/// Maps raster cells to lat/lon. Rotation terms are assumed zero:
///
/// ```text
/// lon = origin_lon + col * pixel_width
/// lat = origin_lat + row * pixel_height   (pixel_height < 0 for north-up)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// Longitude of the upper-left corner of cell (0, 0).
    pub origin_lon: f64,
    /// Latitude of the upper-left corner of cell (0, 0).
    pub origin_lat: f64,
    /// Cell width in degrees of longitude.
    pub pixel_width: f64,
    /// Cell height in degrees of latitude, negative for north-up rasters.
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_lon: f64, origin_lat: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_lon,
            origin_lat,
            pixel_width,
            pixel_height,
        }
    }

    /// Build from GDAL-order coefficients
    /// `[origin_x, pixel_width, row_rot, origin_y, col_rot, pixel_height]`.
    /// Rotation terms are ignored.
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self::new(coeffs[0], coeffs[3], coeffs[1], coeffs[5])
    }

    /// Fractional (col, row) of a lat/lon. NaN when the transform is degenerate.
    pub fn geo_to_pixel(&self, geo: &GeoPosition) -> (f64, f64) {
        if self.pixel_width == 0.0 || self.pixel_height == 0.0 {
            return (f64::NAN, f64::NAN);
        }
        let col = (geo.lon - self.origin_lon) / self.pixel_width;
        let row = (geo.lat - self.origin_lat) / self.pixel_height;
        (col, row)
    }

    /// Lat/lon of the center of a cell.
    pub fn pixel_center(&self, col: usize, row: usize) -> GeoPosition {
        let lon = self.origin_lon + (col as f64 + 0.5) * self.pixel_width;
        let lat = self.origin_lat + (row as f64 + 0.5) * self.pixel_height;
        GeoPosition::new(lat, lon)
    }

    /// (south, west, north, east) bounds of a raster of the given size.
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let lon0 = self.origin_lon;
        let lon1 = self.origin_lon + width as f64 * self.pixel_width;
        let lat0 = self.origin_lat;
        let lat1 = self.origin_lat + height as f64 * self.pixel_height;
        (lat0.min(lat1), lon0.min(lon1), lat0.max(lat1), lon0.max(lon1))
    }
}
