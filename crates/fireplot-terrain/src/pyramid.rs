//! Zoom-pyramid addressing: map pixels, tiles, and Web-Mercator lat/lon.

use std::f64::consts::PI;

use fireplot_core::constants::{MAX_ZOOM, MERCATOR_MAX_LAT};
use fireplot_core::types::{GeoPosition, MapPosition, TileAddress};
use serde::{Deserialize, Serialize};

/// A single zoom level of a square tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePyramid {
    pub zoom: u8,
    pub tile_size: u32,
}

impl TilePyramid {
    pub fn new(zoom: u8, tile_size: u32) -> Self {
        Self { zoom, tile_size }
    }

    /// Whether the zoom is within `MAX_ZOOM` and tiles have pixels.
    pub fn is_supported(&self) -> bool {
        self.zoom <= MAX_ZOOM && self.tile_size > 0
    }

    /// Number of tiles along one side. Zero for unsupported zooms.
    pub fn tiles_per_side(&self) -> u64 {
        TileAddress::tiles_per_side(self.zoom)
    }

    /// Width (= height) of the whole map in pixels.
    pub fn map_size(&self) -> f64 {
        (self.tiles_per_side() * self.tile_size as u64) as f64
    }

    /// Resolve a map pixel to its tile and the pixel inside that tile.
    /// Returns None outside the map.
    pub fn locate(&self, pos: &MapPosition) -> Option<(TileAddress, u32, u32)> {
        let size = self.map_size();
        if !pos.is_within(size, size) {
            return None;
        }
        let ts = self.tile_size as u64;
        let xi = pos.x.floor() as u64;
        let yi = pos.y.floor() as u64;
        let address = TileAddress::new(self.zoom, (xi / ts) as u32, (yi / ts) as u32);
        Some((address, (xi % ts) as u32, (yi % ts) as u32))
    }

    /// Tiles intersecting the map-space rectangle `[min, max)`, column-major,
    /// clamped to the pyramid.
    pub fn tiles_covering(&self, min: MapPosition, max: MapPosition) -> Vec<TileAddress> {
        let size = self.map_size();
        if size <= 0.0 || max.x <= 0.0 || max.y <= 0.0 || min.x >= size || min.y >= size {
            return Vec::new();
        }
        let ts = self.tile_size as f64;
        let last = (self.tiles_per_side() - 1) as f64;
        let col_range = |lo: f64, hi: f64| {
            let a = (lo / ts).floor().clamp(0.0, last);
            // An edge exactly on a tile boundary does not reach the next tile
            let b = ((hi / ts).ceil() - 1.0).clamp(0.0, last).max(a);
            a as u32..=b as u32
        };

        let mut tiles = Vec::new();
        for col in col_range(min.x, max.x) {
            for row in col_range(min.y, max.y) {
                tiles.push(TileAddress::new(self.zoom, col, row));
            }
        }
        tiles
    }

    /// Web-Mercator projection of lat/lon to map pixels at this zoom.
    pub fn geo_to_map(&self, geo: &GeoPosition) -> MapPosition {
        let size = self.map_size();
        let lat = geo.lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
        let x = (geo.lon + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        MapPosition::new(x, y)
    }

    /// Inverse Web-Mercator: map pixels to lat/lon.
    pub fn map_to_geo(&self, pos: &MapPosition) -> GeoPosition {
        let size = self.map_size();
        let lon = pos.x / size * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * pos.y / size);
        let lat = n.sinh().atan().to_degrees();
        GeoPosition::new(lat, lon)
    }
}
