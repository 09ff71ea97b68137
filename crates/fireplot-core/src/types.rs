//! Fundamental geometric and addressing types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_ZOOM;

/// 3D position in a local tangent plane (meters, Cartesian).
/// x = East, y = North, z = Up (elevation).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A point in map-pixel space at the active zoom level.
/// x grows to the east (right), y grows to the south (down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MapPosition {
    pub x: f64,
    pub y: f64,
}

impl MapPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean pixel distance.
    pub fn distance_to(&self, other: &MapPosition) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether the point lies inside a `width` × `height` map.
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0 && self.x < width && self.y >= 0.0 && self.y < height
    }
}

/// WGS84 geodetic position in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPosition {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Address of a tile in a zoom pyramid, top-origin (XYZ) row convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileAddress {
    pub zoom: u8,
    pub col: u32,
    pub row: u32,
}

impl TileAddress {
    pub fn new(zoom: u8, col: u32, row: u32) -> Self {
        Self { zoom, col, row }
    }

    /// Number of tiles along one side of the pyramid at `zoom`.
    /// Zero above `MAX_ZOOM`, so no address at such a zoom is valid.
    pub fn tiles_per_side(zoom: u8) -> u64 {
        if zoom > MAX_ZOOM {
            return 0;
        }
        1u64 << zoom
    }

    /// Whether the zoom is supported and column and row both lie in `[0, 2^zoom)`.
    pub fn is_valid(&self) -> bool {
        let n = Self::tiles_per_side(self.zoom);
        (self.col as u64) < n && (self.row as u64) < n
    }

    /// Row in the bottom-origin (TMS) convention used by the tile database.
    /// Only meaningful for valid addresses; saturates at 0 otherwise.
    pub fn tms_row(&self) -> u32 {
        let n = Self::tiles_per_side(self.zoom);
        u32::try_from(n.saturating_sub(1).saturating_sub(self.row as u64)).unwrap_or(0)
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.col, self.row)
    }
}

/// Stable identity of an emplacement within one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmplacementId(pub u32);

impl fmt::Display for EmplacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Opaque handle a renderer attaches to an emplacement marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerHandle(pub u64);
