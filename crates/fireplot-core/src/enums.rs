//! Enumeration types used throughout the engine.

use serde::{Deserialize, Serialize};

use crate::constants::MILS_PER_CIRCLE;

/// Which coordinate frame the surrounding UI works in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentMode {
    /// Flat raster: positions are map pixels, offsets used directly.
    #[default]
    Raster,
    /// WGS84 lat/lon with a local equirectangular projection.
    Geodetic,
}

/// Unit of the reported elevation angle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Mils,
    Degrees,
}

impl AngleUnit {
    /// Convert a value in this unit to degrees.
    pub fn to_degrees(self, value: f64) -> f64 {
        match self {
            AngleUnit::Mils => value * 360.0 / MILS_PER_CIRCLE,
            AngleUnit::Degrees => value,
        }
    }

    /// Short display suffix.
    pub fn suffix(self) -> &'static str {
        match self {
            AngleUnit::Mils => "mil",
            AngleUnit::Degrees => "°",
        }
    }
}

/// What happens to the current solution when a target tap has no emplacement in range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutOfRangePolicy {
    /// Leave the previous solution and target on screen.
    #[default]
    KeepPrevious,
    /// Drop the previous solution and target.
    Clear,
}

/// Pixel layout of a decoded tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Three-channel color (map imagery).
    Rgb,
    /// Single-channel grayscale (heightmap).
    Gray,
}
