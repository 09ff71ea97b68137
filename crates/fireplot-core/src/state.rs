//! Frame snapshot: everything a renderer needs to draw one frame.

use serde::{Deserialize, Serialize};

use crate::enums::{AngleUnit, DeploymentMode};
use crate::events::Feedback;
use crate::types::{EmplacementId, MapPosition, MarkerHandle, TileAddress};

/// A firing solution from one emplacement to one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiringSolution {
    /// Horizontal distance to the target (meters, or map pixels in raster mode).
    pub distance: f64,
    /// Straight-line distance including the height difference.
    pub slant_distance: f64,
    /// Target elevation minus emplacement elevation (meters).
    pub height_difference: f64,
    /// Bearing to the target in degrees, [0, 360).
    pub azimuth: f64,
    /// Barrel elevation in `angle_unit`.
    pub elevation_angle: f64,
    pub angle_unit: AngleUnit,
    /// Configured muzzle velocity for the charge, if any (m/s).
    pub muzzle_velocity: Option<f64>,
}

/// Current view transform as plain numbers (screen = map * scale + translate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformView {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

/// An emplacement marker for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmplacementView {
    pub id: EmplacementId,
    pub map: MapPosition,
    pub screen_x: f64,
    pub screen_y: f64,
    /// Elevation in meters (0 when no terrain data).
    pub elevation: f64,
    pub has_elevation_data: bool,
    /// Radius of the maximum-range ring in screen pixels.
    pub range_ring_px: f64,
    pub selected: bool,
    pub marker: Option<MarkerHandle>,
}

/// The designated target for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetView {
    pub map: MapPosition,
    pub screen_x: f64,
    pub screen_y: f64,
    pub elevation: f64,
}

/// The solution together with the emplacement that fires it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolutionView {
    pub emplacement: EmplacementId,
    pub solution: FiringSolution,
}

/// Complete drawable state produced once per frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub mode: DeploymentMode,
    pub transform: TransformView,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Zoom level of the tiles in `visible_tiles`.
    pub zoom: u8,
    pub visible_tiles: Vec<TileAddress>,
    pub emplacements: Vec<EmplacementView>,
    pub selected: Option<EmplacementId>,
    pub target: Option<TargetView>,
    pub solution: Option<SolutionView>,
    /// Feedback accumulated since the previous snapshot.
    pub feedback: Vec<Feedback>,
}
