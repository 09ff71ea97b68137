//! Coordinate frames the solver can work in.
//!
//! A frame knows how to turn two of its points into a planar (east, north)
//! offset, an azimuth and a hit-test distance, and how its points relate to
//! map pixels. The solver itself only sees offsets and elevations.

use std::fmt::Debug;

use glam::DVec2;

use fireplot_core::constants::METERS_PER_DEGREE;
use fireplot_core::enums::DeploymentMode;
use fireplot_core::types::{GeoPosition, MapPosition};
use fireplot_terrain::projection::{haversine_distance, initial_bearing, normalize_degrees};
use fireplot_terrain::{GeoProjection, TilePyramid};

/// A coordinate frame for emplacements and targets.
pub trait TargetFrame {
    type Point: Copy + Debug + PartialEq;

    const MODE: DeploymentMode;

    /// Pyramid the map is displayed at.
    fn pyramid(&self) -> TilePyramid;

    /// (east, north) offset from `from` to `to` in range units.
    fn planar_offset(&self, from: &Self::Point, to: &Self::Point) -> DVec2;

    /// Azimuth from `from` to `to` in degrees, [0, 360).
    fn azimuth(&self, from: &Self::Point, to: &Self::Point) -> f64 {
        planar_azimuth(self.planar_offset(from, to))
    }

    /// Distance used for hit-testing, in range units.
    fn pick_distance(&self, a: &Self::Point, b: &Self::Point) -> f64;

    fn from_map(&self, pos: &MapPosition) -> Self::Point;

    fn to_map(&self, point: &Self::Point) -> MapPosition;

    /// Length in map pixels of `range` range units around `at`.
    fn range_in_map_pixels(&self, at: &Self::Point, range: f64) -> f64;
}

/// Azimuth of a planar (east, north) offset, degrees clockwise from north.
pub fn planar_azimuth(offset: DVec2) -> f64 {
    normalize_degrees(offset.x.atan2(offset.y).to_degrees())
}

/// Flat raster: points are map pixels and range units are pixels.
///
/// Map y grows downward, so north is -y.
#[derive(Debug, Clone, Copy)]
pub struct RasterFrame {
    pyramid: TilePyramid,
}

impl RasterFrame {
    pub fn new(pyramid: TilePyramid) -> Self {
        Self { pyramid }
    }
}

impl TargetFrame for RasterFrame {
    type Point = MapPosition;

    const MODE: DeploymentMode = DeploymentMode::Raster;

    fn pyramid(&self) -> TilePyramid {
        self.pyramid
    }

    fn planar_offset(&self, from: &MapPosition, to: &MapPosition) -> DVec2 {
        DVec2::new(to.x - from.x, from.y - to.y)
    }

    fn pick_distance(&self, a: &MapPosition, b: &MapPosition) -> f64 {
        a.distance_to(b)
    }

    fn from_map(&self, pos: &MapPosition) -> MapPosition {
        *pos
    }

    fn to_map(&self, point: &MapPosition) -> MapPosition {
        *point
    }

    fn range_in_map_pixels(&self, _at: &MapPosition, range: f64) -> f64 {
        range
    }
}

/// WGS84 lat/lon over a Web-Mercator tile pyramid; range units are meters.
///
/// Offsets use the local equirectangular projection anchored at the
/// emplacement, azimuths the great-circle initial bearing, and hit-testing
/// the haversine distance.
#[derive(Debug, Clone, Copy)]
pub struct GeodeticFrame {
    pyramid: TilePyramid,
}

impl GeodeticFrame {
    pub fn new(pyramid: TilePyramid) -> Self {
        Self { pyramid }
    }
}

impl TargetFrame for GeodeticFrame {
    type Point = GeoPosition;

    const MODE: DeploymentMode = DeploymentMode::Geodetic;

    fn pyramid(&self) -> TilePyramid {
        self.pyramid
    }

    fn planar_offset(&self, from: &GeoPosition, to: &GeoPosition) -> DVec2 {
        let local = GeoProjection::new(*from).to_local(to, 0.0);
        DVec2::new(local.x, local.y)
    }

    fn azimuth(&self, from: &GeoPosition, to: &GeoPosition) -> f64 {
        initial_bearing(from, to)
    }

    fn pick_distance(&self, a: &GeoPosition, b: &GeoPosition) -> f64 {
        haversine_distance(a, b)
    }

    fn from_map(&self, pos: &MapPosition) -> GeoPosition {
        self.pyramid.map_to_geo(pos)
    }

    fn to_map(&self, point: &GeoPosition) -> MapPosition {
        self.pyramid.geo_to_map(point)
    }

    fn range_in_map_pixels(&self, at: &GeoPosition, range: f64) -> f64 {
        let meters_per_pixel =
            METERS_PER_DEGREE * 360.0 * at.lat.to_radians().cos() / self.pyramid.map_size();
        if meters_per_pixel > 0.0 {
            range / meters_per_pixel
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_north_is_up() {
        let frame = RasterFrame::new(TilePyramid::new(2, 256));
        let from = MapPosition::new(500.0, 500.0);
        let north = frame.planar_offset(&from, &MapPosition::new(500.0, 400.0));
        assert_eq!(north, DVec2::new(0.0, 100.0));
        assert!(frame.azimuth(&from, &MapPosition::new(500.0, 400.0)).abs() < 1e-9);
        assert!((frame.azimuth(&from, &MapPosition::new(600.0, 500.0)) - 90.0).abs() < 1e-9);
        assert!((frame.azimuth(&from, &MapPosition::new(500.0, 600.0)) - 180.0).abs() < 1e-9);
        assert!((frame.azimuth(&from, &MapPosition::new(400.0, 500.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_geodetic_offset_matches_projection() {
        let frame = GeodeticFrame::new(TilePyramid::new(15, 256));
        let from = GeoPosition::new(48.0, 11.0);
        let to = GeoPosition::new(48.01, 11.0);
        let offset = frame.planar_offset(&from, &to);
        assert!(offset.x.abs() < 1e-6);
        assert!((offset.y - 0.01 * METERS_PER_DEGREE).abs() < 1e-6);
        assert!(frame.azimuth(&from, &to) < 1e-6);
    }

    #[test]
    fn test_geodetic_map_roundtrip() {
        let frame = GeodeticFrame::new(TilePyramid::new(12, 256));
        let geo = GeoPosition::new(-33.86, 151.21);
        let back = frame.from_map(&frame.to_map(&geo));
        assert!((back.lat - geo.lat).abs() < 1e-9 && (back.lon - geo.lon).abs() < 1e-9);
    }

    #[test]
    fn test_range_ring_pixels() {
        // Zoom 0, 256 px: one pixel spans 360/256 degrees at the equator
        let frame = GeodeticFrame::new(TilePyramid::new(0, 256));
        let px = frame.range_in_map_pixels(&GeoPosition::new(0.0, 0.0), METERS_PER_DEGREE * 360.0);
        assert!((px - 256.0).abs() < 1e-6, "got {px}");
        // Twice as many pixels per meter at 60°
        let px60 = frame.range_in_map_pixels(&GeoPosition::new(60.0, 0.0), METERS_PER_DEGREE * 360.0);
        assert!((px60 - 512.0).abs() < 1e-6, "got {px60}");

        let raster = RasterFrame::new(TilePyramid::new(0, 256));
        assert_eq!(raster.range_in_map_pixels(&MapPosition::default(), 1200.0), 1200.0);
    }
}
