//! Engine scenarios: gestures in, snapshots and feedback out.

use std::io::Cursor;
use std::path::PathBuf;

use fireplot_core::commands::{EngineCommand, GestureEvent};
use fireplot_core::enums::{AngleUnit, DeploymentMode, OutOfRangePolicy};
use fireplot_core::events::Feedback;
use fireplot_core::types::{EmplacementId, GeoPosition, MapPosition, MarkerHandle, TileAddress};
use fireplot_terrain::{Elevation, FlatTerrain, Result as TerrainResult, TerrainService, TilePyramid};

use crate::config::{EngineConfig, SolverProfile};
use crate::engine::TargetingEngine;
use crate::error::LimitReached;
use crate::frame::{GeodeticFrame, RasterFrame};

const EPS: f64 = 1e-9;

/// Ground rising eastward: 1 m per 10 map pixels.
struct EastSlope;

impl TerrainService<MapPosition> for EastSlope {
    fn lookup(&self, pos: &MapPosition) -> TerrainResult<Elevation> {
        Ok(Elevation::known(pos.x / 10.0))
    }
}

/// 1024×1024 map shown 1:1 in a 1024×1024 viewport, so screen == map.
fn raster_engine() -> TargetingEngine<RasterFrame, EastSlope> {
    let config = EngineConfig {
        viewport_width: 1024.0,
        viewport_height: 1024.0,
        ..Default::default()
    };
    TargetingEngine::new(config, RasterFrame::new(TilePyramid::new(2, 256)), EastSlope).unwrap()
}

fn double_tap(x: f64, y: f64) -> EngineCommand {
    GestureEvent::DoubleTap { x, y }.into()
}

fn tap(x: f64, y: f64) -> EngineCommand {
    GestureEvent::Tap { x, y }.into()
}

// ---- Placement ----

#[test]
fn test_double_tap_places_emplacement() {
    let mut engine = raster_engine();
    engine.handle(double_tap(300.0, 700.0));

    let snap = engine.frame();
    assert_eq!(snap.mode, DeploymentMode::Raster);
    assert_eq!(snap.emplacements.len(), 1);
    let e = &snap.emplacements[0];
    assert_eq!(e.map, MapPosition::new(300.0, 700.0));
    assert!((e.screen_x - 300.0).abs() < EPS && (e.screen_y - 700.0).abs() < EPS);
    assert!((e.elevation - 30.0).abs() < EPS);
    assert!(e.has_elevation_data);
    assert_eq!(e.range_ring_px, 1200.0);
    assert_eq!(
        snap.feedback,
        vec![Feedback::EmplacementPlaced {
            id: EmplacementId(0),
            elevation: e.elevation,
            has_elevation_data: true,
        }]
    );
}

#[test]
fn test_sixth_emplacement_rejected() {
    let mut engine = raster_engine();
    for i in 0..6 {
        engine.handle(double_tap(100.0 + i as f64 * 100.0, 500.0));
    }
    assert_eq!(engine.emplacement_count(), 5);

    let snap = engine.frame();
    assert_eq!(snap.emplacements.len(), 5);
    assert_eq!(snap.feedback.last(), Some(&Feedback::LimitReached { capacity: 5 }));
    assert_eq!(
        engine.place_emplacement(MapPosition::new(1.0, 1.0)),
        Err(LimitReached { capacity: 5 })
    );
}

#[test]
fn test_taps_outside_map_ignored() {
    // 1024 px map centered in a 2048 px viewport
    let config = EngineConfig {
        viewport_width: 2048.0,
        viewport_height: 2048.0,
        ..Default::default()
    };
    let mut engine =
        TargetingEngine::new(config, RasterFrame::new(TilePyramid::new(2, 256)), EastSlope).unwrap();

    engine.handle(double_tap(10.0, 10.0));
    engine.handle(tap(2000.0, 1000.0));
    assert_eq!(engine.emplacement_count(), 0);
    assert_eq!(engine.frame().feedback, vec![Feedback::OutsideMap, Feedback::OutsideMap]);

    engine.handle(double_tap(1024.0, 1024.0));
    assert_eq!(
        engine.emplacements().next().map(|e| e.position),
        Some(MapPosition::new(512.0, 512.0))
    );
}

// ---- Targeting ----

#[test]
fn test_target_tap_produces_solution() {
    let mut engine = raster_engine();
    engine.handle(double_tap(200.0, 800.0));
    engine.handle(tap(800.0, 800.0));

    let snap = engine.frame();
    let solution = snap.solution.expect("target in range");
    assert_eq!(solution.emplacement, EmplacementId(0));
    let s = solution.solution;
    assert!((s.distance - 600.0).abs() < EPS);
    assert!((s.azimuth - 90.0).abs() < EPS, "due east, got {}", s.azimuth);
    assert!((s.height_difference - 60.0).abs() < EPS, "80 m target over 20 m emplacement");
    assert_eq!(s.angle_unit, AngleUnit::Mils);
    assert!((900.0..=1500.0).contains(&s.elevation_angle));
    assert!(s.elevation_angle > 1200.0, "uphill shot above the level baseline");

    let target = snap.target.unwrap();
    assert_eq!(target.map, MapPosition::new(800.0, 800.0));
    assert!((target.elevation - 80.0).abs() < EPS);
    assert_eq!(snap.feedback.last(), Some(&Feedback::SolutionReady { id: EmplacementId(0) }));
}

#[test]
fn test_nearest_emplacement_fires() {
    let mut engine = raster_engine();
    engine.handle(double_tap(100.0, 100.0));
    engine.handle(double_tap(900.0, 900.0));
    engine.handle(tap(850.0, 700.0));
    assert_eq!(engine.solution().unwrap().emplacement, EmplacementId(1));
}

#[test]
fn test_level_shot_at_half_range() {
    let config = EngineConfig {
        raster: SolverProfile {
            max_range: 5000.0,
            ..SolverProfile::raster()
        },
        ..Default::default()
    };
    let frame = RasterFrame::new(TilePyramid::new(4, 256));
    let mut engine = TargetingEngine::new(config, frame, FlatTerrain { meters: 100.0 }).unwrap();

    engine.place_emplacement(MapPosition::new(100.0, 3000.0)).unwrap();
    let s = engine.designate_target(MapPosition::new(100.0, 500.0)).unwrap();
    assert_eq!(s.distance, 2500.0);
    assert_eq!(s.slant_distance, 2500.0);
    assert!(s.azimuth.abs() < EPS);
    assert!((s.elevation_angle - 1200.0).abs() < EPS);
}

#[test]
fn test_out_of_range_keeps_previous_solution() {
    let mut engine = raster_engine();
    engine.handle(double_tap(10.0, 10.0));
    engine.handle(tap(500.0, 10.0));
    let previous = engine.solution().unwrap();
    engine.frame();

    // ~1400 px away from the only emplacement
    engine.handle(tap(1000.0, 1010.0));
    let snap = engine.frame();
    assert_eq!(snap.solution, Some(previous));
    assert_eq!(snap.target.unwrap().map, MapPosition::new(500.0, 10.0));
    assert_eq!(snap.feedback.last(), Some(&Feedback::OutOfRange));
}

#[test]
fn test_no_emplacement_feedback() {
    let mut engine = raster_engine();
    engine.handle(tap(500.0, 500.0));
    let snap = engine.frame();
    assert!(snap.solution.is_none());
    assert!(snap.target.is_none());
    assert_eq!(snap.feedback, vec![Feedback::NoEmplacement]);
}

// ---- Selection and deletion ----

#[test]
fn test_tap_near_emplacement_selects_it() {
    let mut engine = raster_engine();
    engine.handle(double_tap(400.0, 400.0));
    engine.handle(tap(420.0, 410.0));

    let snap = engine.frame();
    assert_eq!(snap.selected, Some(EmplacementId(0)));
    assert!(snap.emplacements[0].selected);
    assert!(snap.solution.is_none(), "a selection tap is not a target tap");
    assert_eq!(snap.feedback.last(), Some(&Feedback::EmplacementSelected { id: EmplacementId(0) }));
}

#[test]
fn test_delete_selected_clears_its_solution() {
    let mut engine = raster_engine();
    engine.handle(double_tap(100.0, 500.0));
    engine.handle(double_tap(900.0, 500.0));
    engine.handle(tap(300.0, 500.0)); // solved by E0
    engine.handle(tap(100.0, 500.0)); // select E0
    engine.handle(EngineCommand::DeleteSelected);

    let snap = engine.frame();
    assert_eq!(snap.emplacements.len(), 1);
    assert_eq!(snap.emplacements[0].id, EmplacementId(1));
    assert!(snap.selected.is_none());
    assert!(snap.solution.is_none());
    assert!(snap.feedback.contains(&Feedback::EmplacementRemoved { id: EmplacementId(0) }));

    // Nothing selected any more: a second delete is a no-op
    engine.handle(EngineCommand::DeleteSelected);
    assert_eq!(engine.emplacement_count(), 1);
}

#[test]
fn test_deleting_other_emplacement_keeps_solution() {
    let mut engine = raster_engine();
    engine.handle(double_tap(100.0, 500.0));
    engine.handle(double_tap(900.0, 500.0));
    engine.handle(tap(300.0, 500.0));
    engine.handle(EngineCommand::DeleteEmplacement { id: EmplacementId(1) });
    engine.handle(EngineCommand::DeleteEmplacement { id: EmplacementId(42) });
    assert_eq!(engine.solution().unwrap().emplacement, EmplacementId(0));
    assert_eq!(engine.emplacement_count(), 1);
}

#[test]
fn test_reset_clears_everything() {
    let mut engine = raster_engine();
    engine.handle(double_tap(100.0, 500.0));
    engine.handle(tap(300.0, 500.0));
    engine.handle(EngineCommand::Reset);

    let snap = engine.frame();
    assert!(snap.emplacements.is_empty());
    assert!(snap.target.is_none());
    assert!(snap.solution.is_none());
    assert_eq!(snap.feedback.last(), Some(&Feedback::Reset));
}

#[test]
fn test_marker_handle_in_snapshot() {
    let mut engine = raster_engine();
    let id = engine.place_emplacement(MapPosition::new(50.0, 50.0)).unwrap();
    assert!(engine.attach_marker(id, MarkerHandle(77)));
    assert_eq!(engine.frame().emplacements[0].marker, Some(MarkerHandle(77)));
}

// ---- Viewport through gestures ----

#[test]
fn test_pinch_then_tap_resolves_through_transform() {
    let mut engine = raster_engine();
    engine.handle_all([
        GestureEvent::ScaleBegin.into(),
        GestureEvent::Scale {
            focus_x: 512.0,
            focus_y: 512.0,
            factor: 2.0,
        }
        .into(),
        GestureEvent::ScaleEnd.into(),
    ]);
    assert_eq!(engine.viewport().scale(), 2.0);

    engine.handle(double_tap(512.0, 512.0));
    engine.handle(double_tap(0.0, 0.0));
    let positions: Vec<MapPosition> = engine.emplacements().map(|e| e.position).collect();
    assert_eq!(positions, vec![MapPosition::new(512.0, 512.0), MapPosition::new(256.0, 256.0)]);

    let snap = engine.frame();
    assert_eq!(snap.transform.scale, 2.0);
    assert_eq!(snap.emplacements[0].range_ring_px, 2400.0);
    assert_eq!(snap.visible_tiles.len(), 4, "512 px of map at zoom 2 spans 2×2 tiles");
}

#[test]
fn test_drag_pans_the_map() {
    let mut engine = raster_engine();
    engine.handle(EngineCommand::Resize {
        width: 512.0,
        height: 512.0,
    });
    engine.handle_all([
        GestureEvent::PointerDown { x: 300.0, y: 300.0 }.into(),
        GestureEvent::PointerMove {
            x: 250.0,
            y: 280.0,
            pointers: 1,
        }
        .into(),
        GestureEvent::PointerUp.into(),
    ]);
    let before = engine.viewport().transform().translation();
    let snap = engine.frame();
    assert_eq!(snap.viewport_width, 512.0);
    assert_eq!(snap.transform.translate_x, before.x);
    let origin = engine.screen_to_map(0.0, 0.0);
    assert!(origin.is_within(1024.0, 1024.0));
}

// ---- Snapshot contract ----

#[test]
fn test_feedback_handed_over_once() {
    let mut engine = raster_engine();
    engine.handle(double_tap(100.0, 100.0));
    assert_eq!(engine.frame().feedback.len(), 1);
    assert!(engine.frame().feedback.is_empty());
}

#[test]
fn test_snapshot_serializes() {
    let mut engine = raster_engine();
    engine.handle(double_tap(100.0, 500.0));
    engine.handle(tap(300.0, 500.0));
    let json = serde_json::to_string(&engine.frame()).unwrap();
    assert!(json.contains("\"type\":\"SolutionReady\""), "{json}");
    assert!(json.contains("\"angle_unit\":\"Mils\""), "{json}");
}

// ---- Geodetic mode ----

fn geodetic_engine() -> TargetingEngine<GeodeticFrame, FlatTerrain> {
    let frame = GeodeticFrame::new(TilePyramid::new(15, 256));
    TargetingEngine::new(EngineConfig::default(), frame, FlatTerrain { meters: 250.0 }).unwrap()
}

#[test]
fn test_geodetic_solution_in_degrees() {
    let mut engine = geodetic_engine();
    let from = GeoPosition::new(48.137, 11.575);
    engine.place_emplacement(from).unwrap();
    let s = engine.designate_target(GeoPosition::new(48.157, 11.575)).unwrap();

    assert_eq!(s.angle_unit, AngleUnit::Degrees);
    assert!((s.distance - 0.02 * 111_320.0).abs() < 1e-6, "distance {}", s.distance);
    assert!(s.azimuth < 1e-6 || s.azimuth > 360.0 - 1e-6, "due north, got {}", s.azimuth);
    assert!((45.0..=85.0).contains(&s.elevation_angle));
}

#[test]
fn test_geodetic_out_of_range_clears() {
    let mut engine = geodetic_engine();
    assert_eq!(engine.profile().out_of_range, OutOfRangePolicy::Clear);
    engine.place_emplacement(GeoPosition::new(48.137, 11.575)).unwrap();
    engine.designate_target(GeoPosition::new(48.147, 11.575)).unwrap();

    // ~11 km north
    assert!(engine.designate_target(GeoPosition::new(48.237, 11.575)).is_none());
    assert!(engine.solution().is_none());
    assert!(engine.target().is_none());
}

#[test]
fn test_geodetic_range_ring_shrinks_in_pixels_toward_equator() {
    let mut engine = geodetic_engine();
    engine.place_emplacement(GeoPosition::new(60.0, 10.0)).unwrap();
    engine.place_emplacement(GeoPosition::new(0.0, 10.0)).unwrap();
    let snap = engine.frame();
    assert_eq!(snap.mode, DeploymentMode::Geodetic);
    let ratio = snap.emplacements[0].range_ring_px / snap.emplacements[1].range_ring_px;
    assert!((ratio - 2.0).abs() < 1e-6, "ratio {ratio}");
}

// ---- Map tiles ----

fn write_map(dir: &tempfile::TempDir) -> PathBuf {
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    let png = |r: u8| {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(256, 256, Rgb([r, 0, 0])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    };

    let path = dir.path().join("map.mbtiles");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB)",
        [],
    )
    .unwrap();
    // TMS rows: top-origin row 0 is stored as 1 at zoom 1
    let rows: [(u32, u32, Vec<u8>); 3] = [(0, 1, png(10)), (1, 1, png(20)), (0, 0, b"garbage".to_vec())];
    for (col, tms_row, blob) in rows {
        conn.execute(
            "INSERT INTO tiles VALUES (1, ?1, ?2, ?3)",
            rusqlite::params![col, tms_row, blob],
        )
        .unwrap();
    }
    path
}

#[test]
fn test_draw_tiles_skips_missing_and_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = EngineConfig {
        viewport_width: 512.0,
        viewport_height: 512.0,
        ..Default::default()
    };
    let frame = RasterFrame::new(TilePyramid::new(1, 256));
    let mut engine = TargetingEngine::new(config, frame, FlatTerrain::default()).unwrap();
    assert!(engine.draw_tiles().is_empty(), "no map attached");

    engine.open_map(write_map(&dir)).unwrap();
    assert!(engine.has_map());
    assert_eq!(engine.frame().visible_tiles.len(), 4);

    let tiles = engine.draw_tiles();
    let addresses: Vec<TileAddress> = tiles.iter().map(|(a, _)| *a).collect();
    assert_eq!(addresses, vec![TileAddress::new(1, 0, 0), TileAddress::new(1, 1, 0)]);
    assert_eq!(tiles[1].1.channel_at(0, 0), Some(20));

    // Cached second pass returns the same tiles
    assert_eq!(engine.draw_tiles().len(), 2);

    engine.close();
    engine.close();
    assert!(!engine.has_map());
    assert!(engine.draw_tiles().is_empty());
}

#[test]
fn test_unsupported_pyramid_rejected() {
    for pyramid in [TilePyramid::new(64, 256), TilePyramid::new(32, 256), TilePyramid::new(2, 0)] {
        let result = TargetingEngine::new(EngineConfig::default(), RasterFrame::new(pyramid), EastSlope);
        assert!(
            matches!(result, Err(crate::error::EngineError::Config(_))),
            "{pyramid:?} accepted"
        );
    }
}

#[test]
fn test_open_missing_map_fails() {
    let mut engine = raster_engine();
    let err = engine.open_map("/nonexistent/map.mbtiles").unwrap_err();
    assert!(matches!(
        err,
        crate::error::EngineError::Terrain(fireplot_terrain::TerrainError::NotFound { .. })
    ));
}
