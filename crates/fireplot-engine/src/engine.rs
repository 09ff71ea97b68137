//! Targeting engine: the single owner of all targeting state.
//!
//! `TargetingEngine` applies commands synchronously and produces a
//! `FrameSnapshot` for the renderer on demand. Feedback accumulates between
//! snapshots and is handed over exactly once.

use std::path::Path;
use std::sync::Arc;

use glam::DVec2;
use tracing::{debug, info, warn};

use fireplot_core::commands::{EngineCommand, GestureEvent};
use fireplot_core::constants::MAX_ZOOM;
use fireplot_core::enums::OutOfRangePolicy;
use fireplot_core::events::Feedback;
use fireplot_core::state::{EmplacementView, FiringSolution, FrameSnapshot, SolutionView, TargetView};
use fireplot_core::types::{EmplacementId, MapPosition, MarkerHandle, TileAddress};
use fireplot_terrain::{Elevation, TerrainService, Tile, TileCache, TilePyramid, TileStore};

use crate::config::{EngineConfig, SolverProfile};
use crate::error::{EngineError, LimitReached, Result};
use crate::frame::TargetFrame;
use crate::registry::{Emplacement, EmplacementRegistry};
use crate::solver::BallisticSolver;
use crate::viewport::ViewportTransform;

/// The designated target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target<P> {
    pub position: P,
    pub elevation: Elevation,
}

/// Targeting engine over frame `F` with terrain source `T`.
pub struct TargetingEngine<F: TargetFrame, T> {
    config: EngineConfig,
    frame: F,
    terrain: T,
    solver: BallisticSolver,
    pyramid: TilePyramid,
    viewport: ViewportTransform,
    map_store: Option<TileStore>,
    tile_cache: Option<TileCache>,
    registry: EmplacementRegistry<F::Point>,
    selected: Option<EmplacementId>,
    target: Option<Target<F::Point>>,
    solution: Option<SolutionView>,
    feedback: Vec<Feedback>,
}

impl<F, T> TargetingEngine<F, T>
where
    F: TargetFrame,
    T: TerrainService<F::Point>,
{
    /// Create an engine with a validated configuration. No map is attached yet.
    pub fn new(config: EngineConfig, frame: F, terrain: T) -> Result<Self> {
        config.validate()?;
        let pyramid = frame.pyramid();
        if !pyramid.is_supported() {
            return Err(EngineError::Config(format!(
                "unsupported pyramid: zoom {} (max {MAX_ZOOM}), tile size {}",
                pyramid.zoom, pyramid.tile_size
            )));
        }
        let map_size = DVec2::splat(pyramid.map_size());
        let viewport = ViewportTransform::new(
            map_size,
            DVec2::new(config.viewport_width, config.viewport_height),
            config.min_scale,
            config.max_scale,
        );
        let solver = BallisticSolver::new(*config.profile_for(F::MODE));
        let tile_cache =
            (config.tile_cache_capacity > 0).then(|| TileCache::new(config.tile_cache_capacity));

        info!(mode = ?F::MODE, zoom = pyramid.zoom, map_size = pyramid.map_size(), "targeting engine created");
        Ok(Self {
            config,
            frame,
            terrain,
            solver,
            pyramid,
            viewport,
            map_store: None,
            tile_cache,
            registry: EmplacementRegistry::new(),
            selected: None,
            target: None,
            solution: None,
            feedback: Vec::new(),
        })
    }

    /// Attach the map tile database drawn by `draw_tiles`.
    pub fn attach_map(&mut self, store: TileStore) {
        let (_, max_zoom) = store.zoom_range();
        if max_zoom != self.pyramid.zoom {
            warn!(
                store_zoom = max_zoom,
                frame_zoom = self.pyramid.zoom,
                "map database zoom differs from the display zoom"
            );
        }
        if let Some(cache) = &mut self.tile_cache {
            cache.clear();
        }
        self.map_store = Some(store);
    }

    /// Open and attach a map tile database.
    pub fn open_map(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let store = TileStore::open(path)?;
        self.attach_map(store);
        Ok(())
    }

    /// Apply one command.
    pub fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Gesture { gesture } => self.handle_gesture(gesture),
            EngineCommand::Resize { width, height } => self.viewport.resize(width, height),
            EngineCommand::DeleteSelected => {
                if let Some(id) = self.selected {
                    self.remove_emplacement(id);
                }
            }
            EngineCommand::DeleteEmplacement { id } => {
                self.remove_emplacement(id);
            }
            EngineCommand::Reset => self.reset(),
        }
    }

    /// Apply several commands in order.
    pub fn handle_all(&mut self, commands: impl IntoIterator<Item = EngineCommand>) {
        for command in commands {
            self.handle(command);
        }
    }

    fn handle_gesture(&mut self, gesture: GestureEvent) {
        match gesture {
            GestureEvent::PointerDown { x, y } => self.viewport.pointer_down(x, y),
            GestureEvent::PointerMove { x, y, pointers } => self.viewport.pointer_move(x, y, pointers),
            GestureEvent::PointerUp => self.viewport.pointer_up(),
            GestureEvent::ScaleBegin => self.viewport.scale_begin(),
            GestureEvent::Scale {
                focus_x,
                focus_y,
                factor,
            } => self.viewport.zoom_at(focus_x, focus_y, factor),
            GestureEvent::ScaleEnd => self.viewport.scale_end(),
            GestureEvent::Tap { x, y } => self.tap(x, y),
            GestureEvent::DoubleTap { x, y } => self.double_tap(x, y),
        }
    }

    /// Resolve a screen point to a frame point, None (with feedback) outside the map.
    fn resolve_tap(&mut self, x: f64, y: f64) -> Option<F::Point> {
        let map = self.viewport.screen_to_map(x, y);
        if !self.viewport.contains(&map) {
            debug!(x, y, "tap outside map ignored");
            self.feedback.push(Feedback::OutsideMap);
            return None;
        }
        Some(self.frame.from_map(&map))
    }

    fn double_tap(&mut self, x: f64, y: f64) {
        if let Some(point) = self.resolve_tap(x, y) {
            self.place_emplacement(point).ok();
        }
    }

    fn tap(&mut self, x: f64, y: f64) {
        let Some(point) = self.resolve_tap(x, y) else {
            return;
        };
        let pick_radius = self.solver.profile().pick_radius;
        if let Some(id) = self
            .registry
            .select_near(&self.frame, &point, pick_radius)
            .map(|e| e.id)
        {
            debug!(%id, "emplacement selected");
            self.selected = Some(id);
            self.feedback.push(Feedback::EmplacementSelected { id });
            return;
        }
        self.designate_target(point);
    }

    /// Place an emplacement, sampling its elevation now.
    pub fn place_emplacement(&mut self, point: F::Point) -> std::result::Result<EmplacementId, LimitReached> {
        match self.registry.add(point, &self.terrain) {
            Ok(id) => {
                let elevation = self
                    .registry
                    .get(id)
                    .map(|e| e.elevation)
                    .unwrap_or(Elevation::NO_DATA);
                info!(%id, position = ?point, elevation = elevation.meters, has_data = elevation.has_data, "emplacement placed");
                self.feedback.push(Feedback::EmplacementPlaced {
                    id,
                    elevation: elevation.meters,
                    has_elevation_data: elevation.has_data,
                });
                Ok(id)
            }
            Err(limit) => {
                info!(capacity = limit.capacity, "emplacement limit reached");
                self.feedback.push(Feedback::LimitReached {
                    capacity: limit.capacity,
                });
                Err(limit)
            }
        }
    }

    /// Designate a target and solve from the nearest emplacement in range.
    ///
    /// With no emplacement in range the profile's out-of-range policy decides
    /// whether the previous solution stays.
    pub fn designate_target(&mut self, point: F::Point) -> Option<FiringSolution> {
        if self.registry.is_empty() {
            self.feedback.push(Feedback::NoEmplacement);
            return None;
        }

        let elevation = self.terrain.elevation_at(&point);
        let profile = *self.solver.profile();
        let solved = self
            .registry
            .nearest_within_range(&self.frame, &point, profile.max_range)
            .and_then(|e| {
                self.solver
                    .solve(&self.frame, &e.position, e.elevation.meters, &point, elevation.meters)
                    .map(|s| (e.id, s))
            });

        match solved {
            Some((id, solution)) => {
                info!(
                    %id,
                    distance = solution.distance,
                    azimuth = solution.azimuth,
                    elevation_angle = solution.elevation_angle,
                    "firing solution"
                );
                self.target = Some(Target {
                    position: point,
                    elevation,
                });
                self.solution = Some(SolutionView {
                    emplacement: id,
                    solution,
                });
                self.feedback.push(Feedback::SolutionReady { id });
                Some(solution)
            }
            None => {
                debug!(target = ?point, policy = ?profile.out_of_range, "target out of range");
                if profile.out_of_range == OutOfRangePolicy::Clear {
                    self.target = None;
                    self.solution = None;
                }
                self.feedback.push(Feedback::OutOfRange);
                None
            }
        }
    }

    /// Remove an emplacement. A solution it fired is dropped with it.
    pub fn remove_emplacement(&mut self, id: EmplacementId) -> bool {
        if self.registry.remove(id).is_none() {
            return false;
        }
        info!(%id, "emplacement removed");
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.solution.is_some_and(|s| s.emplacement == id) {
            self.solution = None;
        }
        self.feedback.push(Feedback::EmplacementRemoved { id });
        true
    }

    /// Remove all emplacements, the target and the solution.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.selected = None;
        self.target = None;
        self.solution = None;
        self.feedback.push(Feedback::Reset);
        info!("targeting state reset");
    }

    pub fn attach_marker(&mut self, id: EmplacementId, marker: MarkerHandle) -> bool {
        self.registry.attach_marker(id, marker)
    }

    /// Build the renderer snapshot and hand over pending feedback.
    pub fn frame(&mut self) -> FrameSnapshot {
        let transform = self.viewport.transform();
        let scale = transform.scale();
        let max_range = self.solver.profile().max_range;

        let emplacements = self
            .registry
            .iter()
            .map(|e| {
                let map = self.frame.to_map(&e.position);
                let (screen_x, screen_y) = transform.map_to_screen(&map);
                EmplacementView {
                    id: e.id,
                    map,
                    screen_x,
                    screen_y,
                    elevation: e.elevation.meters,
                    has_elevation_data: e.elevation.has_data,
                    range_ring_px: self.frame.range_in_map_pixels(&e.position, max_range) * scale,
                    selected: self.selected == Some(e.id),
                    marker: e.marker,
                }
            })
            .collect();

        let target = self.target.map(|t| {
            let map = self.frame.to_map(&t.position);
            let (screen_x, screen_y) = transform.map_to_screen(&map);
            TargetView {
                map,
                screen_x,
                screen_y,
                elevation: t.elevation.meters,
            }
        });

        let viewport = self.viewport.viewport_size();
        FrameSnapshot {
            mode: F::MODE,
            transform: transform.to_view(),
            viewport_width: viewport.x,
            viewport_height: viewport.y,
            zoom: self.pyramid.zoom,
            visible_tiles: self.viewport.visible_tiles(&self.pyramid),
            emplacements,
            selected: self.selected,
            target,
            solution: self.solution,
            feedback: std::mem::take(&mut self.feedback),
        }
    }

    /// Decoded map tiles for the current viewport. Absent or undecodable
    /// tiles are skipped.
    pub fn draw_tiles(&mut self) -> Vec<(TileAddress, Arc<Tile>)> {
        let Some(store) = &self.map_store else {
            return Vec::new();
        };
        let visible = self.viewport.visible_tiles(&self.pyramid);
        let mut tiles = Vec::with_capacity(visible.len());
        for address in visible {
            let tile = match &mut self.tile_cache {
                Some(cache) => cache.get_or_load(store, address),
                None => store.get_tile(address).map(Arc::new),
            };
            if let Some(tile) = tile {
                tiles.push((address, tile));
            }
        }
        tiles
    }

    /// Release the map database. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(cache) = &mut self.tile_cache {
            cache.clear();
        }
        if let Some(mut store) = self.map_store.take() {
            store.close();
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profile(&self) -> &SolverProfile {
        self.solver.profile()
    }

    pub fn target_frame(&self) -> &F {
        &self.frame
    }

    pub fn pyramid(&self) -> TilePyramid {
        self.pyramid
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn emplacements(&self) -> impl Iterator<Item = &Emplacement<F::Point>> {
        self.registry.iter()
    }

    pub fn emplacement_count(&self) -> usize {
        self.registry.len()
    }

    pub fn selected(&self) -> Option<EmplacementId> {
        self.selected
    }

    pub fn target(&self) -> Option<Target<F::Point>> {
        self.target
    }

    pub fn solution(&self) -> Option<SolutionView> {
        self.solution
    }

    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut T {
        &mut self.terrain
    }

    pub fn has_map(&self) -> bool {
        self.map_store.as_ref().is_some_and(TileStore::is_open)
    }

    /// Screen point to map pixels under the current view.
    pub fn screen_to_map(&self, x: f64, y: f64) -> MapPosition {
        self.viewport.screen_to_map(x, y)
    }
}
