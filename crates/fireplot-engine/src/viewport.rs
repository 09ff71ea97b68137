//! Screen ↔ map conversion and gesture-driven pan/zoom.
//!
//! [`ViewTransform`] is an immutable value: every operation returns a new
//! transform with its inverse already recomputed. [`ViewportTransform`]
//! tracks gesture state and applies those operations, clamping after each.
//!
//! screen = map × scale + translation

use glam::{DAffine2, DVec2};

use fireplot_core::state::TransformView;
use fireplot_core::types::{MapPosition, TileAddress};
use fireplot_terrain::TilePyramid;

/// Uniform scale plus translation from map pixels to screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    forward: DAffine2,
    inverse: DAffine2,
}

impl ViewTransform {
    /// `scale` must be positive.
    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        let forward = DAffine2::from_translation(DVec2::new(translate_x, translate_y))
            * DAffine2::from_scale(DVec2::splat(scale));
        Self {
            forward,
            inverse: forward.inverse(),
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Transform that centers a `map`-sized map in a `viewport`-sized screen.
    pub fn centered(scale: f64, map: DVec2, viewport: DVec2) -> Self {
        let t = (viewport - map * scale) / 2.0;
        Self::new(scale, t.x, t.y)
    }

    pub fn scale(&self) -> f64 {
        self.forward.matrix2.x_axis.x
    }

    pub fn translation(&self) -> DVec2 {
        self.forward.translation
    }

    pub fn matrix(&self) -> DAffine2 {
        self.forward
    }

    pub fn screen_to_map(&self, x: f64, y: f64) -> MapPosition {
        let p = self.inverse.transform_point2(DVec2::new(x, y));
        MapPosition::new(p.x, p.y)
    }

    pub fn map_to_screen(&self, pos: &MapPosition) -> (f64, f64) {
        let p = self.forward.transform_point2(DVec2::new(pos.x, pos.y));
        (p.x, p.y)
    }

    /// Post-translate by a screen-space delta.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Self {
        let t = self.translation();
        Self::new(self.scale(), t.x + dx, t.y + dy)
    }

    /// Multiply the scale by `factor` (result clamped to `[min_scale, max_scale]`)
    /// keeping the map point under the focus fixed on screen.
    pub fn zoom_at(&self, focus_x: f64, focus_y: f64, factor: f64, min_scale: f64, max_scale: f64) -> Self {
        if !(factor.is_finite() && factor > 0.0) {
            return *self;
        }
        let scale = (self.scale() * factor).max(min_scale).min(max_scale);
        let focus_map = self.screen_to_map(focus_x, focus_y);
        let t = DVec2::new(focus_x, focus_y) - DVec2::new(focus_map.x, focus_map.y) * scale;
        Self::new(scale, t.x, t.y)
    }

    /// Center each axis on which the scaled map fits in the viewport; on the
    /// other axes, keep the map covering the viewport edge to edge.
    pub fn clamp_to_bounds(&self, map_width: f64, map_height: f64, viewport_width: f64, viewport_height: f64) -> Self {
        let scale = self.scale();
        let t = self.translation();
        let clamp_axis = |t: f64, map: f64, view: f64| {
            let scaled = map * scale;
            if scaled <= view {
                (view - scaled) / 2.0
            } else {
                t.max(view - scaled).min(0.0)
            }
        };
        Self::new(
            scale,
            clamp_axis(t.x, map_width, viewport_width),
            clamp_axis(t.y, map_height, viewport_height),
        )
    }

    pub fn to_view(&self) -> TransformView {
        let t = self.translation();
        TransformView {
            scale: self.scale(),
            translate_x: t.x,
            translate_y: t.y,
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Gesture state around a [`ViewTransform`].
#[derive(Debug, Clone)]
pub struct ViewportTransform {
    transform: ViewTransform,
    last_touch: Option<DVec2>,
    scale_in_progress: bool,
    min_scale: f64,
    max_scale: f64,
    map_size: DVec2,
    viewport: DVec2,
}

impl ViewportTransform {
    /// Start centered at scale 1 (or the nearest allowed scale).
    pub fn new(map_size: DVec2, viewport: DVec2, min_scale: f64, max_scale: f64) -> Self {
        let scale = 1.0_f64.max(min_scale).min(max_scale);
        let mut vp = Self {
            transform: ViewTransform::centered(scale, map_size, viewport),
            last_touch: None,
            scale_in_progress: false,
            min_scale,
            max_scale,
            map_size,
            viewport,
        };
        vp.clamp();
        vp
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale()
    }

    pub fn map_size(&self) -> DVec2 {
        self.map_size
    }

    pub fn viewport_size(&self) -> DVec2 {
        self.viewport
    }

    pub fn is_scaling(&self) -> bool {
        self.scale_in_progress
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.last_touch = Some(DVec2::new(x, y));
    }

    /// Pan by the movement since the previous touch point. Ignored while
    /// pinching or when more than one contact is down.
    pub fn pointer_move(&mut self, x: f64, y: f64, pointers: u8) {
        let current = DVec2::new(x, y);
        if pointers == 1 && !self.scale_in_progress {
            if let Some(last) = self.last_touch {
                let delta = current - last;
                self.pan_by(delta.x, delta.y);
            }
        }
        self.last_touch = Some(current);
    }

    pub fn pointer_up(&mut self) {
        self.last_touch = None;
    }

    pub fn scale_begin(&mut self) {
        self.scale_in_progress = true;
    }

    pub fn scale_end(&mut self) {
        self.scale_in_progress = false;
        // The remaining finger starts a fresh drag
        self.last_touch = None;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform = self.transform.pan_by(dx, dy);
        self.clamp();
    }

    pub fn zoom_at(&mut self, focus_x: f64, focus_y: f64, factor: f64) {
        self.transform = self
            .transform
            .zoom_at(focus_x, focus_y, factor, self.min_scale, self.max_scale);
        self.clamp();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        self.viewport = DVec2::new(width, height);
        self.clamp();
    }

    pub fn set_map_size(&mut self, map_size: DVec2) {
        self.map_size = map_size;
        self.clamp();
    }

    pub fn screen_to_map(&self, x: f64, y: f64) -> MapPosition {
        self.transform.screen_to_map(x, y)
    }

    pub fn map_to_screen(&self, pos: &MapPosition) -> (f64, f64) {
        self.transform.map_to_screen(pos)
    }

    pub fn contains(&self, pos: &MapPosition) -> bool {
        pos.is_within(self.map_size.x, self.map_size.y)
    }

    /// Tiles of `pyramid` intersecting the viewport.
    pub fn visible_tiles(&self, pyramid: &TilePyramid) -> Vec<TileAddress> {
        let min = self.screen_to_map(0.0, 0.0);
        let max = self.screen_to_map(self.viewport.x, self.viewport.y);
        pyramid.tiles_covering(min, max)
    }

    fn clamp(&mut self) {
        self.transform = self.transform.clamp_to_bounds(
            self.map_size.x,
            self.map_size.y,
            self.viewport.x,
            self.viewport.y,
        );
    }
}
