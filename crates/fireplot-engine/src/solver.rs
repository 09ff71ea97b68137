//! Firing solution computation.
//!
//! The elevation angle comes from a ballistic-table surrogate, not a
//! trajectory model: a baseline that falls linearly with range, plus a
//! correction proportional to the height/slant ratio, clamped to the
//! profile's elevation limits. No drag, wind or Coriolis.

use glam::DVec2;
use tracing::trace;

use fireplot_core::state::FiringSolution;

use crate::config::SolverProfile;
use crate::frame::{planar_azimuth, TargetFrame};

/// Stateless solver for one calibrated profile.
#[derive(Debug, Clone, Copy)]
pub struct BallisticSolver {
    profile: SolverProfile,
}

impl BallisticSolver {
    pub fn new(profile: SolverProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &SolverProfile {
        &self.profile
    }

    /// Elevation angle in the profile's unit for a horizontal distance and
    /// height difference (target minus emplacement).
    pub fn elevation_angle(&self, horizontal_distance: f64, height_difference: f64) -> f64 {
        let p = &self.profile;
        let baseline = p.elev_max - (horizontal_distance / p.max_range) * p.elev_span;
        let slant = horizontal_distance.hypot(height_difference);
        let adjustment = if slant > 0.0 {
            (height_difference / slant) * p.height_gain
        } else {
            0.0
        };
        (baseline + adjustment).max(p.elev_min).min(p.elev_max)
    }

    /// Solve from a planar (east, north) offset. None beyond maximum range.
    pub fn solve_offset(
        &self,
        offset: DVec2,
        emplacement_elevation: f64,
        target_elevation: f64,
    ) -> Option<FiringSolution> {
        let distance = offset.length();
        if !distance.is_finite() || distance > self.profile.max_range {
            trace!(distance, max_range = self.profile.max_range, "target out of range");
            return None;
        }
        let height_difference = target_elevation - emplacement_elevation;
        Some(FiringSolution {
            distance,
            slant_distance: distance.hypot(height_difference),
            height_difference,
            azimuth: planar_azimuth(offset),
            elevation_angle: self.elevation_angle(distance, height_difference),
            angle_unit: self.profile.angle_unit,
            muzzle_velocity: self.profile.muzzle_velocity,
        })
    }

    /// Solve between two points of `frame`. The azimuth comes from the
    /// frame (great-circle bearing in geodetic mode).
    pub fn solve<F: TargetFrame>(
        &self,
        frame: &F,
        emplacement: &F::Point,
        emplacement_elevation: f64,
        target: &F::Point,
        target_elevation: f64,
    ) -> Option<FiringSolution> {
        let offset = frame.planar_offset(emplacement, target);
        let mut solution = self.solve_offset(offset, emplacement_elevation, target_elevation)?;
        solution.azimuth = frame.azimuth(emplacement, target);
        Some(solution)
    }
}
