//! Engine configuration.
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes. Solver profiles are replaced whole: a profile given in JSON must
//! be complete (apart from `muzzle_velocity`), which keeps one mode's
//! constants from leaking into the other's.

use std::path::Path;

use fireplot_core::constants::*;
use fireplot_core::enums::{AngleUnit, DeploymentMode, OutOfRangePolicy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Calibration of the ballistic-table surrogate for one deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverProfile {
    /// Maximum horizontal range (map pixels in raster mode, meters in geodetic mode).
    pub max_range: f64,
    /// Elevation at zero range, also the upper clamp.
    pub elev_max: f64,
    /// Lower clamp of the elevation angle.
    pub elev_min: f64,
    /// Elevation drop between zero and maximum range.
    pub elev_span: f64,
    /// Multiplier on height difference / slant distance.
    pub height_gain: f64,
    pub angle_unit: AngleUnit,
    /// Reported alongside the solution when the charge is known (m/s).
    #[serde(default)]
    pub muzzle_velocity: Option<f64>,
    /// Hit-test radius for selecting an emplacement, in range units.
    pub pick_radius: f64,
    pub out_of_range: OutOfRangePolicy,
}

impl SolverProfile {
    /// Pixel-space profile in mils.
    pub fn raster() -> Self {
        Self {
            max_range: RASTER_MAX_RANGE,
            elev_max: RASTER_ELEV_MAX,
            elev_min: RASTER_ELEV_MIN,
            elev_span: RASTER_ELEV_SPAN,
            height_gain: RASTER_HEIGHT_GAIN,
            angle_unit: AngleUnit::Mils,
            muzzle_velocity: None,
            pick_radius: RASTER_PICK_RADIUS,
            out_of_range: OutOfRangePolicy::KeepPrevious,
        }
    }

    /// Geodetic profile in degrees.
    pub fn geodetic() -> Self {
        Self {
            max_range: GEO_MAX_RANGE,
            elev_max: GEO_ELEV_MAX,
            elev_min: GEO_ELEV_MIN,
            elev_span: GEO_ELEV_SPAN,
            height_gain: GEO_HEIGHT_GAIN,
            angle_unit: AngleUnit::Degrees,
            muzzle_velocity: None,
            pick_radius: GEO_PICK_RADIUS,
            out_of_range: OutOfRangePolicy::Clear,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.max_range,
            self.elev_max,
            self.elev_min,
            self.elev_span,
            self.height_gain,
            self.pick_radius,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(EngineError::Config("solver profile values must be finite".into()));
        }
        if self.max_range <= 0.0 {
            return Err(EngineError::Config(format!(
                "max_range must be positive, got {}",
                self.max_range
            )));
        }
        if self.elev_min > self.elev_max {
            return Err(EngineError::Config(format!(
                "elev_min {} exceeds elev_max {}",
                self.elev_min, self.elev_max
            )));
        }
        if self.pick_radius < 0.0 {
            return Err(EngineError::Config("pick_radius must not be negative".into()));
        }
        if let Some(v) = self.muzzle_velocity {
            if !(v.is_finite() && v > 0.0) {
                return Err(EngineError::Config(format!("invalid muzzle velocity {v}")));
            }
        }
        Ok(())
    }
}

impl Default for SolverProfile {
    fn default() -> Self {
        Self::raster()
    }
}

/// Configuration for a targeting engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tile edge length in pixels.
    pub tile_size: u32,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Elevation of a full-white heightmap pixel (meters).
    pub max_height: f64,
    /// Decoded map tiles kept between draws. 0 disables the cache.
    pub tile_cache_capacity: usize,
    /// Initial viewport size in screen pixels.
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub raster: SolverProfile,
    pub geodetic: SolverProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            max_height: DEFAULT_MAX_HEIGHT,
            tile_cache_capacity: DEFAULT_TILE_CACHE_CAPACITY,
            viewport_width: 1080.0,
            viewport_height: 1920.0,
            raster: SolverProfile::raster(),
            geodetic: SolverProfile::geodetic(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Profile calibrated for `mode`.
    pub fn profile_for(&self, mode: DeploymentMode) -> &SolverProfile {
        match mode {
            DeploymentMode::Raster => &self.raster,
            DeploymentMode::Geodetic => &self.geodetic,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(EngineError::Config("tile_size must be positive".into()));
        }
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale && self.max_scale.is_finite()) {
            return Err(EngineError::Config(format!(
                "invalid scale bounds [{}, {}]",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.max_height.is_finite() && self.max_height >= 0.0) {
            return Err(EngineError::Config(format!(
                "invalid max_height {}",
                self.max_height
            )));
        }
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(EngineError::Config(format!(
                "invalid viewport {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        self.raster.validate()?;
        self.geodetic.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.profile_for(DeploymentMode::Raster).max_range, 1200.0);
        assert_eq!(config.profile_for(DeploymentMode::Geodetic).angle_unit, AngleUnit::Degrees);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "max_scale": 8.0, "tile_cache_capacity": 0 }"#).unwrap();
        assert_eq!(config.max_scale, 8.0);
        assert_eq!(config.tile_cache_capacity, 0);
        assert_eq!(config.min_scale, DEFAULT_MIN_SCALE);
        assert_eq!(config.geodetic, SolverProfile::geodetic());
    }

    #[test]
    fn test_profile_override_must_be_complete() {
        let err = EngineConfig::from_json_str(r#"{ "raster": { "max_range": 900.0 } }"#).unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse(_)), "got {err:?}");
    }

    #[test]
    fn test_profile_roundtrip_through_json() {
        let mut config = EngineConfig::default();
        config.geodetic.muzzle_velocity = Some(211.0);
        let json = serde_json::to_string(&config).unwrap();
        let back = EngineConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig {
            min_scale: 2.0,
            max_scale: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));

        config = EngineConfig::default();
        config.raster.elev_min = 1600.0;
        assert!(config.validate().is_err());

        config = EngineConfig::default();
        config.geodetic.max_range = 0.0;
        assert!(config.validate().is_err());

        config = EngineConfig::default();
        config.raster.muzzle_velocity = Some(-5.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/fireplot.json").unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
