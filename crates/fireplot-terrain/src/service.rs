//! Elevation lookup over interchangeable terrain sources.
//!
//! Legacy callers treat "no data" as sea level; [`Elevation::has_data`]
//! lets newer callers tell a true zero from a gap.

use std::cell::RefCell;
use std::path::Path;

use fireplot_core::types::{GeoPosition, MapPosition};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::TileCache;
use crate::error::{Result, TerrainError};
use crate::grid::ElevationRaster;
use crate::pyramid::TilePyramid;
use crate::tiles::TileStore;

/// An elevation sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Elevation {
    pub meters: f64,
    /// False when `meters` is the sea-level stand-in for missing data.
    pub has_data: bool,
}

impl Elevation {
    pub const NO_DATA: Elevation = Elevation {
        meters: 0.0,
        has_data: false,
    };

    pub fn known(meters: f64) -> Self {
        Self {
            meters,
            has_data: true,
        }
    }
}

/// Elevation lookup at a position of type `P`.
pub trait TerrainService<P> {
    /// Precise lookup. Coverage gaps may fail with `OutOfCoverage`.
    fn lookup(&self, position: &P) -> Result<Elevation>;

    /// Never fails: any failure degrades to [`Elevation::NO_DATA`].
    fn elevation_at(&self, position: &P) -> Elevation {
        match self.lookup(position) {
            Ok(elevation) => elevation,
            Err(e) => {
                debug!(error = %e, "elevation unavailable, using sea level");
                Elevation::NO_DATA
            }
        }
    }

    /// Elevation in meters with missing data reported as 0.
    fn meters_at(&self, position: &P) -> f64 {
        self.elevation_at(position).meters
    }
}

/// Constant elevation everywhere. Stands in when no terrain source is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain {
    pub meters: f64,
}

impl<P> TerrainService<P> for FlatTerrain {
    fn lookup(&self, _position: &P) -> Result<Elevation> {
        Ok(Elevation::known(self.meters))
    }
}

/// Samples grayscale heightmap tiles: `elevation = v / 255 * max_height`.
///
/// Pixels outside the pyramid and absent tiles read as sea level with
/// `has_data = false`; they are not errors.
pub struct TileHeightSampler {
    store: TileStore,
    pyramid: TilePyramid,
    max_height: f64,
    cache: Option<RefCell<TileCache>>,
}

impl TileHeightSampler {
    pub fn new(store: TileStore, pyramid: TilePyramid, max_height: f64) -> Self {
        Self {
            store,
            pyramid,
            max_height,
            cache: None,
        }
    }

    /// Open a heightmap database and sample it at `pyramid`'s zoom level.
    pub fn open(path: impl AsRef<Path>, pyramid: TilePyramid, max_height: f64) -> Result<Self> {
        Ok(Self::new(TileStore::open(path)?, pyramid, max_height))
    }

    /// Keep up to `capacity` decoded height tiles between samples. 0 disables caching.
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = (capacity > 0).then(|| RefCell::new(TileCache::new(capacity)));
        self
    }

    pub fn pyramid(&self) -> TilePyramid {
        self.pyramid
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }

    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn close(&mut self) {
        if let Some(cache) = &self.cache {
            cache.borrow_mut().clear();
        }
        self.store.close();
    }

    fn sample_map(&self, pos: &MapPosition) -> Elevation {
        let Some((address, px, py)) = self.pyramid.locate(pos) else {
            return Elevation::NO_DATA;
        };

        let value = match &self.cache {
            Some(cache) => cache
                .borrow_mut()
                .get_or_load(&self.store, address)
                .and_then(|tile| tile.channel_at(px, py)),
            None => self
                .store
                .get_tile(address)
                .and_then(|tile| tile.channel_at(px, py)),
        };

        match value {
            Some(v) => Elevation::known(v as f64 / 255.0 * self.max_height),
            None => {
                debug!(%address, px, py, "no height tile, using sea level");
                Elevation::NO_DATA
            }
        }
    }
}

impl TerrainService<MapPosition> for TileHeightSampler {
    fn lookup(&self, position: &MapPosition) -> Result<Elevation> {
        Ok(self.sample_map(position))
    }
}

impl TerrainService<GeoPosition> for TileHeightSampler {
    fn lookup(&self, position: &GeoPosition) -> Result<Elevation> {
        Ok(self.sample_map(&self.pyramid.geo_to_map(position)))
    }
}

/// How a DSM cell value is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sampling {
    /// Value of the containing cell.
    #[default]
    Nearest,
    /// Bilinear blend of the surrounding cell centers.
    Bilinear,
}

/// Samples a georeferenced elevation raster. Gaps fail with `OutOfCoverage`.
pub struct DsmSampler<R> {
    raster: R,
    sampling: Sampling,
}

impl<R: ElevationRaster> DsmSampler<R> {
    pub fn new(raster: R) -> Self {
        Self {
            raster,
            sampling: Sampling::Nearest,
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn raster(&self) -> &R {
        &self.raster
    }
}

impl<R: ElevationRaster> TerrainService<GeoPosition> for DsmSampler<R> {
    fn lookup(&self, position: &GeoPosition) -> Result<Elevation> {
        let value = match self.sampling {
            Sampling::Nearest => self
                .raster
                .cell_at(position)
                .and_then(|(row, col)| self.raster.sample_pixel(row, col)),
            Sampling::Bilinear => self.raster.sample_bilinear(position),
        };
        value.map(Elevation::known).ok_or(TerrainError::OutOfCoverage {
            lat: position.lat,
            lon: position.lon,
        })
    }
}
