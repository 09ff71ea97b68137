//! Terrain and tile data for fireplot.
//!
//! Zoom-pyramid tile storage (MBTiles), map projections, elevation
//! rasters, and the elevation services built on top of them.

pub use fireplot_core as core;

pub mod cache;
pub mod error;
pub mod geotransform;
pub mod grid;
pub mod hgt;
pub mod projection;
pub mod pyramid;
pub mod service;
pub mod tiles;

// Re-export key types for convenience.
pub use cache::TileCache;
pub use error::{Result, TerrainError};
pub use geotransform::GeoTransform;
pub use grid::{ElevationRaster, RasterGrid};
pub use projection::GeoProjection;
pub use pyramid::TilePyramid;
pub use service::{DsmSampler, Elevation, FlatTerrain, Sampling, TerrainService, TileHeightSampler};
pub use tiles::{Tile, TileStore};
