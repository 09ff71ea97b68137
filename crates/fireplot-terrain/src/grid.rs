//! Georeferenced single-band elevation rasters (DSM).

use fireplot_core::types::GeoPosition;

use crate::error::{Result, TerrainError};
use crate::geotransform::GeoTransform;

/// A single-band elevation raster with affine georeferencing.
///
/// Decoding concrete formats is left to implementors; the samplers only
/// need the transform, the size, and per-cell access.
pub trait ElevationRaster {
    fn geo_transform(&self) -> GeoTransform;

    /// (width, height) in cells.
    fn dimensions(&self) -> (usize, usize);

    /// Cell value in meters, None for NODATA or out-of-bounds cells.
    fn sample_pixel(&self, row: usize, col: usize) -> Option<f64>;

    /// Integer cell containing `geo`, None outside the raster.
    fn cell_at(&self, geo: &GeoPosition) -> Option<(usize, usize)> {
        let (col, row) = self.geo_transform().geo_to_pixel(geo);
        let (width, height) = self.dimensions();
        if !(col >= 0.0 && row >= 0.0 && col < width as f64 && row < height as f64) {
            return None;
        }
        Some((row.floor() as usize, col.floor() as usize))
    }

    /// Bilinear interpolation between the four surrounding cell centers.
    /// None outside the raster or when any contributing cell is NODATA.
    fn sample_bilinear(&self, geo: &GeoPosition) -> Option<f64> {
        // Containment uses the cell edges, interpolation uses cell centers
        self.cell_at(geo)?;
        let (col, row) = self.geo_transform().geo_to_pixel(geo);
        let (width, height) = self.dimensions();
        let col = (col - 0.5).clamp(0.0, (width - 1) as f64);
        let row = (row - 0.5).clamp(0.0, (height - 1) as f64);

        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(height - 1);
        let c1 = (c0 + 1).min(width - 1);
        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let e00 = self.sample_pixel(r0, c0)?;
        let e01 = self.sample_pixel(r0, c1)?;
        let e10 = self.sample_pixel(r1, c0)?;
        let e11 = self.sample_pixel(r1, c1)?;

        let top = e00 * (1.0 - fc) + e01 * fc;
        let bot = e10 * (1.0 - fc) + e11 * fc;
        Some(top * (1.0 - fr) + bot * fr)
    }
}

/// In-memory elevation raster, row-major (north-to-south, west-to-east).
#[derive(Debug, Clone)]
pub struct RasterGrid {
    transform: GeoTransform,
    width: usize,
    height: usize,
    values: Vec<f32>,
    nodata: Option<f32>,
}

impl RasterGrid {
    /// Create a grid; `values.len()` must equal `width * height`.
    pub fn new(
        transform: GeoTransform,
        width: usize,
        height: usize,
        values: Vec<f32>,
        nodata: Option<f32>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TerrainError::InvalidRaster(format!(
                "empty raster {width}x{height}"
            )));
        }
        if values.len() != width * height {
            return Err(TerrainError::InvalidRaster(format!(
                "expected {} cells for {width}x{height}, got {}",
                width * height,
                values.len()
            )));
        }
        Ok(Self {
            transform,
            width,
            height,
            values,
            nodata,
        })
    }

    pub fn nodata(&self) -> Option<f32> {
        self.nodata
    }

    /// (min, max) over valid cells, None when every cell is NODATA.
    pub fn elevation_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| !self.is_nodata(*v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    fn is_nodata(&self, v: f32) -> bool {
        v.is_nan() || self.nodata.is_some_and(|nd| v == nd)
    }
}

impl ElevationRaster for RasterGrid {
    fn geo_transform(&self) -> GeoTransform {
        self.transform
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn sample_pixel(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let v = self.values[row * self.width + col];
        if self.is_nodata(v) {
            None
        } else {
            Some(v as f64)
        }
    }
}
