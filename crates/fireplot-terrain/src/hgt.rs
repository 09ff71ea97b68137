//! SRTM / NASADEM HGT loader.
//!
//! HGT files are flat square arrays of big-endian i16 elevations covering a
//! 1° × 1° tile, north row first. Samples sit on the grid lines, so a file
//! of side N has a spacing of 1/(N-1) degrees and overlaps its neighbors by
//! one row/column. The filename encodes the SW corner (e.g. `N30E047.hgt`).

use std::path::Path;

use tracing::info;

use crate::error::{Result, TerrainError};
use crate::geotransform::GeoTransform;
use crate::grid::{ElevationRaster, RasterGrid};

/// Void value in HGT files (no data).
pub const HGT_VOID: i16 = -32768;

/// SW corner (lat, lon) encoded in an HGT filename such as `N30E047.hgt`
/// or `S10W045.hgt`. None for anything else, including non-ASCII names.
pub fn parse_hgt_filename(filename: &str) -> Option<(f64, f64)> {
    let stem = filename
        .strip_suffix(".hgt")
        .or_else(|| filename.strip_suffix(".HGT"))?;
    if !stem.is_ascii() || stem.len() < 7 {
        return None;
    }

    let hemisphere = |tag: &str, pos: char, neg: char| match tag.chars().next()?.to_ascii_uppercase() {
        c if c == pos => Some(1.0),
        c if c == neg => Some(-1.0),
        _ => None,
    };
    let lat_sign = hemisphere(stem.get(0..1)?, 'N', 'S')?;
    let lon_sign = hemisphere(stem.get(3..4)?, 'E', 'W')?;
    let lat: f64 = stem.get(1..3)?.parse().ok()?;
    let lon: f64 = stem.get(4..7)?.parse().ok()?;

    Some((lat_sign * lat, lon_sign * lon))
}

/// Side length of a square sample grid stored in `byte_count` bytes.
/// 1 arc-second files are 3601², 3 arc-second files are 1201².
fn grid_side_from_byte_count(byte_count: usize) -> Option<usize> {
    if byte_count % 2 != 0 {
        return None;
    }
    let samples = byte_count / 2;
    let side = (samples as f64).sqrt().round() as usize;
    (side >= 2 && side * side == samples).then_some(side)
}

/// Decode HGT bytes for the tile whose SW corner is (`lat`, `lon`).
/// Void samples become NODATA.
pub fn parse_hgt(data: &[u8], lat: f64, lon: f64) -> Result<RasterGrid> {
    let side = grid_side_from_byte_count(data.len()).ok_or_else(|| {
        TerrainError::InvalidRaster(format!(
            "unexpected HGT size: {} bytes is not a square grid of i16 samples",
            data.len()
        ))
    })?;

    let elevations: Vec<f32> = data
        .chunks_exact(2)
        .map(|b| i16::from_be_bytes([b[0], b[1]]) as f32)
        .collect();

    // Cell (0, 0) is centered on the NW corner sample
    let spacing = 1.0 / (side - 1) as f64;
    let transform = GeoTransform::new(
        lon - spacing / 2.0,
        lat + 1.0 + spacing / 2.0,
        spacing,
        -spacing,
    );

    RasterGrid::new(transform, side, side, elevations, Some(HGT_VOID as f32))
}

/// Load a single HGT file.
pub fn load_hgt(path: &Path) -> Result<RasterGrid> {
    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| TerrainError::InvalidRaster("invalid HGT filename".into()))?;

    let (lat, lon) = parse_hgt_filename(filename).ok_or_else(|| {
        TerrainError::InvalidRaster(format!(
            "cannot parse HGT coordinates from filename: {filename}"
        ))
    })?;

    let data = std::fs::read(path)?;
    let grid = parse_hgt(&data, lat, lon)?;

    let (width, _) = grid.dimensions();
    info!(
        path = %path.display(),
        side = width,
        range = ?grid.elevation_range(),
        "loaded HGT tile"
    );
    Ok(grid)
}
