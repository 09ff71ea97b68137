//! Synthetic MBTiles pyramids for demos and tests.
//!
//! The landscape is a function of normalized map coordinates, so every zoom
//! level of the pyramid shows the same terrain at a different resolution:
//! a ridge along the north, rolling hills, a river valley and a few knolls.

use std::io::Cursor;
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use rusqlite::{params, Connection};
use tracing::{debug, info};

use fireplot_core::types::TileAddress;

/// Deepest zoom accepted for generation (4^z tiles per level).
pub const MAX_SYNTHETIC_ZOOM: u8 = 8;

/// What the generated tiles encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PyramidKind {
    /// Grayscale heightmap: v / 255 × max height.
    Height,
    /// Hypsometric-tinted RGB map.
    Map,
}

/// Write levels `0..=zoom` of a synthetic pyramid to a new MBTiles file.
/// Returns the number of tiles written.
pub fn write_pyramid(
    output: &Path,
    kind: PyramidKind,
    zoom: u8,
    tile_size: u32,
    max_height: f64,
) -> Result<u64> {
    if zoom > MAX_SYNTHETIC_ZOOM {
        bail!("zoom {zoom} exceeds the synthetic limit of {MAX_SYNTHETIC_ZOOM}");
    }
    if tile_size == 0 {
        bail!("tile size must be positive");
    }
    if output.exists() {
        bail!("{} already exists", output.display());
    }

    let mut conn = Connection::open(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    conn.execute_batch(
        "CREATE TABLE metadata (name TEXT, value TEXT);
         CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);
         CREATE UNIQUE INDEX tile_index ON tiles (zoom_level, tile_column, tile_row);",
    )?;

    let tx = conn.transaction()?;
    {
        let mut meta = tx.prepare("INSERT INTO metadata (name, value) VALUES (?1, ?2)")?;
        meta.execute(params!["name", "fireplot synthetic"])?;
        meta.execute(params!["format", "png"])?;
        meta.execute(params!["minzoom", "0"])?;
        meta.execute(params!["maxzoom", zoom.to_string()])?;

        let mut insert = tx.prepare(
            "INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for z in 0..=zoom {
            let n = TileAddress::tiles_per_side(z) as u32;
            for col in 0..n {
                for row in 0..n {
                    let address = TileAddress::new(z, col, row);
                    let blob = render_tile(address, kind, tile_size, max_height)?;
                    insert.execute(params![z, col, address.tms_row(), blob])?;
                }
            }
            debug!(zoom = z, tiles = n * n, "level written");
        }
    }
    tx.commit()?;

    let total: u64 = (0..=zoom).map(|z| TileAddress::tiles_per_side(z).pow(2)).sum();
    info!(path = %output.display(), ?kind, zoom, tiles = total, "synthetic pyramid written");
    Ok(total)
}

/// Render one tile as PNG bytes.
fn render_tile(address: TileAddress, kind: PyramidKind, tile_size: u32, max_height: f64) -> Result<Vec<u8>> {
    let map_size = (TileAddress::tiles_per_side(address.zoom) * tile_size as u64) as f64;
    let x0 = address.col as f64 * tile_size as f64;
    let y0 = address.row as f64 * tile_size as f64;
    let height_at = |px: u32, py: u32| {
        let nx = (x0 + px as f64 + 0.5) / map_size;
        let ny = (y0 + py as f64 + 0.5) / map_size;
        synthetic_elevation(nx, ny, max_height)
    };

    let img = match kind {
        PyramidKind::Height => DynamicImage::ImageLuma8(GrayImage::from_fn(tile_size, tile_size, |px, py| {
            Luma([height_to_gray(height_at(px, py), max_height)])
        })),
        PyramidKind::Map => DynamicImage::ImageRgb8(RgbImage::from_fn(tile_size, tile_size, |px, py| {
            let grid = px % 64 == 0 || py % 64 == 0;
            tint(height_at(px, py), max_height, grid)
        })),
    };

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .with_context(|| format!("Failed to encode tile {address}"))?;
    Ok(buf.into_inner())
}

/// Quantize an elevation to the heightmap encoding.
pub fn height_to_gray(elevation: f64, max_height: f64) -> u8 {
    if max_height <= 0.0 {
        return 0;
    }
    ((elevation / max_height).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Green lowlands through brown slopes to pale summits.
fn tint(elevation: f64, max_height: f64, grid: bool) -> Rgb<u8> {
    if grid {
        return Rgb([90, 90, 90]);
    }
    let t = if max_height > 0.0 {
        (elevation / max_height).clamp(0.0, 1.0)
    } else {
        0.0
    };
    if elevation <= 0.0 {
        return Rgb([70, 130, 180]);
    }
    let lerp = |a: f64, b: f64, f: f64| (a + (b - a) * f).round() as u8;
    if t < 0.5 {
        let f = t / 0.5;
        Rgb([lerp(80.0, 160.0, f), lerp(150.0, 130.0, f), lerp(70.0, 80.0, f)])
    } else {
        let f = (t - 0.5) / 0.5;
        Rgb([lerp(160.0, 240.0, f), lerp(130.0, 235.0, f), lerp(80.0, 225.0, f)])
    }
}

/// Synthetic elevation in meters at normalized coordinates.
/// nx: 0 = west, 1 = east. ny: 0 = north, 1 = south.
pub fn synthetic_elevation(nx: f64, ny: f64, max_height: f64) -> f64 {
    // Ridge along the north edge with a wavy crest line
    let crest = 0.25 + 0.05 * (nx * 9.0).sin();
    let ridge = if ny < crest {
        0.55 + 0.45 * (1.0 - ny / crest)
    } else {
        0.55 * (1.0 - smooth_step(ny, crest, crest + 0.25))
    };

    let hills = 0.12 * ((nx * 14.0).sin() * (ny * 11.0).cos() * 0.5 + 0.5);

    let knolls = knoll(nx, ny, 0.3, 0.6, 0.06, 0.35)
        .max(knoll(nx, ny, 0.7, 0.7, 0.05, 0.3))
        .max(knoll(nx, ny, 0.55, 0.85, 0.04, 0.25));

    // A river winds west to east through the southern half
    let river_y = 0.72 + 0.06 * (nx * 7.0).sin();
    let valley = smooth_step((ny - river_y).abs(), 0.0, 0.04);

    let relief = (ridge + hills).max(knolls) * valley;
    (relief * max_height).clamp(0.0, max_height)
}

/// Rounded knoll at (cx, cy) with radius `r` and relative peak height.
fn knoll(nx: f64, ny: f64, cx: f64, cy: f64, r: f64, peak: f64) -> f64 {
    let d2 = ((nx - cx) / r).powi(2) + ((ny - cy) / r).powi(2);
    if d2 > 1.0 {
        return 0.0;
    }
    let t = 1.0 - d2;
    peak * t * t
}

/// 0 below `edge0`, 1 above `edge1`, smooth in between.
fn smooth_step(x: f64, edge0: f64, edge1: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
