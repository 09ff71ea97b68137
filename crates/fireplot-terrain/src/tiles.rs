//! Read-only access to MBTiles zoom pyramids.
//!
//! The backing store is an SQLite database with a
//! `tiles(zoom_level, tile_column, tile_row, tile_data)` table whose rows use
//! the bottom-origin TMS convention. Callers address tiles top-origin; the
//! flip happens here.

use std::path::{Path, PathBuf};

use fireplot_core::constants::MAX_ZOOM;
use fireplot_core::enums::TileKind;
use fireplot_core::types::TileAddress;
use image::{ColorType, GrayImage, RgbImage};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info, trace, warn};

use crate::error::{Result, TerrainError};

const TILE_QUERY: &str =
    "SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3";

#[derive(Debug, Clone)]
enum Pixels {
    Rgb(RgbImage),
    Gray(GrayImage),
}

/// A decoded raster tile.
#[derive(Debug, Clone)]
pub struct Tile {
    pixels: Pixels,
}

impl Tile {
    /// Decode a PNG/JPEG blob. Grayscale sources stay single-channel,
    /// everything else becomes RGB.
    pub fn decode(bytes: &[u8]) -> image::ImageResult<Self> {
        let img = image::load_from_memory(bytes)?;
        let pixels = match img.color() {
            ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => {
                Pixels::Gray(img.to_luma8())
            }
            _ => Pixels::Rgb(img.to_rgb8()),
        };
        Ok(Self { pixels })
    }

    pub fn from_gray(img: GrayImage) -> Self {
        Self {
            pixels: Pixels::Gray(img),
        }
    }

    pub fn from_rgb(img: RgbImage) -> Self {
        Self {
            pixels: Pixels::Rgb(img),
        }
    }

    pub fn kind(&self) -> TileKind {
        match self.pixels {
            Pixels::Rgb(_) => TileKind::Rgb,
            Pixels::Gray(_) => TileKind::Gray,
        }
    }

    pub fn width(&self) -> u32 {
        match &self.pixels {
            Pixels::Rgb(img) => img.width(),
            Pixels::Gray(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match &self.pixels {
            Pixels::Rgb(img) => img.height(),
            Pixels::Gray(img) => img.height(),
        }
    }

    /// Height channel at a pixel: the gray value, or red for RGB tiles.
    /// None outside the tile.
    pub fn channel_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(match &self.pixels {
            Pixels::Rgb(img) => img.get_pixel(x, y).0[0],
            Pixels::Gray(img) => img.get_pixel(x, y).0[0],
        })
    }

    /// Raw interleaved pixel bytes (3 per pixel for RGB, 1 for gray).
    pub fn as_raw(&self) -> &[u8] {
        match &self.pixels {
            Pixels::Rgb(img) => img.as_raw(),
            Pixels::Gray(img) => img.as_raw(),
        }
    }
}

/// Handle to an MBTiles database.
pub struct TileStore {
    path: PathBuf,
    conn: Option<Connection>,
    zoom_range: (u8, u8),
}

impl TileStore {
    /// Open a tile database read-only and read its zoom range.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(TerrainError::NotFound { path });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags).map_err(|e| corrupt(&path, e))?;

        let (min, max) = conn
            .query_row(
                "SELECT MIN(zoom_level), MAX(zoom_level) FROM tiles",
                [],
                |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .map_err(|e| corrupt(&path, e))?;

        let (min, max) = match (min, max) {
            (Some(min), Some(max)) => (min, max),
            _ => return Err(corrupt(&path, "tiles table is empty")),
        };
        if min < 0 || max > i64::from(MAX_ZOOM) {
            return Err(corrupt(&path, format!("zoom levels {min}..{max} out of range")));
        }

        info!(path = %path.display(), min_zoom = min, max_zoom = max, "opened tile database");
        Ok(Self {
            path,
            conn: Some(conn),
            zoom_range: (min as u8, max as u8),
        })
    }

    /// (min, max) zoom level present in the database.
    pub fn zoom_range(&self) -> (u8, u8) {
        self.zoom_range
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Raw encoded tile bytes. None when closed, out of the pyramid, or not stored.
    pub fn tile_blob(&self, address: TileAddress) -> Option<Vec<u8>> {
        let conn = self.conn.as_ref()?;
        if !address.is_valid() {
            return None;
        }

        let result = conn.prepare_cached(TILE_QUERY).and_then(|mut stmt| {
            stmt.query_row(
                params![address.zoom, address.col, address.tms_row()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
        });

        match result {
            Ok(Some(blob)) => Some(blob),
            Ok(None) => {
                trace!(%address, "tile not stored");
                None
            }
            Err(e) => {
                warn!(%address, error = %e, "tile query failed");
                None
            }
        }
    }

    /// Fetch and decode a tile. Missing or undecodable tiles yield None.
    pub fn get_tile(&self, address: TileAddress) -> Option<Tile> {
        let blob = self.tile_blob(address)?;
        match Tile::decode(&blob) {
            Ok(tile) => Some(tile),
            Err(e) => {
                warn!(%address, error = %e, "skipping undecodable tile");
                None
            }
        }
    }

    /// Number of stored tiles, None when closed or on query failure.
    pub fn tile_count(&self) -> Option<u64> {
        let conn = self.conn.as_ref()?;
        conn.query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get::<_, i64>(0))
            .ok()
            .map(|n| n as u64)
    }

    /// Release the database handle. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => debug!(path = %self.path.display(), "closed tile database"),
                Err((_, e)) => warn!(path = %self.path.display(), error = %e, "error closing tile database"),
            }
        }
    }
}

impl std::fmt::Debug for TileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileStore")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("zoom_range", &self.zoom_range)
            .finish()
    }
}

fn corrupt(path: &Path, reason: impl ToString) -> TerrainError {
    TerrainError::CorruptDatabase {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, Rgb};
    use std::io::Cursor;

    fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_gray_tile() {
        let img = GrayImage::from_pixel(4, 4, Luma([200]));
        let tile = Tile::decode(&png_bytes(image::DynamicImage::ImageLuma8(img))).unwrap();
        assert_eq!(tile.kind(), TileKind::Gray);
        assert_eq!(tile.channel_at(3, 3), Some(200));
        assert_eq!(tile.channel_at(4, 0), None);
    }

    #[test]
    fn test_decode_rgb_tile_reads_red() {
        let img = RgbImage::from_pixel(2, 2, Rgb([51, 0, 255]));
        let tile = Tile::decode(&png_bytes(image::DynamicImage::ImageRgb8(img))).unwrap();
        assert_eq!(tile.kind(), TileKind::Rgb);
        assert_eq!(tile.channel_at(1, 1), Some(51));
        assert_eq!(tile.as_raw().len(), 2 * 2 * 3);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(Tile::decode(b"definitely not a png").is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let err = TileStore::open("/nonexistent/dir/map.mbtiles").unwrap_err();
        assert!(matches!(err, TerrainError::NotFound { .. }));
    }
}
