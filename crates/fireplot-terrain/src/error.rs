//! Error types for tile and terrain access.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while opening tile databases or sampling terrain.
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("tile database not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("corrupt tile database {}: {reason}", path.display())]
    CorruptDatabase { path: PathBuf, reason: String },

    #[error("no elevation coverage at {lat:.6},{lon:.6}")]
    OutOfCoverage { lat: f64, lon: f64 },

    #[error("invalid elevation raster: {0}")]
    InvalidRaster(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TerrainError {
    /// Whether callers may degrade (elevation 0) instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TerrainError::OutOfCoverage { .. })
    }
}

/// Result alias for terrain operations.
pub type Result<T> = std::result::Result<T, TerrainError>;
