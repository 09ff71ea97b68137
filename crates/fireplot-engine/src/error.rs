//! Error types for the targeting engine.

use fireplot_terrain::TerrainError;
use thiserror::Error;

/// Placement rejected because the registry already holds `capacity` emplacements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("emplacement limit reached ({capacity})")]
pub struct LimitReached {
    pub capacity: usize,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    LimitReached(#[from] LimitReached),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
