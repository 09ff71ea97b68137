//! tile-prep: MBTiles inspection, synthetic pyramids and offline firing solutions.
//!
//! Usage:
//!   tile-prep info map.mbtiles
//!   tile-prep synthetic --output height.mbtiles --zoom 4 --kind height
//!   tile-prep solve --heightmap height.mbtiles --from 120,900 --to 700,400
//!   tile-prep solve-dsm --hgt N48E011.hgt --from 48.137,11.575 --to 48.157,11.59

mod synthetic;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fireplot_core::constants::DEFAULT_MAX_HEIGHT;
use fireplot_core::types::{GeoPosition, MapPosition};
use fireplot_engine::{EngineConfig, GeodeticFrame, RasterFrame, TargetFrame, TargetingEngine};
use fireplot_terrain::hgt::load_hgt;
use fireplot_terrain::{DsmSampler, Sampling, TerrainService, TileHeightSampler, TilePyramid, TileStore};

use crate::synthetic::{write_pyramid, PyramidKind};

#[derive(Parser)]
#[command(name = "tile-prep")]
#[command(author, version, about = "Tile and targeting utilities for fireplot", long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show zoom range and tile count of an MBTiles file
    Info {
        /// MBTiles file
        input: PathBuf,
    },
    /// Generate a synthetic tile pyramid
    Synthetic {
        /// Output MBTiles file (must not exist)
        #[arg(short, long)]
        output: PathBuf,
        /// Deepest zoom level to generate
        #[arg(short, long, default_value = "3")]
        zoom: u8,
        /// Heightmap or colored map tiles
        #[arg(short, long, value_enum, default_value = "height")]
        kind: PyramidKind,
        /// Tile edge length in pixels
        #[arg(long, default_value = "256")]
        tile_size: u32,
        /// Elevation of a white heightmap pixel (meters)
        #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT)]
        max_height: f64,
    },
    /// Firing solution between two map pixels over a heightmap (raster mode)
    Solve {
        /// Heightmap MBTiles file
        #[arg(long)]
        heightmap: PathBuf,
        /// Emplacement as x,y map pixels
        #[arg(long, value_parser = parse_pair)]
        from: (f64, f64),
        /// Target as x,y map pixels
        #[arg(long, value_parser = parse_pair)]
        to: (f64, f64),
        /// Engine configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Firing solution between two lat,lon points over an HGT elevation tile
    SolveDsm {
        /// SRTM/NASADEM .hgt file
        #[arg(long)]
        hgt: PathBuf,
        /// Emplacement as lat,lon
        #[arg(long, value_parser = parse_pair)]
        from: (f64, f64),
        /// Target as lat,lon
        #[arg(long, value_parser = parse_pair)]
        to: (f64, f64),
        /// Interpolate between cells instead of taking the nearest
        #[arg(long)]
        bilinear: bool,
        /// Engine configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse "a,b" into two floats.
fn parse_pair(s: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        bail!("expected two comma-separated numbers, got: {s}");
    }
    let a: f64 = parts[0].trim().parse().context("Invalid first number")?;
    let b: f64 = parts[1].trim().parse().context("Invalid second number")?;
    if !(a.is_finite() && b.is_finite()) {
        bail!("coordinates must be finite, got: {s}");
    }
    Ok((a, b))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load(p).with_context(|| format!("Failed to load {}", p.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Place one emplacement, designate one target, and print the result as JSON.
fn solve_and_print<F, T>(engine: &mut TargetingEngine<F, T>, from: F::Point, to: F::Point) -> Result<()>
where
    F: TargetFrame,
    T: TerrainService<F::Point>,
{
    engine.place_emplacement(from)?;
    let emplacement_elevation = engine.terrain().elevation_at(&from);
    let target_elevation = engine.terrain().elevation_at(&to);
    let solution = engine.designate_target(to);
    if solution.is_none() {
        info!(max_range = engine.profile().max_range, "target out of range");
    }

    let report = json!({
        "mode": F::MODE,
        "emplacement": { "position": format!("{from:?}"), "elevation": emplacement_elevation },
        "target": { "position": format!("{to:?}"), "elevation": target_elevation },
        "solution": solution,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => {
            let store = TileStore::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let (min, max) = store.zoom_range();
            println!("File: {}", input.display());
            println!("Zoom levels: {min}..={max}");
            match store.tile_count() {
                Some(n) => println!("Tiles: {n}"),
                None => println!("Tiles: unknown"),
            }
        }

        Commands::Synthetic {
            output,
            zoom,
            kind,
            tile_size,
            max_height,
        } => {
            let written = write_pyramid(&output, kind, zoom, tile_size, max_height)?;
            println!("{written} tiles saved to: {}", output.display());
        }

        Commands::Solve {
            heightmap,
            from,
            to,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let store = TileStore::open(&heightmap)
                .with_context(|| format!("Failed to open {}", heightmap.display()))?;
            let pyramid = TilePyramid::new(store.zoom_range().1, config.tile_size);
            let sampler = TileHeightSampler::new(store, pyramid, config.max_height)
                .with_cache(config.tile_cache_capacity);

            let mut engine = TargetingEngine::new(config, RasterFrame::new(pyramid), sampler)?;
            let result = solve_and_print(
                &mut engine,
                MapPosition::new(from.0, from.1),
                MapPosition::new(to.0, to.1),
            );
            engine.terrain_mut().close();
            result?;
        }

        Commands::SolveDsm {
            hgt,
            from,
            to,
            bilinear,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let grid = load_hgt(&hgt).with_context(|| format!("Failed to load {}", hgt.display()))?;
            let sampling = if bilinear {
                Sampling::Bilinear
            } else {
                Sampling::Nearest
            };
            let sampler = DsmSampler::new(grid).with_sampling(sampling);

            // The pyramid only matters for display; use street-level tiles
            let frame = GeodeticFrame::new(TilePyramid::new(15, config.tile_size));
            let mut engine = TargetingEngine::new(config, frame, sampler)?;
            solve_and_print(
                &mut engine,
                GeoPosition::new(from.0, from.1),
                GeoPosition::new(to.0, to.1),
            )?;
        }
    }

    Ok(())
}
