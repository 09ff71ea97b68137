//! Targeting engine for fireplot.
//!
//! Turns recognized gestures into viewport changes, emplacement edits and
//! firing solutions, and produces a `FrameSnapshot` for the renderer.
//! Headless and synchronous: every command completes before `handle` returns.

pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod registry;
pub mod solver;
pub mod viewport;

pub use fireplot_core as core;
pub use fireplot_terrain as terrain;

pub use config::{EngineConfig, SolverProfile};
pub use engine::TargetingEngine;
pub use error::{EngineError, LimitReached, Result};
pub use frame::{GeodeticFrame, RasterFrame, TargetFrame};
pub use registry::{Emplacement, EmplacementRegistry};
pub use solver::BallisticSolver;
pub use viewport::{ViewTransform, ViewportTransform};

#[cfg(test)]
mod tests;
