//! Core types and definitions for the fireplot targeting engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! coordinates, tile addresses, commands, feedback events, frame snapshots
//! and constants. It performs no I/O.

pub mod commands;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;
