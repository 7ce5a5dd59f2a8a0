//! Shared utilities for simfleet
//!
//! This crate provides:
//! - The `Iccid` identifier type and comma-separated list parsing
//! - Clock helpers (wall-clock time with debug-only mock time)
//! - Input error types
//! - Default paths for config, session and audit log files

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
