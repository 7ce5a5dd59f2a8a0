//! Core of simfleet
//!
//! This crate holds every piece with real invariants:
//! - Session lifecycle (acquire, persist, one-hour validity)
//! - Response classification shared by all commands
//! - Usage window resolution and clamping
//! - Read-modify-write bulk mutations with per-ICCID audit entries
//! - `FleetEngine`, which runs each command through the above

mod bulk;
mod classify;
mod date_range;
mod engine;
mod error;
mod report;
mod session;

pub use bulk::*;
pub use classify::*;
pub use date_range::*;
pub use engine::*;
pub use error::*;
pub use report::*;
pub use session::*;
