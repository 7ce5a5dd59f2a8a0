//! Wire types for the SIM management API
//!
//! This crate defines:
//! - `SimRecord` as returned by `GET /v1/sims` and `GET /v1/sims/{iccid}`
//! - Mutation intents and the full-record patches posted to `POST /v1/sims`
//! - Usage samples from `GET /v1/sims/{iccid}/usage`
//! - `RemoteError`, the `{code, message}` pair every remote failure becomes

mod error;
mod mutation;
mod types;
mod usage;

pub use error::*;
pub use mutation::*;
pub use types::*;
pub use usage::*;
