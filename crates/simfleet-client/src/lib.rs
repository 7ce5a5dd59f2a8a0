//! Management API client for simfleet
//!
//! This crate defines the capability-based interface to the remote API and
//! everything built directly on top of it:
//! - `Transport`: send one request, get one response
//! - `HttpTransport`: the reqwest-backed implementation
//! - `MockTransport`: scripted responses for tests
//! - Token exchange and the `SimRepository` read/write surface

mod auth;
mod http;
mod mock;
mod repository;
mod transport;

pub use auth::*;
pub use http::*;
pub use mock::*;
pub use repository::*;
pub use transport::*;
