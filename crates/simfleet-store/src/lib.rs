//! Local persistence for simfleet
//!
//! Provides:
//! - Audit log (plain text, newest entry first)
//! - Session file (bearer token plus issuance time)
//!
//! Both are single files accessed by one process at a time; there is no
//! locking between concurrent invocations.

mod audit;
mod session;
mod traits;

pub use audit::*;
pub use session::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Malformed entry: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Create the parent directory of `path` if needed
pub(crate) fn ensure_parent(path: &std::path::Path) -> StoreResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
