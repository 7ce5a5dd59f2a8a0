//! Input error types for simfleet

use thiserror::Error;

/// Malformed or missing command input, detected before any remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("No ICCIDs given")]
    EmptyIccidList,

    #[error("Invalid ICCID '{0}': expected 18-22 digits")]
    InvalidIccid(String),

    #[error("Got {iccids} ICCIDs but {labels} labels; the lists must have the same length")]
    ArityMismatch { iccids: usize, labels: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl InputError {
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type InputResult<T> = std::result::Result<T, InputError>;
