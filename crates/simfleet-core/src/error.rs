//! Error taxonomy for commands

use simfleet_api::RemoteError;
use simfleet_store::StoreError;
use simfleet_util::InputError;
use thiserror::Error;

/// Missing or unusable session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No session found; run `simfleet token` to sign in")]
    NoSession,

    #[error("Session expired {age_secs}s after issuance; run `simfleet token` to sign in again")]
    SessionExpired { age_secs: i64 },

    #[error("Session file error: {0}")]
    Store(#[from] StoreError),
}

/// Token acquisition failure
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token request rejected: {0}")]
    Rejected(RemoteError),

    #[error("Failed to persist session: {0}")]
    Store(#[from] StoreError),
}

/// Bad usage range expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },
}

/// Fatal command failure
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Audit log error: {0}")]
    Store(#[from] StoreError),
}

impl CommandError {
    /// Whether the operator's input was at fault
    pub fn is_input_error(&self) -> bool {
        matches!(self, CommandError::Input(_) | CommandError::DateRange(_))
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
