//! Response classification
//!
//! Every command decides console output and audit content here.

use serde::{Deserialize, Serialize};

/// Outcome category of one remote interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    SoftFailure,
    HardFailure,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Only hard failures end the command with a non-zero status
    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::HardFailure)
    }
}

/// What to print and what to record for one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub outcome: Outcome,
    /// Console text, `None` when nothing should be printed
    pub console: Option<String>,
    pub log_message: String,
    pub http_code: i32,
}

/// Classify a status and message.
///
/// - 200/201: success, message printed
/// - negative: client-detected failure, printed unless
///   `suppress_console_on_error` (paged reads keep errors in the log only)
/// - anything else: hard failure, printed as the bare status code
pub fn classify(http_status: i32, message: &str, suppress_console_on_error: bool) -> Classification {
    let (outcome, console) = match http_status {
        200 | 201 => (Outcome::Success, Some(message.to_string())),
        s if s < 0 => (
            Outcome::SoftFailure,
            (!suppress_console_on_error).then(|| message.to_string()),
        ),
        s => (
            Outcome::HardFailure,
            Some(format!("Error: HTTP status code: {}", s)),
        ),
    };

    Classification {
        outcome,
        console,
        log_message: message.to_string(),
        http_code: http_status,
    }
}
