//! Remote error type

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status used when the client itself classified a response as failed,
/// e.g. a read payload carrying an error `message`.
pub const CLIENT_DETECTED_CODE: i32 = -1;

/// Status used when no HTTP response was received at all.
pub const NO_RESPONSE_CODE: i32 = 0;

/// Failure of a remote call
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} (status {code})")]
pub struct RemoteError {
    pub code: i32,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Non-2xx HTTP status
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(i32::from(status), message)
    }

    /// Error reported inside an otherwise successful payload
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(CLIENT_DETECTED_CODE, message)
    }

    /// Body could not be decoded into the expected shape
    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::new(CLIENT_DETECTED_CODE, format!("Unexpected response body: {}", err))
    }

    /// Request never produced a response
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::new(NO_RESPONSE_CODE, format!("Request failed: {}", err))
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error envelope the management API uses for failures
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub status_code: Option<i32>,
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Extract an embedded error message from a JSON payload, if present
    pub fn embedded_message(payload: &serde_json::Value) -> Option<String> {
        let message = payload.as_object()?.get("message")?;
        Some(match message {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors_pick_codes() {
        assert_eq!(RemoteError::http(404, "nope").code, 404);
        assert_eq!(RemoteError::api("x").code, CLIENT_DETECTED_CODE);
        assert_eq!(RemoteError::transport("refused").code, NO_RESPONSE_CODE);
    }

    #[test]
    fn test_embedded_message_detected() {
        let payload = json!({"statusCode": 404, "message": "SIM not found"});
        assert_eq!(
            ApiErrorBody::embedded_message(&payload).as_deref(),
            Some("SIM not found")
        );
        assert!(ApiErrorBody::embedded_message(&json!({"iccid": "1"})).is_none());
        assert!(ApiErrorBody::embedded_message(&json!([1, 2])).is_none());
    }
}
