//! Token exchange

use serde::Deserialize;
use serde_json::json;
use simfleet_api::{RemoteError, RemoteResult, CLIENT_DETECTED_CODE};
use std::fmt;
use tracing::debug;

use crate::{ApiRequest, Transport};

pub const TOKEN_PATH: &str = "/oauth/token";

/// Operator credentials for the token endpoint
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /oauth/token` payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(rename = "access_token")]
    access_token: Option<String>,
    status_code: Option<i32>,
    message: Option<String>,
}

/// Successful token exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub status: u16,
}

/// Exchange Basic-auth credentials for a bearer token.
///
/// A failure carries the server-reported status and message.
pub async fn exchange_credentials(
    transport: &dyn Transport,
    credentials: &Credentials,
) -> RemoteResult<IssuedToken> {
    let request = ApiRequest::post(TOKEN_PATH)
        .basic(&credentials.username, &credentials.password)
        .json(json!({ "grant_type": "client_credentials" }));

    let response = transport.send(request).await?;
    debug!(status = response.status, "Token endpoint answered");

    let parsed: Option<TokenResponse> = serde_json::from_str(&response.body).ok();

    // Same rule as every other call: only 200/201 count as success
    let accepted = matches!(response.status, 200 | 201);

    match parsed {
        Some(TokenResponse {
            access_token: Some(token),
            ..
        }) if accepted && !token.is_empty() => Ok(IssuedToken {
            token,
            status: response.status,
        }),
        Some(body) => {
            let code = if accepted {
                body.status_code.unwrap_or(CLIENT_DETECTED_CODE)
            } else {
                i32::from(response.status)
            };
            // The body may hold a token; never echo it
            let message = body
                .message
                .unwrap_or_else(|| format!("HTTP status code: {}", response.status));
            Err(RemoteError::new(code, message))
        }
        None if accepted => Err(RemoteError::decode("no access_token in response")),
        None => Err(RemoteError::http(response.status, response.message())),
    }
}
