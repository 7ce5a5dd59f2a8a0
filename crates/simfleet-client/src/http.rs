//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use simfleet_api::{RemoteError, RemoteResult};
use tracing::debug;

use crate::{ApiRequest, ApiResponse, Auth, Method, Transport};

/// Transport talking HTTPS to the management API.
///
/// No timeout is configured: a request that never completes blocks the
/// command until the process is terminated.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> RemoteResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("simfleet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RemoteError::transport)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> RemoteResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        builder = builder.header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.auth {
            Auth::None => builder,
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
            Auth::Bearer(token) => builder.bearer_auth(token),
        };

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, path = %request.path, "Sending request");

        let response = builder.send().await.map_err(RemoteError::transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(RemoteError::transport)?;

        debug!(method = %request.method, path = %request.path, status, "Response received");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let transport = HttpTransport::new("https://api.example.com/management-api/").unwrap();
        assert_eq!(transport.base_url(), "https://api.example.com/management-api");
    }
}
