//! Mock transport for unit/integration testing

use async_trait::async_trait;
use serde_json::{json, Value};
use simfleet_api::{RemoteError, RemoteResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::{ApiRequest, ApiResponse, Method, Transport};

#[derive(Debug, Clone)]
enum MockReply {
    Response(ApiResponse),
    Unreachable(String),
}

/// Scripted transport.
///
/// Replies are queued per `(method, path)`; the last reply for a route is
/// repeated once the queue is down to it. Unscripted routes answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockReply>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: MockReply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queue a JSON response
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        let body = if body.is_null() { String::new() } else { body.to_string() };
        self.push(method, path, MockReply::Response(ApiResponse::new(status, body)));
    }

    /// Queue a response with a raw body
    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, MockReply::Response(ApiResponse::new(status, body)));
    }

    /// Queue a failure where no response arrives
    pub fn unreachable(&self, method: Method, path: &str, reason: &str) {
        self.push(method, path, MockReply::Unreachable(reason.to_string()));
    }

    /// Every request sent so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests sent to a route
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn next_reply(&self, method: Method, path: &str) -> Option<MockReply> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> RemoteResult<ApiResponse> {
        let reply = self.next_reply(request.method, &request.path);
        self.requests.lock().unwrap().push(request);

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Unreachable(reason)) => Err(RemoteError::transport(reason)),
            None => Ok(ApiResponse::new(
                404,
                json!({"statusCode": 404, "message": "Not Found"}).to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_then_repeats_last() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/a", 200, json!({"n": 1}));
        mock.respond(Method::Get, "/a", 500, Value::Null);

        assert_eq!(mock.send(ApiRequest::get("/a")).await.unwrap().status, 200);
        assert_eq!(mock.send(ApiRequest::get("/a")).await.unwrap().status, 500);
        assert_eq!(mock.send(ApiRequest::get("/a")).await.unwrap().status, 500);
        assert_eq!(mock.count(Method::Get, "/a"), 3);
    }

    #[tokio::test]
    async fn test_unscripted_route_is_404() {
        let mock = MockTransport::new();
        let resp = mock.send(ApiRequest::post("/nowhere")).await.unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_is_error() {
        let mock = MockTransport::new();
        mock.unreachable(Method::Get, "/a", "connection refused");
        let err = mock.send(ApiRequest::get("/a")).await.unwrap_err();
        assert_eq!(err.code, simfleet_api::NO_RESPONSE_CODE);
    }
}
