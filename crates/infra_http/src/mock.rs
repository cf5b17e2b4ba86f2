//! Scripted in-memory transport for tests
//!
//! Replies are queued per `(method, path)` and consumed in order; when a
//! route's queue is empty its sticky default answers, otherwise a 404.
//! Every request is recorded for later assertions.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::TransportError;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};

/// A scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with a status and JSON body
    Json { status: u16, body: Value },
    /// Wait, then answer with the inner reply
    Delayed { delay: Duration, reply: Box<MockReply> },
    /// Fail as a transport-level timeout
    Timeout,
    /// Fail as an unreachable host
    Unreachable,
    /// Never answer; the client's own timeout must fire
    Hang,
}

impl MockReply {
    pub fn json(status: u16, body: Value) -> Self {
        MockReply::Json { status, body }
    }

    pub fn ok(body: Value) -> Self {
        MockReply::json(200, body)
    }

    pub fn status(status: u16) -> Self {
        MockReply::json(status, serde_json::json!({ "detail": format!("status {}", status) }))
    }

    pub fn delayed(self, delay: Duration) -> Self {
        MockReply::Delayed {
            delay,
            reply: Box::new(self),
        }
    }
}

/// A request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub body: RequestBody,
}

impl RecordedRequest {
    /// JSON body, if the request carried one
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

type RouteKey = (HttpMethod, String);

/// Scripted transport
#[derive(Debug, Default)]
pub struct MockTransport {
    queued: Mutex<HashMap<RouteKey, VecDeque<MockReply>>>,
    defaults: Mutex<HashMap<RouteKey, MockReply>>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

fn path_of(url: &str) -> String {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    match rest.find('/') {
        Some(idx) => rest[idx..].to_string(),
        None => "/".to_string(),
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a one-shot reply for a route
    pub fn enqueue(&self, method: HttpMethod, path: &str, reply: MockReply) {
        self.queued
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Sets the reply used once a route's queue is empty
    pub fn set_default(&self, method: HttpMethod, path: &str, reply: MockReply) {
        self.defaults
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert((method, path.to_string()), reply);
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Number of requests received for a route
    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.recorded
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn next_reply(&self, key: &RouteKey) -> Option<MockReply> {
        let queued = self
            .queued
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get_mut(key)
            .and_then(VecDeque::pop_front);
        queued.or_else(|| {
            self.defaults
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .get(key)
                .cloned()
        })
    }
}

async fn play(reply: MockReply) -> Result<HttpResponse, TransportError> {
    let mut reply = reply;
    loop {
        match reply {
            MockReply::Json { status, body } => {
                let body = serde_json::to_vec(&body).map_err(|e| TransportError::Body(e.to_string()))?;
                return Ok(HttpResponse { status, body });
            }
            MockReply::Delayed { delay, reply: inner } => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
            MockReply::Timeout => return Err(TransportError::Timeout),
            MockReply::Unreachable => {
                return Err(TransportError::Connect("host unreachable".to_string()))
            }
            MockReply::Hang => std::future::pending::<()>().await,
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = path_of(&request.url);
        self.recorded
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(RecordedRequest {
                method: request.method,
                path: path.clone(),
                authorization: request.header("Authorization").map(str::to_string),
                request_id: request.header("X-Request-Id").map(str::to_string),
                body: request.body.clone(),
            });

        match self.next_reply(&(request.method, path.clone())) {
            Some(reply) => play(reply).await,
            None => Ok(HttpResponse {
                status: 404,
                body: format!(r#"{{"detail":"no mock route for {} {}"}}"#, request.method, path)
                    .into_bytes(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_of() {
        assert_eq!(path_of("http://mock.local/claims/1/submit"), "/claims/1/submit");
        assert_eq!(path_of("http://mock.local"), "/");
    }
}
