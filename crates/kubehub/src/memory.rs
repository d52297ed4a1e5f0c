//! In-process [`Transport`] for tests and offline use.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use http;
use serde_json::{json, Value};

use crate::{Method, Transport, TransportError};

/// One request as seen by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    /// Raw, still percent-encoded query string; `None` when there is none.
    pub query: Option<String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Whether the query carries `key=value`, compared in encoded form.
    pub fn has_query(&self, pair: &str) -> bool {
        self.query.as_deref().map_or(false, |q| q.split('&').any(|p| p == pair))
    }
}

type Reply = Result<Option<Value>, (u16, String)>;

/// Records every request and answers from canned replies queued per
/// `(method, path)`. Without a canned reply it behaves like a bare API
/// server: writes echo their body, reads 404, deletes succeed.
#[derive(Default)]
pub struct MemoryTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self { Self::default() }

    /// Queue a successful reply; `None` answers as a 404.
    pub fn reply(&self, method: Method, path: impl Into<String>, body: Option<Value>) -> &Self {
        self.push(method, path.into(), Ok(body))
    }

    /// Queue an API error reply.
    pub fn fail(&self, method: Method, path: impl Into<String>, code: u16, message: impl Into<String>) -> &Self {
        self.push(method, path.into(), Err((code, message.into())))
    }

    fn push(&self, method: Method, path: String, reply: Reply) -> &Self {
        let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        replies.entry((method, path)).or_default().push_back(reply);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).last().cloned()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: http::Request<Vec<u8>>) -> Result<Option<Value>, TransportError> {
        let method = Method::from_http(request.method())
            .ok_or_else(|| TransportError::Method(request.method().to_string()))?;
        let path = request.uri().path().to_string();
        let query = request.uri().query().filter(|q| !q.is_empty()).map(str::to_string);
        let bytes = request.into_body();
        let body = if bytes.is_empty() { None } else { Some(serde_json::from_slice::<Value>(&bytes)?) };

        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(RecordedRequest {
            method,
            path: path.clone(),
            query,
            body: body.clone(),
        });
        let canned = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&(method, path))
            .and_then(VecDeque::pop_front);
        match canned {
            Some(Ok(v)) => Ok(v),
            Some(Err((code, message))) => Err(TransportError::Api { code, message }),
            None => Ok(match method {
                Method::Get => None,
                Method::Post | Method::Put => body,
                Method::Delete => Some(json!({"kind": "Status", "status": "Success"})),
            }),
        }
    }
}
