//! Request Context
//!
//! Context handed to the engine with every execution. Callers either build
//! one themselves or let the handler derive it from the inbound request.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, Method, Request};
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Header carrying a caller-assigned request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Context carried into the engine call
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID for tracing
    pub request_id: Uuid,

    pub method: Method,

    /// Request path, without the query string
    pub path: String,

    /// Inbound headers
    pub headers: HeaderMap,

    /// Free-form values for the engine (auth claims, tenant, ...)
    pub metadata: HashMap<String, Value>,

    /// Wall-clock receive time
    pub received_at: DateTime<Utc>,

    /// Point after which the engine should give up
    deadline: Option<Instant>,

    started_at: Instant,
}

impl RequestContext {
    /// Create an empty context with a fresh request id
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method: Method::POST,
            path: String::new(),
            headers: HeaderMap::new(),
            metadata: HashMap::new(),
            received_at: Utc::now(),
            deadline: None,
            started_at: Instant::now(),
        }
    }

    /// Derive a context from an inbound request. A UUID in `x-request-id`
    /// is reused as the request id.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .unwrap_or_else(Uuid::new_v4);

        Self {
            request_id,
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            headers: request.headers().clone(),
            ..Self::new()
        }
    }

    /// Add metadata for the engine
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Give the engine `timeout` from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the deadline has passed
    pub fn is_expired(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
