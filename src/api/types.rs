//! API types: envelope, raw request/reply, the transport seam and errors.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by the transport client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A request failed client-side validation and was never sent.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// The HTTP request could not be completed (connect, DNS, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// No response within the client-side timeout budget.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Non-2xx response that carried no failure envelope.
    #[error("unexpected response status {status}")]
    Status { status: u16, body: String },

    /// The response body was not a valid envelope for the expected type.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A configuration value could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether a manual retry might succeed. Nothing in this crate retries.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Request(_) | Self::Timeout(_) | Self::Status { status: 429 | 500..=599, .. }
        )
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// Uniform response wrapper returned by every backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn ok(data: Option<T>, message: impl Into<String>) -> Self {
        Self { success: true, data, message: message.into(), error: None }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self { success: false, data: None, message: message.into(), error: Some(error.into()) }
    }

    /// The most specific failure text: `error` when present and non-empty, else `message`.
    #[must_use]
    pub fn failure_reason(&self) -> String {
        match self.error.as_deref() {
            Some(error) if !error.is_empty() => error.to_owned(),
            _ => self.message.clone(),
        }
    }
}

// =============================================================================
// RAW REQUEST / REPLY
// =============================================================================

/// A request as handed to a [`Transport`]. `path` is absolute from the server root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// Status and body text of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

impl ApiReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// TRANSPORT SEAM
// =============================================================================

/// Raw request/reply exchange with the backend.
///
/// Implementations only report failures that prevented a reply; any HTTP
/// status, including 4xx/5xx, comes back as an [`ApiReply`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and wait for its reply.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] or [`ApiError::Timeout`] when no reply
    /// could be obtained.
    async fn execute(&self, request: ApiRequest) -> Result<ApiReply, ApiError>;
}

/// Normalize a reply into an envelope.
///
/// The backend answers logical failures (not found, bad input) with a 4xx/5xx
/// status and a `success:false` envelope; those are returned as `Ok` so
/// callers can inspect them. A non-2xx reply without such an envelope is a
/// transport failure.
///
/// # Errors
///
/// Returns [`ApiError::Status`] or [`ApiError::Decode`] as described above.
pub fn decode_reply<T: DeserializeOwned>(reply: ApiReply) -> Result<Envelope<T>, ApiError> {
    if reply.is_success() {
        return serde_json::from_str::<Envelope<T>>(&reply.body).map_err(|e| ApiError::Decode(e.to_string()));
    }
    match serde_json::from_str::<Envelope<T>>(&reply.body) {
        Ok(envelope) if !envelope.success => Ok(envelope),
        _ => Err(ApiError::Status { status: reply.status, body: reply.body }),
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
