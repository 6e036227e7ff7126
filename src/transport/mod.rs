//! Transport abstraction for authenticated API calls.
//!
//! Production code depends only on the [`ApiTransport`] trait; the
//! reqwest-backed [`HttpTransport`] is one implementation, and tests
//! inject an in-memory fake with the same contract.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use thiserror::Error;

/// Connection-level failure raised by a transport implementation.
///
/// Carries a message only: the secrets client treats any transport
/// failure as opaque and propagates it unmodified.
#[derive(Debug, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Options conveyed with a single API request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.json = Some(body);
        self
    }
}

/// Status code and raw body of an API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: String,
}

impl ApiResponse {
    /// Whether the response is outside the 2xx range.
    pub fn is_error(&self) -> bool {
        !(200..300).contains(&self.status_code)
    }

    /// The server's stated failure reason: the response body when it has
    /// one, otherwise the bare status code.
    pub fn failure_reason(&self) -> String {
        if self.body.trim().is_empty() {
            format!("HTTP {}", self.status_code)
        } else {
            self.body.trim().to_string()
        }
    }
}

/// Performs one authenticated API call and returns the raw response.
///
/// Timeouts and cancellation live behind this seam; callers issue one
/// request per invocation and never retry at this level.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn request(&self, url: &str, options: RequestOptions)
        -> Result<ApiResponse, TransportError>;
}
