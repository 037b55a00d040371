//! Transport contract
//!
//! A [`Transport`] sends one [`Payload`] as described by a [`RequestConfig`]
//! and reports the server's answer. Retries, auth headers and timeouts are
//! the transport's concern; the engine calls [`Transport::send`] exactly once
//! per submission.

mod http;
mod payload;

pub use http::ReqwestTransport;
pub use payload::*;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;

/// HTTP method of a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Post,
    Put,
    Patch,
    Get,
    Delete,
}

impl Method {
    /// Returns the method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Get => "GET",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Get => reqwest::Method::GET,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how a form is submitted.
///
/// Opaque to the engine; only the transport reads it.
///
/// ```
/// use authform_lib::transport::{Method, RequestConfig};
///
/// let request: RequestConfig = serde_json::from_str(
///     r#"{ "url": "https://example.com/login", "headers": { "X-Client": "cli" }, "timeoutMs": 5000 }"#,
/// ).unwrap();
/// assert_eq!(request.method, Method::Post);
/// assert_eq!(request.timeout().map(|t| t.as_secs()), Some(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    /// HTTP method.
    #[serde(default)]
    pub method: Method,
    /// Absolute target URL.
    pub url: String,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RequestConfig {
    /// Creates a POST request to `url`.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Creates a request with the given method.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: None,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// A successful answer from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body; `Null` when the body was empty.
    pub body: Value,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Sends form payloads.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `payload` as described by `request`.
    ///
    /// Non-success answers must be reported as [`TransportError::Http`] so the
    /// server's message can reach the user.
    async fn send(
        &self,
        request: &RequestConfig,
        payload: &Payload,
    ) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_config_round_trips_camel_case() {
        let request = RequestConfig::post("https://example.com/signup")
            .header("Authorization", "Bearer abc")
            .with_timeout(Duration::from_secs(2));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["timeoutMs"], 2000);
        assert_eq!(json["headers"]["Authorization"], "Bearer abc");
    }

    #[test]
    fn test_method_defaults_to_post() {
        let request: RequestConfig = serde_json::from_str(r#"{ "url": "http://x" }"#).unwrap();
        assert_eq!(request.method, Method::Post);
        assert!(request.headers.is_empty());
        assert_eq!(request.timeout(), None);
        assert_eq!(reqwest::Method::from(Method::Patch), reqwest::Method::PATCH);
    }
}
