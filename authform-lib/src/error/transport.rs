//! Transport error types

use serde_json::Value;

/// Errors that can occur while transmitting a form payload.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, parsed as JSON when possible.
        body: Value,
    },

    /// Network error during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request configuration could not be turned into a request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failure reported by a custom transport.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, body: Value) -> Self {
        Self::Http { status, body }
    }

    /// Creates a new error with a plain message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body if the server answered.
    pub fn response_body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns the server-provided `message` from the response body.
    ///
    /// Empty messages are treated as missing.
    pub fn server_message(&self) -> Option<&str> {
        self.response_body()?
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }

    /// Derives the message shown to the user.
    ///
    /// Falls back from the server message to this error's own message, and
    /// finally to `default`.
    pub fn display_message(&self, default: &str) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        let message = self.to_string();
        if message.is_empty() {
            default.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_server_message_wins() {
        let error = TransportError::http(401, json!({ "message": "Invalid credentials" }));
        assert_eq!(error.status_code(), Some(401));
        assert_eq!(error.display_message("fallback"), "Invalid credentials");
    }

    #[test]
    fn test_transport_message_when_body_has_none() {
        let error = TransportError::http(500, json!({ "error": "boom" }));
        assert_eq!(error.server_message(), None);
        assert_eq!(
            error.display_message("fallback"),
            "Request failed with status code 500"
        );
    }

    #[test]
    fn test_empty_server_message_is_ignored() {
        let error = TransportError::http(400, json!({ "message": "" }));
        assert_eq!(
            error.display_message("fallback"),
            "Request failed with status code 400"
        );
    }

    #[test]
    fn test_default_when_nothing_else() {
        let error = TransportError::other("");
        assert_eq!(error.display_message("Something went wrong."), "Something went wrong.");
    }
}
