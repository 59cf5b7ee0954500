//! Uniform error shape for API calls and the flows built on them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message shown when no response was received or the response was unusable.
pub const TRANSPORT_MESSAGE: &str = "Server error. Try again later.";

/// Categories of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// The call needs a logged-in session and none exists; nothing was sent.
    NotAuthenticated,
    /// The server answered with a non-2xx status.
    Server,
    /// No response was received (connect failure, reset, DNS, ...).
    Transport,
    /// A 2xx response whose body could not be decoded.
    InvalidResponse,
    /// The local token store could not be read or written.
    Storage,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::NotAuthenticated => write!(f, "not_authenticated"),
            ApiErrorKind::Server => write!(f, "server"),
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::InvalidResponse => write!(f, "invalid_response"),
            ApiErrorKind::Storage => write!(f, "storage"),
        }
    }
}

/// Structured API error with kind and a message suitable for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status for `Server` errors
    pub status: Option<u16>,
    /// Whether `message` came from the response body
    #[serde(default)]
    pub from_server: bool,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            from_server: false,
        }
    }

    /// Local short-circuit: the caller must log in first.
    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotAuthenticated, message)
    }

    /// Creates an error for a non-2xx status.
    ///
    /// Uses the server's message when the body carries one, otherwise a
    /// generic fallback that callers may replace with [`ApiError::or_fallback`].
    pub fn http_status(status: u16, body: Option<&Value>) -> Self {
        match body.and_then(server_message) {
            Some(message) => Self {
                kind: ApiErrorKind::Server,
                message,
                status: Some(status),
                from_server: true,
            },
            None => Self {
                kind: ApiErrorKind::Server,
                message: format!("Request failed (HTTP {status})"),
                status: Some(status),
                from_server: false,
            },
        }
    }

    pub fn transport() -> Self {
        Self::new(ApiErrorKind::Transport, TRANSPORT_MESSAGE)
    }

    pub fn invalid_response() -> Self {
        Self::new(ApiErrorKind::InvalidResponse, TRANSPORT_MESSAGE)
    }

    pub fn storage(err: &anyhow::Error) -> Self {
        Self::new(ApiErrorKind::Storage, format!("Token storage failed: {err:#}"))
    }

    /// Replaces the generic message of a server error that carried none.
    #[must_use]
    pub fn or_fallback(mut self, fallback: &str) -> Self {
        if self.kind == ApiErrorKind::Server && !self.from_server {
            self.message = fallback.to_string();
        }
        self
    }

    pub fn is_not_authenticated(&self) -> bool {
        self.kind == ApiErrorKind::NotAuthenticated
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Pulls a human-readable message out of an error body.
///
/// Accepts `{"error": "..."}`, validation maps like
/// `{"error": {"title": ["Missing data for required field."]}}`, and the
/// `{"msg": "..."}` shape used by the JWT layer.
fn server_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
        Some(Value::Object(fields)) if !fields.is_empty() => {
            let parts: Vec<String> = fields
                .iter()
                .map(|(field, detail)| format!("{field}: {}", flatten_detail(detail)))
                .collect();
            return Some(parts.join("; "));
        }
        _ => {}
    }

    body.get("msg")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(ToString::to_string)
}

fn flatten_detail(detail: &Value) -> String {
    match detail {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_detail)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
