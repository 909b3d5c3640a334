//! API error types.
//!
//! These error types represent failures when talking to the tutor backend.
//! Defined in `medboard-core` so the view state machines can classify
//! errors (session expiry vs. server detail vs. anything else) without
//! string matching.

use thiserror::Error;

/// Message shown when the backend rejects the stored session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Authentication failed. Please log in again.";

/// Errors that can occur when interacting with the tutor API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The API returned 401 for an authenticated request.
    #[error("unauthorized: session is missing or expired")]
    Unauthorized,

    /// The API returned an error response, optionally with a `detail` message.
    #[error("API error (HTTP {status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The client could not be built (bad base URL, unusable token).
    #[error("client configuration error: {0}")]
    Config(String),
}

/// How a failed request should be presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// Session is invalid: clear the token, inform the user, redirect to login.
    Unauthorized,
    /// The server explained what went wrong; show it verbatim.
    ServerDetail(String),
    /// Anything else; show the view's generic fallback.
    Unclassified,
}

impl ApiError {
    /// Returns `true` if this error means the stored session is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Classify the error for presentation.
    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::Unauthorized => ErrorClass::Unauthorized,
            ApiError::Server {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => ErrorClass::ServerDetail(detail.clone()),
            _ => ErrorClass::Unclassified,
        }
    }

    /// The message a view should display, using `fallback` for unclassified errors.
    pub fn user_message(&self, fallback: &str) -> String {
        match self.class() {
            ErrorClass::Unauthorized => SESSION_EXPIRED_MESSAGE.to_string(),
            ErrorClass::ServerDetail(detail) => detail,
            ErrorClass::Unclassified => fallback.to_string(),
        }
    }
}

/// Pull the human-readable `detail` out of an error response body.
///
/// The backend reports errors as `{"detail": "..."}`; request validation
/// failures arrive as `{"detail": [{"msg": "...", ...}]}`, in which case the
/// first message is used. Returns `None` for anything else.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        _ => None,
    }
}
