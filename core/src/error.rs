//! Error types for the task API client.
//!
//! # Design
//! `NotFound` and `Unauthorized` get dedicated variants because callers
//! treat them differently: a missing task is routine, a 401 ends the
//! session. Every status-derived variant keeps the server-supplied message
//! (the JSON `message`, `detail` or `error` field) when the body has one, so
//! `ApiError::message` can prefer it over the generic transport wording.

use serde_json::Value;
use thiserror::Error;

use crate::http::HttpResponse;

/// Errors returned by `Endpoints` parse methods, transports, and the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound { message: Option<String> },

    /// The server returned 401; the session has been cleared by the client.
    #[error("unauthorized")]
    Unauthorized { message: Option<String> },

    /// The server returned any other non-2xx status.
    #[error("request failed with status code {status}")]
    Http { status: u16, message: Option<String> },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Map a non-success response to the matching variant.
    pub fn from_response(response: &HttpResponse) -> Self {
        let message = server_message(&response.body);
        match response.status {
            401 => ApiError::Unauthorized { message },
            404 => ApiError::NotFound { message },
            status => ApiError::Http { status, message },
        }
    }

    /// The message the server put in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { message }
            | ApiError::Unauthorized { message }
            | ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Human-readable text for display: the server's message when present,
    /// otherwise the transport-level description.
    pub fn message(&self) -> String {
        match self.server_message() {
            Some(msg) => msg.to_string(),
            None => self.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a string message out of a JSON error body.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .filter_map(|key| value.get(key))
        .find_map(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn server_message_is_preferred() {
        let err = ApiError::from_response(&response(400, r#"{"message":"Title too long"}"#));
        assert!(matches!(err, ApiError::Http { status: 400, .. }));
        assert_eq!(err.message(), "Title too long");
    }

    #[test]
    fn detail_field_is_recognised() {
        let err = ApiError::from_response(&response(404, r#"{"detail":"Task not found"}"#));
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.message(), "Task not found");
    }

    #[test]
    fn falls_back_to_status_text() {
        let err = ApiError::from_response(&response(500, "internal error"));
        assert_eq!(err.message(), "request failed with status code 500");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn unauthorized_has_its_own_variant() {
        let err = ApiError::from_response(&response(401, ""));
        assert!(matches!(err, ApiError::Unauthorized { message: None }));
    }

    #[test]
    fn transport_errors_have_no_status() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.message(), "network error: connection refused");
    }
}
