use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Failure of an outbound call.
///
/// `Clone` so that a single shared fetch can hand the same failure to every
/// caller waiting on it.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[source] Arc<reqwest::Error>),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to encode request body: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(Arc::new(err))
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(Self::message_or_body(body)),
            404 => ApiError::NotFound(Self::message_or_body(body)),
            422 => ApiError::Validation(Self::validation_messages(body)),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(Self::truncate_body(body)),
            _ => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }

    /// True for failures caused by the server refusing the request itself,
    /// as opposed to the network or the server being unavailable.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::AccessDenied(_)
                | ApiError::Unauthorized
                | ApiError::NotFound(_)
                | ApiError::Validation(_)
        )
    }

    /// The backend wraps errors as `{"message": "...", "errors": {...}}`.
    fn message_or_body(body: &str) -> String {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| Self::truncate_body(body))
    }

    /// Flatten a 422 payload's per-field messages into one line.
    fn validation_messages(body: &str) -> String {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return Self::truncate_body(body);
        };

        let mut messages = Vec::new();
        if let Some(errors) = value.get("errors").and_then(Value::as_object) {
            for field_messages in errors.values() {
                match field_messages {
                    Value::Array(items) => messages.extend(
                        items.iter().filter_map(Value::as_str).map(String::from),
                    ),
                    Value::String(s) => messages.push(s.clone()),
                    _ => {}
                }
            }
        }

        if messages.is_empty() {
            Self::message_or_body(body)
        } else {
            messages.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_not_found_prefers_backend_message() {
        let err = ApiError::from_status(
            StatusCode::NOT_FOUND,
            r#"{"success": false, "message": "Vehicle not found"}"#,
        );
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Vehicle not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_messages_are_flattened() {
        let body = r#"{"message": "The given data was invalid.",
            "errors": {"email": ["The email has already been taken."],
                       "password": "The password field is required."}}"#;
        match ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body) {
            ApiError::Validation(msg) => {
                assert!(msg.contains("The email has already been taken."));
                assert!(msg.contains("The password field is required."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_without_field_errors_uses_message() {
        let body = r#"{"message": "Invalid status"}"#;
        match ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body) {
            ApiError::Validation(msg) => assert_eq!(msg, "Invalid status"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("truncated, 520 total bytes"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }

    #[test]
    fn test_is_client_error() {
        assert!(ApiError::Unauthorized.is_client_error());
        assert!(ApiError::Validation("x".into()).is_client_error());
        assert!(!ApiError::RateLimited.is_client_error());
        assert!(!ApiError::ServerError("x".into()).is_client_error());
    }
}
