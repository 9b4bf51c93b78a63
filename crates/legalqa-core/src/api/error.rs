use serde::Deserialize;
use thiserror::Error;

use crate::utils::truncate_bytes;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// FastAPI-style error payload: `{"detail": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: serde_json::Value,
}

impl ApiError {
    /// Prefer the backend's `detail` message, falling back to the truncated raw body.
    fn describe_body(body: &str) -> String {
        match serde_json::from_str::<ErrorDetail>(body) {
            Ok(ErrorDetail {
                detail: serde_json::Value::String(detail),
            }) => truncate_bytes(&detail, MAX_ERROR_BODY_LENGTH),
            Ok(ErrorDetail { detail }) => truncate_bytes(&detail.to_string(), MAX_ERROR_BODY_LENGTH),
            Err(_) => truncate_bytes(body, MAX_ERROR_BODY_LENGTH),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let described = Self::describe_body(body);
        match status.as_u16() {
            400 | 409 | 422 => ApiError::Rejected(described),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(described),
            404 => ApiError::NotFound(described),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(described),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, described)),
        }
    }

    /// True when the request never produced an HTTP response (DNS, connect, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::NetworkError(e) if !e.is_decode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down"),
            ApiError::ServerError(ref m) if m == "upstream down"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail": "Username already registered"}"#),
            ApiError::Rejected(ref m) if m == "Username already registered"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "nope"),
            ApiError::InvalidResponse(ref m) if m.contains("418") && m.contains("nope")
        ));
    }

    #[test]
    fn test_detail_payload_is_preferred() {
        let err = ApiError::from_status(
            StatusCode::NOT_FOUND,
            r#"{"detail": "No drift records in range"}"#,
        );
        assert_eq!(err.to_string(), "Resource not found: No drift records in range");
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(2000);
        match ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            ApiError::ServerError(message) => {
                assert!(message.starts_with(&"x".repeat(500)));
                assert!(message.ends_with("(truncated, 2000 total bytes)"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
