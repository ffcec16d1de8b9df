use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

pub const HTTP_BAD_REQUEST: &str = "Bad Request";
pub const HTTP_NOT_FOUND: &str = "Not Found";
pub const HTTP_TOO_MANY_REQUESTS: &str = "Too Many Requests";
pub const HTTP_INTERNAL_ERROR: &str = "Internal Server Error";

/// Errors produced by the rate limiting engine and its HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThrottlerError {
    /// A client identifier was missing or malformed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No limiter is registered under the given client identifier.
    #[error("Client not found: {0}")]
    NotFound(String),

    /// The quota for the current window is already consumed.
    #[error("Too Many Requests")]
    RateLimitExceeded,

    #[error("Client rate limiter registry already initialized")]
    AlreadyInitialized,

    #[error("Client rate limiter registry is not initialized")]
    NotInitialized,

    #[error("Client already registered: {0}")]
    DuplicateClient(String),

    /// The window scheduler did not acknowledge cancellation in time.
    #[error("Window scheduler did not stop within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ThrottlerError>;

impl ThrottlerError {
    /// Status code and fixed body text sent to HTTP callers.
    pub fn status_and_body(&self) -> (StatusCode, &'static str) {
        match self {
            ThrottlerError::ValidationError(_) => (StatusCode::BAD_REQUEST, HTTP_BAD_REQUEST),
            ThrottlerError::NotFound(_) => (StatusCode::NOT_FOUND, HTTP_NOT_FOUND),
            ThrottlerError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, HTTP_TOO_MANY_REQUESTS)
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, HTTP_INTERNAL_ERROR),
        }
    }
}

impl IntoResponse for ThrottlerError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        // Details stay in the logs, callers only get the fixed text
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ThrottlerError {
    fn from(err: validator::ValidationErrors) -> Self {
        ThrottlerError::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for ThrottlerError {
    fn from(err: serde_json::Error) -> Self {
        ThrottlerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_fixed_bodies() {
        assert_eq!(
            ThrottlerError::ValidationError("empty".into()).status_and_body(),
            (StatusCode::BAD_REQUEST, "Bad Request")
        );
        assert_eq!(
            ThrottlerError::NotFound("client-x".into()).status_and_body(),
            (StatusCode::NOT_FOUND, "Not Found")
        );
        assert_eq!(
            ThrottlerError::RateLimitExceeded.status_and_body(),
            (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests")
        );
    }

    #[test]
    fn test_server_errors_do_not_leak_details() {
        let errors = [
            ThrottlerError::AlreadyInitialized,
            ThrottlerError::NotInitialized,
            ThrottlerError::ShutdownTimeout(Duration::from_millis(5)),
            ThrottlerError::Internal("encoder exploded".into()),
        ];

        for err in errors {
            let (status, body) = err.status_and_body();
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "Internal Server Error");
        }
    }

    #[test]
    fn test_into_response_status() {
        let response = ThrottlerError::NotFound("nobody".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
