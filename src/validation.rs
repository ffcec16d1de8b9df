use crate::error::ThrottlerError;
use regex::Regex;
use std::sync::LazyLock;

/// Longest client identifier accepted anywhere in the service.
pub const MAX_CLIENT_ID_LEN: usize = 128;

/// Allowed client identifier characters: alphanumerics, `.`, `_`, `@` and `-`.
pub static CLIENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._@-]+$").expect("client id pattern is valid"));

/// Request validation utilities
pub struct RequestValidator;

impl RequestValidator {
    /// Validates a client identifier taken from a request path or a seed file.
    pub fn validate_client_id(client_id: &str) -> Result<(), ThrottlerError> {
        if client_id.is_empty() {
            return Err(ThrottlerError::ValidationError(
                "Client id cannot be empty".to_string(),
            ));
        }

        if client_id.len() > MAX_CLIENT_ID_LEN {
            return Err(ThrottlerError::ValidationError(format!(
                "Client id cannot be longer than {} characters",
                MAX_CLIENT_ID_LEN
            )));
        }

        if !CLIENT_ID_PATTERN.is_match(client_id) {
            return Err(ThrottlerError::ValidationError(
                "Client id can only contain alphanumeric characters, '.', '_', '@' and '-'"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
