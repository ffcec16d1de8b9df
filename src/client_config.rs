//! Startup client definitions.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::error::{Result, ThrottlerError};
use crate::fixed_window::FixedWindowLimiter;
use crate::registry::ClientRegistry;
use crate::validation::RequestValidator;

/// One client and its fixed window quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClientSpec {
    #[validate(custom(function = "validate_client_id"))]
    pub id: String,
    pub limit: u64,
    #[serde(with = "humantime_serde")]
    #[validate(custom(function = "validate_window"))]
    pub window: Duration,
}

/// Contents of a clients file, e.g.
/// `{"clients": [{"id": "client-1", "limit": 10, "window": "1s"}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClientsFile {
    #[validate(nested)]
    pub clients: Vec<ClientSpec>,
}

fn validate_client_id(id: &str) -> std::result::Result<(), ValidationError> {
    RequestValidator::validate_client_id(id).map_err(|_| ValidationError::new("client_id"))
}

fn validate_window(window: &Duration) -> std::result::Result<(), ValidationError> {
    if window.is_zero() {
        return Err(ValidationError::new("zero_window"));
    }
    Ok(())
}

impl ClientSpec {
    pub fn new(id: impl Into<String>, limit: u64, window: Duration) -> Self {
        Self {
            id: id.into(),
            limit,
            window,
        }
    }
}

impl ClientsFile {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ClientsFile = serde_json::from_str(json)
            .map_err(|e| ThrottlerError::Configuration(format!("Invalid clients file: {}", e)))?;
        file.validate()?;
        Ok(file)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ThrottlerError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    /// `client-1` through `client-<count>`, where `client-i` may make `i`
    /// requests every `i` milliseconds.
    pub fn demo(count: u64) -> Self {
        let clients = (1..=count)
            .map(|i| ClientSpec::new(format!("client-{}", i), i, Duration::from_millis(i)))
            .collect();
        Self { clients }
    }

    /// Create a fixed window limiter per client and add it to `registry`.
    pub fn register_all(&self, registry: &ClientRegistry, shutdown_timeout: Duration) -> Result<()> {
        for spec in &self.clients {
            let limiter =
                FixedWindowLimiter::with_shutdown_timeout(spec.limit, spec.window, shutdown_timeout)?;
            registry.register(spec.id.clone(), Arc::new(limiter))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_humantime_windows() {
        let file = ClientsFile::from_json(
            r#"{"clients": [
                {"id": "client-1", "limit": 10, "window": "1s"},
                {"id": "batch", "limit": 500, "window": "1m 30s"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(file.clients.len(), 2);
        assert_eq!(file.clients[0], ClientSpec::new("client-1", 10, Duration::from_secs(1)));
        assert_eq!(file.clients[1].window, Duration::from_secs(90));
    }

    #[test]
    fn test_rejects_zero_window() {
        let result =
            ClientsFile::from_json(r#"{"clients": [{"id": "a", "limit": 1, "window": "0s"}]}"#);
        assert!(matches!(result, Err(ThrottlerError::Configuration(_))));
    }

    #[test]
    fn test_rejects_bad_client_id() {
        let result =
            ClientsFile::from_json(r#"{"clients": [{"id": "", "limit": 1, "window": "1s"}]}"#);
        assert!(matches!(result, Err(ThrottlerError::Configuration(_))));

        let result = ClientsFile::from_json(
            r#"{"clients": [{"id": "has space", "limit": 1, "window": "1s"}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(ClientsFile::from_json("{\"clients\": 3}").is_err());
        assert!(ClientsFile::from_json(r#"{"clients": [{"id": "a", "limit": -1, "window": "1s"}]}"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ClientsFile::from_path("/definitely/not/here.json");
        assert!(matches!(result, Err(ThrottlerError::Configuration(_))));
    }

    #[test]
    fn test_demo_clients() {
        let demo = ClientsFile::demo(10);

        assert_eq!(demo.clients.len(), 10);
        assert_eq!(demo.clients[2], ClientSpec::new("client-3", 3, Duration::from_millis(3)));
        assert!(demo.validate().is_ok());
        assert!(ClientsFile::demo(0).clients.is_empty());
    }

    #[tokio::test]
    async fn test_register_all() {
        let registry = ClientRegistry::initialized();
        ClientsFile::demo(3)
            .register_all(&registry, Duration::from_millis(100))
            .unwrap();

        assert_eq!(registry.client_ids(), vec!["client-1", "client-2", "client-3"]);
        assert_eq!(registry.lookup("client-2").unwrap().request_limit(), 2);

        registry.shutdown_all().await;
    }

    #[tokio::test]
    async fn test_register_all_reports_duplicates() {
        let registry = ClientRegistry::initialized();
        let file = ClientsFile {
            clients: vec![
                ClientSpec::new("dup", 1, Duration::from_secs(1)),
                ClientSpec::new("dup", 2, Duration::from_secs(1)),
            ],
        };

        assert_eq!(
            file.register_all(&registry, Duration::from_millis(100)),
            Err(ThrottlerError::DuplicateClient("dup".to_string()))
        );
        registry.shutdown_all().await;
    }
}
