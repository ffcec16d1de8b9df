use envconfig::Envconfig;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Envconfig, Clone)]
pub struct Config {
    /// Server bind address
    #[envconfig(from = "BIND_ADDR", default = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Per-request HTTP timeout in seconds
    #[envconfig(from = "HTTP_TIMEOUT_SECS", default = "15")]
    pub http_timeout_secs: u64,

    /// How long each limiter may take to stop its window scheduler
    #[envconfig(from = "SHUTDOWN_TIMEOUT_MS", default = "1000")]
    pub shutdown_timeout_ms: u64,

    /// Log level used when RUST_LOG is not set
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// JSON file describing the clients to register at startup
    #[envconfig(from = "CLIENTS_FILE")]
    pub clients_file: Option<String>,

    /// Number of demo clients registered when no clients file is given
    #[envconfig(from = "DEMO_CLIENTS", default = "10")]
    pub demo_clients: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            http_timeout_secs: 15,
            shutdown_timeout_ms: 1000,
            log_level: "info".to_string(),
            clients_file: None,
            demo_clients: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envconfig::Error> {
        Config::init_from_env()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = Config::init_from_hashmap(&HashMap::new()).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.http_timeout(), Duration::from_secs(15));
        assert_eq!(config.shutdown_timeout(), Duration::from_millis(1000));
        assert_eq!(config.clients_file, None);
        assert_eq!(config.demo_clients, 10);
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("BIND_ADDR".to_string(), "127.0.0.1:9000".to_string()),
            ("CLIENTS_FILE".to_string(), "clients.json".to_string()),
            ("DEMO_CLIENTS".to_string(), "2".to_string()),
        ]);
        let config = Config::init_from_hashmap(&vars).unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.clients_file.as_deref(), Some("clients.json"));
        assert_eq!(config.demo_clients, 2);
    }

    #[test]
    fn test_invalid_bind_address() {
        let vars = HashMap::from([("BIND_ADDR".to_string(), "localhost".to_string())]);
        assert!(Config::init_from_hashmap(&vars).is_err());
    }
}
