use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use window_throttler::{ClientRegistry, ClientsFile, Config, Server};

/// Per-client fixed window rate limiting service
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Address to listen on, overrides BIND_ADDR
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// JSON clients file, overrides CLIENTS_FILE
    #[arg(long)]
    clients_file: Option<String>,

    /// Log level used when RUST_LOG is not set, overrides LOG_LEVEL
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(clients_file) = cli.clients_file {
        config.clients_file = Some(clients_file);
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("window_throttler={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting window throttler service");
    tracing::info!(
        "Configuration: bind_addr={}, clients_file={:?}",
        config.bind_addr,
        config.clients_file
    );

    let registry = ClientRegistry::new();
    registry
        .initialize()
        .context("Failed to initialize client registry")?;

    let clients = match &config.clients_file {
        Some(path) => ClientsFile::from_path(path)
            .with_context(|| format!("Failed to load clients from {}", path))?,
        None => ClientsFile::demo(config.demo_clients),
    };
    clients
        .register_all(&registry, config.shutdown_timeout())
        .context("Failed to register client rate limiters")?;
    tracing::info!("Registered {} client rate limiters", registry.len());

    Server::new(config, Arc::new(registry))
        .run()
        .await
        .context("Server error")?;

    tracing::info!("Goodbye");
    Ok(())
}
