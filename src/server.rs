use crate::config::Config;
use crate::error::{Result, ThrottlerError};
use crate::handlers::{fallback, get_requests_available, health_check, AppState, SharedState};
use crate::middleware::logging_middleware;
use crate::registry::ClientRegistry;
use axum::routing::get;
use axum::{middleware, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the HTTP router around a client registry
pub fn create_app(registry: Arc<ClientRegistry>, http_timeout: Duration) -> Router {
    let shared_state: SharedState = Arc::new(AppState::new(registry));

    Router::new()
        .route("/:client_id/requests-available", get(get_requests_available))
        .route("/health", get(health_check))
        .fallback(fallback)
        .with_state(shared_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(http_timeout))
                .layer(middleware::from_fn(logging_middleware)),
        )
}

pub struct Server {
    config: Config,
    registry: Arc<ClientRegistry>,
}

impl Server {
    pub fn new(config: Config, registry: Arc<ClientRegistry>) -> Self {
        Self { config, registry }
    }

    /// Listen on the configured address until SIGINT or SIGTERM
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await.map_err(|e| {
            ThrottlerError::Internal(format!("Failed to bind {}: {}", self.config.bind_addr, e))
        })?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` resolves, drain in-flight
    /// requests, then stop every client limiter.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ThrottlerError::Internal(e.to_string()))?;

        tracing::info!("Throttler server listening on {}", local_addr);
        tracing::info!("Serving {} client rate limiters", self.registry.len());
        tracing::info!("Health check available at /health");

        let app = create_app(self.registry.clone(), self.config.http_timeout());

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ThrottlerError::Internal(format!("Server error: {}", e)))?;

        tracing::info!("Server stopped, shutting down client rate limiters");
        let failures = self.registry.shutdown_all().await;
        if failures > 0 {
            tracing::warn!(failures, "Some client rate limiters did not stop cleanly");
        }

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
