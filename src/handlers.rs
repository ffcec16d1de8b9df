use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header, Uri},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::error::ThrottlerError;
use crate::health::HealthChecker;
use crate::registry::ClientRegistry;
use crate::response::AvailableRequestsResponse;
use crate::validation::RequestValidator;

/// Shared application state
pub type SharedState = Arc<AppState>;

/// Application state handed to every handler
pub struct AppState {
    pub registry: Arc<ClientRegistry>,
    pub health: HealthChecker,
}

impl AppState {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self {
            health: HealthChecker::new(registry.clone()),
            registry,
        }
    }
}

/// Report the limit, remaining requests and window length for a client
pub async fn get_requests_available(
    State(state): State<SharedState>,
    client_id: Result<Path<String>, PathRejection>,
) -> Result<Response, ThrottlerError> {
    let Path(client_id) =
        client_id.map_err(|e| ThrottlerError::ValidationError(e.body_text()))?;

    RequestValidator::validate_client_id(&client_id)?;

    let limiter = state.registry.lookup(&client_id)?;
    let body = serde_json::to_vec(&AvailableRequestsResponse::from_limiter(limiter.as_ref()))?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.health.check_health())
}

/// Unmatched routes. An empty client id segment is a bad request, anything
/// else is unknown.
pub async fn fallback(uri: Uri) -> ThrottlerError {
    if uri.path() == "//requests-available" {
        ThrottlerError::ValidationError("Missing client id".to_string())
    } else {
        ThrottlerError::NotFound(uri.path().to_string())
    }
}
