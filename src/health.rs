use std::sync::Arc;
use std::time::Instant;

use crate::registry::ClientRegistry;
use crate::response::HealthResponse;

pub struct HealthChecker {
    started_at: Instant,
    registry: Arc<ClientRegistry>,
}

impl HealthChecker {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self {
            started_at: Instant::now(),
            registry,
        }
    }

    pub fn check_health(&self) -> HealthResponse {
        HealthResponse::healthy(self.started_at.elapsed().as_secs(), self.registry.len())
    }
}
