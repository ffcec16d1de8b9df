//! Client id to limiter mapping.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::{info, warn};

use crate::error::{Result, ThrottlerError};
use crate::rate_limiter::RateLimiter;
use crate::validation::RequestValidator;

type ClientMap = RwLock<HashMap<String, Arc<dyn RateLimiter>>>;

/// Maps client identifiers to their rate limiter.
///
/// The mapping is created once by [`ClientRegistry::initialize`]; a second
/// attempt fails instead of replacing it. Entries are only added, never
/// removed or replaced.
#[derive(Default)]
pub struct ClientRegistry {
    clients: OnceLock<ClientMap>,
}

impl ClientRegistry {
    /// An uninitialized registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that is already initialized and ready for registration.
    pub fn initialized() -> Self {
        let registry = Self::new();
        let _ = registry.clients.set(RwLock::default());
        registry
    }

    pub fn initialize(&self) -> Result<()> {
        self.clients
            .set(RwLock::default())
            .map_err(|_| ThrottlerError::AlreadyInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.clients.get().is_some()
    }

    /// Add a limiter for `client_id`. Existing entries are never overwritten.
    pub fn register(&self, client_id: impl Into<String>, limiter: Arc<dyn RateLimiter>) -> Result<()> {
        let client_id = client_id.into();
        RequestValidator::validate_client_id(&client_id)?;

        let clients = self.clients.get().ok_or(ThrottlerError::NotInitialized)?;
        let mut clients = clients.write().unwrap_or_else(PoisonError::into_inner);

        if clients.contains_key(&client_id) {
            return Err(ThrottlerError::DuplicateClient(client_id));
        }

        info!(
            client_id = %client_id,
            limit = limiter.request_limit(),
            window = ?limiter.timeframe_interval(),
            "Registered client rate limiter"
        );
        clients.insert(client_id, limiter);
        Ok(())
    }

    pub fn lookup(&self, client_id: &str) -> Result<Arc<dyn RateLimiter>> {
        self.clients
            .get()
            .and_then(|clients| {
                clients
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(client_id)
                    .cloned()
            })
            .ok_or_else(|| ThrottlerError::NotFound(client_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.clients
            .get()
            .map(|clients| clients.read().unwrap_or_else(PoisonError::into_inner).len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered client ids, sorted.
    pub fn client_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .clients
            .get()
            .map(|clients| {
                clients
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .keys()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Shut down every registered limiter, returning how many failed to stop.
    pub async fn shutdown_all(&self) -> usize {
        let limiters: Vec<(String, Arc<dyn RateLimiter>)> = match self.clients.get() {
            Some(clients) => clients
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(id, limiter)| (id.clone(), limiter.clone()))
                .collect(),
            None => return 0,
        };

        let mut failures = 0;
        for (client_id, limiter) in limiters {
            if let Err(e) = limiter.shutdown().await {
                warn!(client_id = %client_id, error = %e, "Failed to shut down client rate limiter");
                failures += 1;
            }
        }

        info!(failures, "Client rate limiters shut down");
        failures
    }
}
