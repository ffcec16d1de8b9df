//! The operations every limiter variant exposes to the registry and transport.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Whether a limiter's background window rollover is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    Stopped,
}

/// Capability set shared by all rate limiter algorithms.
///
/// Counters stay queryable after [`RateLimiter::shutdown`]; only the
/// automatic window rollover stops.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Maximum number of requests allowed within one window.
    fn request_limit(&self) -> u64;

    /// Requests still allowed in the current window, always in `0..=limit`.
    fn requests_available(&self) -> u64;

    /// Length of one window.
    fn timeframe_interval(&self) -> Duration;

    /// Consume one unit of quota.
    ///
    /// Fails with [`crate::ThrottlerError::RateLimitExceeded`] and leaves the
    /// counter untouched when the window is exhausted.
    fn increment_requests_used(&self) -> Result<()>;

    /// Reset the usage for the current window.
    fn clear(&self);

    fn lifecycle_state(&self) -> LifecycleState;

    /// Stop background window rollover.
    ///
    /// Safe to call more than once; later calls return immediately.
    async fn shutdown(&self) -> Result<()>;
}
