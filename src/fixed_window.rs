//! Fixed window limiter.
//!
//! Requests are counted against a quota that a background [`WindowScheduler`]
//! resets at the start of every window.

use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, ThrottlerError};
use crate::rate_limiter::{LifecycleState, RateLimiter};
use crate::scheduler::{WindowScheduler, DEFAULT_SHUTDOWN_TIMEOUT};

/// Usage counter shared between callers and the rollover task.
struct WindowCounter {
    allowed_requests: u64,
    used_requests: Mutex<u64>,
}

impl WindowCounter {
    fn used(&self) -> MutexGuard<'_, u64> {
        // A u64 cannot be left half-written, so a poisoned lock is still usable
        self.used_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn try_consume(&self) -> Result<()> {
        let mut used = self.used();
        if *used >= self.allowed_requests {
            return Err(ThrottlerError::RateLimitExceeded);
        }
        *used += 1;
        Ok(())
    }

    fn available(&self) -> u64 {
        self.allowed_requests.saturating_sub(*self.used())
    }

    fn reset(&self) {
        *self.used() = 0;
    }
}

/// Fixed window implementation of [`RateLimiter`].
pub struct FixedWindowLimiter {
    counter: Arc<WindowCounter>,
    scheduler: WindowScheduler,
}

impl FixedWindowLimiter {
    /// Create a limiter allowing `allowed_requests` per `timeframe_interval` and
    /// start its window rollover. Must be called from within a Tokio runtime.
    pub fn new(allowed_requests: u64, timeframe_interval: Duration) -> Result<Self> {
        Self::with_shutdown_timeout(allowed_requests, timeframe_interval, DEFAULT_SHUTDOWN_TIMEOUT)
    }

    pub fn with_shutdown_timeout(
        allowed_requests: u64,
        timeframe_interval: Duration,
        shutdown_timeout: Duration,
    ) -> Result<Self> {
        let counter = Arc::new(WindowCounter {
            allowed_requests,
            used_requests: Mutex::new(0),
        });

        let rollover = counter.clone();
        let scheduler = WindowScheduler::spawn(timeframe_interval, shutdown_timeout, move || {
            rollover.reset();
        })?;

        debug!(
            limit = allowed_requests,
            window = ?timeframe_interval,
            "Created fixed window limiter"
        );

        Ok(Self { counter, scheduler })
    }

    /// Shorthand for a window expressed in milliseconds.
    pub fn from_millis(allowed_requests: u64, timeframe_millis: u64) -> Result<Self> {
        Self::new(allowed_requests, Duration::from_millis(timeframe_millis))
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    fn request_limit(&self) -> u64 {
        self.counter.allowed_requests
    }

    fn requests_available(&self) -> u64 {
        self.counter.available()
    }

    fn timeframe_interval(&self) -> Duration {
        self.scheduler.period()
    }

    fn increment_requests_used(&self) -> Result<()> {
        self.counter.try_consume()
    }

    fn clear(&self) {
        self.counter.reset();
    }

    fn lifecycle_state(&self) -> LifecycleState {
        if self.scheduler.is_running() {
            LifecycleState::Active
        } else {
            LifecycleState::Stopped
        }
    }

    async fn shutdown(&self) -> Result<()> {
        self.scheduler.stop().await
    }
}

impl fmt::Debug for FixedWindowLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedWindowLimiter")
            .field("allowed_requests", &self.request_limit())
            .field("requests_available", &self.requests_available())
            .field("timeframe_interval", &self.timeframe_interval())
            .field("state", &self.lifecycle_state())
            .finish()
    }
}
