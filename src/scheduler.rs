//! Background window rollover.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, ThrottlerError};

/// How long `stop` waits for the task to acknowledge cancellation.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs a callback every `period` on the Tokio runtime until stopped.
///
/// The task is cancelled through a [`CancellationToken`], so stopping twice or
/// stopping a task that already exited never blocks.
pub struct WindowScheduler {
    period: Duration,
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
    shutdown_timeout: Duration,
}

impl WindowScheduler {
    /// Spawn the rollover task. The first tick fires one full period from now.
    pub fn spawn<F>(period: Duration, shutdown_timeout: Duration, on_tick: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        if period.is_zero() {
            return Err(ThrottlerError::ValidationError(
                "Timeframe interval must be greater than zero".to_string(),
            ));
        }

        let runtime = Handle::try_current().map_err(|e| {
            ThrottlerError::Internal(format!("Window scheduler needs a Tokio runtime: {}", e))
        })?;

        let token = CancellationToken::new();
        let handle = runtime.spawn(run_window(period, token.clone(), on_tick));

        Ok(Self {
            period,
            token,
            handle: Mutex::new(Some(handle)),
            shutdown_timeout,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Cancel the task and wait for it to finish, bounded by the shutdown timeout.
    pub async fn stop(&self) -> Result<()> {
        self.token.cancel();

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(handle) = handle else {
            return Ok(());
        };

        match tokio::time::timeout(self.shutdown_timeout, handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ThrottlerError::Internal(format!(
                "Window scheduler task failed: {}",
                e
            ))),
            Err(_) => Err(ThrottlerError::ShutdownTimeout(self.shutdown_timeout)),
        }
    }
}

impl Drop for WindowScheduler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_window<F>(period: Duration, token: CancellationToken, on_tick: F)
where
    F: Fn(),
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(period = ?period, "Window scheduler stopping");
                break;
            }
            _ = ticker.tick() => on_tick(),
        }
    }
}
