use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::rate_limiter::RateLimiter;

/// Body returned to a caller asking for its remaining requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableRequestsResponse {
    /// Total number of requests in a time frame
    pub limit: u64,
    /// Requests still available in the current time frame
    pub available: u64,
    /// Fixed window length, encoded as nanoseconds
    #[serde(serialize_with = "serialize_nanos")]
    pub timeframe: Duration,
}

impl AvailableRequestsResponse {
    pub fn from_limiter(limiter: &dyn RateLimiter) -> Self {
        Self {
            limit: limiter.request_limit(),
            available: limiter.requests_available(),
            timeframe: limiter.timeframe_interval(),
        }
    }
}

fn serialize_nanos<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let nanos = u64::try_from(duration.as_nanos()).map_err(|_| {
        <S::Error as serde::ser::Error>::custom("timeframe does not fit in 64 bits of nanoseconds")
    })?;
    serializer.serialize_u64(nanos)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub clients: usize,
}

impl HealthResponse {
    pub fn healthy(uptime_seconds: u64, clients: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds,
            clients,
        }
    }
}
