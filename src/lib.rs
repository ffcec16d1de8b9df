//! Per-client fixed window rate limiting.
//!
//! Each client gets a [`FixedWindowLimiter`] registered in a
//! [`ClientRegistry`]; the HTTP layer in [`server`] reports how many requests
//! a client has left in its current window.

pub mod client_config;
pub mod config;
pub mod error;
pub mod fixed_window;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod rate_limiter;
pub mod registry;
pub mod response;
pub mod scheduler;
pub mod server;
pub mod validation;

pub use client_config::{ClientSpec, ClientsFile};
pub use config::Config;
pub use error::{Result, ThrottlerError};
pub use fixed_window::FixedWindowLimiter;
pub use rate_limiter::{LifecycleState, RateLimiter};
pub use registry::ClientRegistry;
pub use response::AvailableRequestsResponse;
pub use server::{create_app, Server};
