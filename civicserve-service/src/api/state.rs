use std::sync::Arc;

use civicserve_core::application::EngineContext;

use crate::api::middleware::rate_limit::RateLimiter;
use crate::service::metrics::Metrics;

/// Shared state behind every handler and middleware.
#[derive(Clone)]
pub struct ApiState {
    pub engine: EngineContext,
    /// Shared secret for `/api`, `/ready` and `/metrics`. `None` disables
    /// the check.
    pub api_token: Option<String>,
    pub metrics: Arc<Metrics>,
    pub rate_limiter: Arc<RateLimiter>,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
    pub keepalive_secs: u64,
    pub body_limit_bytes: usize,
}
