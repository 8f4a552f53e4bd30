//! REST API: router, state, error envelope, handlers and middleware.

mod handlers;
mod middleware;
mod router;
mod state;

pub mod error;

pub use middleware::rate_limit::RateLimiter;
pub use router::{build_router, run_http_server};
pub use state::ApiState;
