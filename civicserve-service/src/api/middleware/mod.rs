pub mod auth;
pub mod correlation;
pub mod logging;
pub mod rate_limit;
