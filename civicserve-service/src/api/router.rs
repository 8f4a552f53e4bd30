//! Route table and server loop.
//!
//! Everything under `/api` passes the rate limiter and the identity
//! middleware; operational endpoints do their own token check so probes
//! work without gateway headers.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use log::{error, info};
use tokio::net::TcpListener;

use civicserve_core::foundation::CivicError;

use super::handlers::{alarms, assignments, directory, health, notifications, requests};
use super::middleware::auth::auth_middleware;
use super::middleware::correlation::correlation_middleware;
use super::middleware::logging::logging_middleware;
use super::middleware::rate_limit::rate_limit_middleware;
use super::state::ApiState;

pub fn build_router(state: Arc<ApiState>) -> Router {
    let api = Router::new()
        .route("/requests", post(requests::handle_create).get(requests::handle_list))
        .route("/requests/{id}", get(requests::handle_fetch))
        .route("/requests/{id}/history", get(requests::handle_history))
        .route("/requests/{id}/status", put(requests::handle_status))
        .route("/requests/{id}/rate", post(requests::handle_rate))
        .route("/requests/{id}/reopen", put(requests::handle_reopen))
        .route("/requests/{id}/allocate", post(requests::handle_allocate))
        .route("/requests/{id}/alarm", post(requests::handle_request_alarm))
        .route("/requests/{id}/assignments", get(requests::handle_request_assignments))
        .route("/assignments", get(assignments::handle_list))
        .route("/assignments/{id}/status", put(assignments::handle_status))
        .route("/notifications/stream", get(notifications::handle_stream))
        .route("/notifications/send", post(notifications::handle_send))
        .route("/alarms", post(alarms::handle_raise))
        .route("/directory/staff", get(directory::handle_staff))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health::handle_health))
        .route("/ready", get(health::handle_ready))
        .route("/metrics", get(health::handle_metrics))
        .layer(DefaultBodyLimit::max(state.body_limit_bytes))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .with_state(state)
}

/// Binds and serves until `shutdown` resolves, then finishes in-flight
/// requests before returning.
pub async fn run_http_server(
    addr: SocketAddr,
    state: Arc<ApiState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), CivicError> {
    info!("binding http server addr={}", addr);
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server ready and accepting connections addr={}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|err| {
            error!("HTTP server terminated unexpectedly addr={} error={}", addr, err);
            CivicError::Message(err.to_string())
        })
}
