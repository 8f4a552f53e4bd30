//! Operational endpoints: liveness, readiness and metrics export.
//!
//! `/health` is open; `/ready` and `/metrics` honor the API token when
//! one is configured, the same check `/api` uses.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, trace};

use crate::api::middleware::auth::authorize_api;
use crate::api::state::ApiState;

pub async fn handle_health() -> impl IntoResponse {
    trace!("health check: ok");
    Json(serde_json::json!({
        "status": "healthy",
    }))
}

pub async fn handle_ready(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    if let Err(message) = authorize_api(&headers, state.api_token.as_deref()) {
        return (StatusCode::UNAUTHORIZED, message).into_response();
    }

    let store_ok = state.engine.store.health_check().is_ok();
    let status = if store_ok { "ready" } else { "degraded" };
    if store_ok {
        trace!("ready check: ok");
    } else {
        debug!("ready check: degraded store_ok={}", store_ok);
    }
    Json(serde_json::json!({
        "status": status,
        "store_ok": store_ok,
        "open_streams": state.metrics.snapshot().streams_open,
    }))
    .into_response()
}

pub async fn handle_metrics(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    if let Err(message) = authorize_api(&headers, state.api_token.as_deref()) {
        return (StatusCode::UNAUTHORIZED, message).into_response();
    }

    match state.metrics.encode() {
        Ok(body) => {
            let mut response = body.into_response();
            response.headers_mut().insert(
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        Err(err) => {
            debug!("metrics encode failed error={}", err);
            let mut response = format!("metrics_error: {err}").into_response();
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}
