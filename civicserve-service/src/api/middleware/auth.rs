//! Authentication and identity extraction.
//!
//! Two layers: an optional shared API token (the service sits behind a
//! gateway, but defense in depth is cheap), and the caller identity the
//! gateway injects as `x-user-id` / `x-user-role` / `x-department`
//! headers. Failures here are `401`; domain-level authorization failures
//! surface later as `403`.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use civicserve_core::domain::{Actor, Department, Role};
use civicserve_core::foundation::UserId;

use crate::api::state::ApiState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const DEPARTMENT_HEADER: &str = "x-department";
pub const API_KEY_HEADER: &str = "x-api-key";

/// Checks the shared API token when one is configured. Accepts it either
/// as `x-api-key` or as a `Bearer` authorization.
pub fn authorize_api(headers: &HeaderMap, expected: Option<&str>) -> Result<(), &'static str> {
    let Some(expected) = expected.filter(|token| !token.is_empty()) else {
        return Ok(());
    };
    if let Some(value) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        if constant_time_eq(value, expected) {
            return Ok(());
        }
    }
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            if constant_time_eq(token, expected) {
                return Ok(());
            }
        }
    }
    Err("missing or invalid api token")
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Builds the caller identity from gateway-injected headers.
pub fn extract_actor(headers: &HeaderMap) -> Result<Actor, String> {
    let user_id = header_value(headers, USER_ID_HEADER)
        .ok_or_else(|| format!("missing {USER_ID_HEADER} header"))?;
    let role = header_value(headers, USER_ROLE_HEADER)
        .ok_or_else(|| format!("missing {USER_ROLE_HEADER} header"))?;
    let role = match role.as_str() {
        "citizen" | "user" => Role::Citizen,
        "staff" | "admin" => Role::Staff,
        other => return Err(format!("unknown role: {other}")),
    };
    let department = match header_value(headers, DEPARTMENT_HEADER) {
        Some(value) => Some(
            Department::from_str(&value).map_err(|_| format!("unknown department: {value}"))?,
        ),
        None => None,
    };
    Ok(Actor { user_id: UserId::from(user_id), role, department })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Rejects unauthenticated calls and stashes the [`Actor`] as a request
/// extension for handlers.
pub async fn auth_middleware(
    State(state): State<Arc<ApiState>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Err(message) = authorize_api(req.headers(), state.api_token.as_deref()) {
        return unauthenticated(message);
    }
    let actor = match extract_actor(req.headers()) {
        Ok(actor) => actor,
        Err(message) => return unauthenticated(&message),
    };
    req.extensions_mut().insert(actor);
    next.run(req).await
}

fn unauthenticated(message: &str) -> Response {
    let body = serde_json::json!({
        "error": { "code": "unauthenticated", "message": message }
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
