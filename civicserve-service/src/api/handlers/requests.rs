//! Request lifecycle endpoints: create, list, fetch, history, status
//! transitions, rating, reopening, allocation and request-scoped alarms.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use civicserve_core::application::{allocation, escalation, lifecycle};
use civicserve_core::domain::{Actor, NewRequest, RatingScore, RequestStatus};
use civicserve_core::foundation::{CivicError, RequestId};

use super::observed;
use crate::api::error::ApiResult;
use crate::api::state::ApiState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateBody {
    pub score: String,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReopenBody {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct AllocateBody {
    pub assigned_to: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlarmBody {
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn handle_create(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<NewRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = lifecycle::create_request(&state.engine, &actor, body).await;
    let request = observed(&state.metrics, "create", result)?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "data": request }))))
}

pub async fn handle_list(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let status = parse_status_filter(params.status.as_deref())?;
    let result = lifecycle::list_requests(&state.engine, &actor, status).await;
    let requests = observed(&state.metrics, "list", result)?;
    Ok(Json(serde_json::json!({ "data": requests })))
}

pub async fn handle_fetch(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let result = lifecycle::fetch_request(&state.engine, &RequestId::from(id), &actor).await;
    let request = observed(&state.metrics, "fetch", result)?;
    Ok(Json(serde_json::json!({ "data": request })))
}

pub async fn handle_history(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let result = lifecycle::fetch_history(&state.engine, &RequestId::from(id), &actor).await;
    let history = observed(&state.metrics, "history", result)?;
    Ok(Json(serde_json::json!({ "data": history })))
}

pub async fn handle_status(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<impl IntoResponse> {
    // Unknown enum values are a 400, not a 409; parse before touching state.
    let new_status = RequestStatus::from_str(&body.status)?;
    let result = lifecycle::transition_request(
        &state.engine,
        &RequestId::from(id),
        &actor,
        new_status,
        body.message,
    )
    .await;
    let outcome = observed(&state.metrics, "transition", result)?;
    Ok(Json(serde_json::json!({
        "data": outcome.request,
        "old_status": outcome.old_status,
        "new_status": outcome.new_status,
    })))
}

pub async fn handle_rate(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<RateBody>,
) -> ApiResult<impl IntoResponse> {
    let score = RatingScore::from_str(&body.score)?;
    let result =
        lifecycle::rate_request(&state.engine, &RequestId::from(id), &actor, score, body.comments)
            .await;
    let outcome = observed(&state.metrics, "rate", result)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "data": outcome.request,
            "old_status": outcome.old_status,
            "new_status": outcome.new_status,
        })),
    ))
}

pub async fn handle_reopen(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<ReopenBody>,
) -> ApiResult<impl IntoResponse> {
    let result =
        lifecycle::reopen_request(&state.engine, &RequestId::from(id), &actor, body.reason).await;
    let outcome = observed(&state.metrics, "reopen", result)?;
    Ok(Json(serde_json::json!({
        "data": outcome.request,
        "old_status": outcome.old_status,
        "new_status": outcome.new_status,
    })))
}

pub async fn handle_allocate(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<AllocateBody>,
) -> ApiResult<impl IntoResponse> {
    let result = allocation::assign_work(
        &state.engine,
        &RequestId::from(id),
        &actor,
        body.assigned_to,
        body.notes,
    )
    .await;
    let assignment = observed(&state.metrics, "allocate", result)?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "data": assignment }))))
}

pub async fn handle_request_alarm(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<AlarmBody>,
) -> ApiResult<impl IntoResponse> {
    let result = escalation::raise_request_alarm(
        &state.engine,
        &RequestId::from(id),
        &actor,
        body.message.as_deref(),
    )
    .await;
    let delivery = observed(&state.metrics, "request_alarm", result)?;
    Ok(Json(serde_json::json!({ "data": delivery })))
}

pub async fn handle_request_assignments(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let result =
        allocation::request_assignments(&state.engine, &RequestId::from(id), &actor).await;
    let assignments = observed(&state.metrics, "request_assignments", result)?;
    Ok(Json(serde_json::json!({ "data": assignments })))
}

fn parse_status_filter(value: Option<&str>) -> Result<Option<RequestStatus>, CivicError> {
    value.map(RequestStatus::from_str).transpose()
}
