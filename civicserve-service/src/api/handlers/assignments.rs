//! Assignment ledger endpoints for the assignee side: own listings and
//! accept/reject/complete updates.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use civicserve_core::application::allocation;
use civicserve_core::domain::{Actor, AssignmentStatus};
use civicserve_core::foundation::AssignmentId;

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
}

pub async fn handle_list(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let status = params.status.as_deref().map(AssignmentStatus::from_str).transpose()?;
    let result = allocation::staff_assignments(&state.engine, &actor, status).await;
    let assignments = observed(&state.metrics, "assignments", result)?;
    Ok(Json(serde_json::json!({ "data": assignments })))
}

pub async fn handle_status(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<impl IntoResponse> {
    let new_status = AssignmentStatus::from_str(&body.status)?;
    let result =
        allocation::update_assignment(&state.engine, &AssignmentId::from(id), &actor, new_status)
            .await;
    let assignment = observed(&state.metrics, "assignment_update", result)?;
    Ok(Json(serde_json::json!({ "data": assignment })))
}
