//! Staff directory listing, used by allocation UIs to pick an assignee.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use civicserve_core::domain::{Actor, Department, Role};
use civicserve_core::foundation::CivicError;

use super::observed;
use crate::api::error::ApiResult;
use crate::api::state::ApiState;

#[derive(Debug, Default, Deserialize)]
pub struct StaffParams {
    pub department: Option<String>,
}

pub async fn handle_staff(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<StaffParams>,
) -> ApiResult<impl IntoResponse> {
    let result = staff_listing(&state, &actor, params);
    let staff = observed(&state.metrics, "directory_staff", result)?;
    Ok(Json(serde_json::json!({ "data": staff })))
}

fn staff_listing(
    state: &ApiState,
    actor: &Actor,
    params: StaffParams,
) -> Result<Vec<civicserve_core::domain::Profile>, CivicError> {
    if actor.role != Role::Staff {
        return Err(CivicError::unauthorized("staff role required"));
    }
    let department = params.department.as_deref().map(Department::from_str).transpose()?;
    state.engine.directory.staff(department)
}
