//! Urgent alarm endpoint: any authenticated user fans an urgent
//! notification out to staff, optionally narrowed to one department.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use civicserve_core::application::escalation;
use civicserve_core::domain::{Actor, Department};

use super::observed;
use crate::api::error::ApiResult;
use crate::api::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct AlarmBody {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub department: Option<String>,
}

pub async fn handle_raise(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<AlarmBody>,
) -> ApiResult<impl IntoResponse> {
    let department = body.department.as_deref().map(Department::from_str).transpose()?;
    let result =
        escalation::raise_alarm(&state.engine, &actor, &body.title, &body.message, department)
            .await;
    let delivery = observed(&state.metrics, "alarm", result)?;
    Ok(Json(serde_json::json!({ "data": delivery })))
}
