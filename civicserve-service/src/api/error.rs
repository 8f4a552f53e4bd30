//! Maps core errors onto HTTP statuses and the REST error envelope
//! `{"error": {"code", "message"}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, error};

use civicserve_core::foundation::{CivicError, ErrorCode};

pub struct ApiError(pub CivicError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<CivicError> for ApiError {
    fn from(err: CivicError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidTransition | ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Storage
        | ErrorCode::Serialization
        | ErrorCode::Config
        | ErrorCode::Mail
        | ErrorCode::Message => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn code_label(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::Validation => "validation",
        ErrorCode::Unauthorized => "unauthorized",
        ErrorCode::NotFound => "not_found",
        ErrorCode::InvalidTransition => "invalid_transition",
        ErrorCode::Conflict => "conflict",
        ErrorCode::Storage => "storage",
        ErrorCode::Serialization => "serialization",
        ErrorCode::Config => "config",
        ErrorCode::Mail => "mail",
        ErrorCode::Message => "internal",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let context = self.0.context();
        let status = status_for(context.code);
        if status.is_server_error() {
            error!("api error status={} code={:?} message={}", status, context.code, context.message);
        } else {
            debug!("api rejection status={} code={:?} message={}", status, context.code, context.message);
        }
        let body = serde_json::json!({
            "error": {
                "code": code_label(context.code),
                "message": context.message,
            }
        });
        (status, Json(body)).into_response()
    }
}
