use std::io;

use thiserror::Error;

/// Stable machine-readable classification of a [`CivicError`].
///
/// The HTTP layer maps these onto status codes and the REST error
/// envelope; storage backends use them to distinguish retryable from
/// permanent failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Unauthorized,
    NotFound,
    InvalidTransition,
    Conflict,
    Storage,
    Serialization,
    Config,
    Mail,
    Message,
}

/// Snapshot of an error's code and rendered message, for transport
/// surfaces that need both without holding the error itself.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum CivicError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("conflict on {kind} {id}: {details}")]
    Conflict {
        kind: &'static str,
        id: String,
        details: String,
    },

    #[error("storage error during {operation}: {details}")]
    Storage { operation: String, details: String },

    #[error("{format} serialization error: {details}")]
    Serialization { format: String, details: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("mail delivery to {recipient} failed: {details}")]
    Mail { recipient: String, details: String },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, CivicError>;

impl CivicError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CivicError::Validation(_) => ErrorCode::Validation,
            CivicError::Unauthorized(_) => ErrorCode::Unauthorized,
            CivicError::NotFound { .. } => ErrorCode::NotFound,
            CivicError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CivicError::Conflict { .. } => ErrorCode::Conflict,
            CivicError::Storage { .. } => ErrorCode::Storage,
            CivicError::Serialization { .. } => ErrorCode::Serialization,
            CivicError::Config(_) => ErrorCode::Config,
            CivicError::Mail { .. } => ErrorCode::Mail,
            CivicError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CivicError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        CivicError::Unauthorized(message.into())
    }

    pub fn request_not_found(id: impl Into<String>) -> Self {
        CivicError::NotFound { kind: "request", id: id.into() }
    }

    pub fn assignment_not_found(id: impl Into<String>) -> Self {
        CivicError::NotFound { kind: "assignment", id: id.into() }
    }

    pub fn storage(operation: impl Into<String>, details: impl Into<String>) -> Self {
        CivicError::Storage { operation: operation.into(), details: details.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        CivicError::Config(message.into())
    }
}

impl From<io::Error> for CivicError {
    fn from(err: io::Error) -> Self {
        CivicError::storage("io", err.to_string())
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here. Construct
// structured `CivicError` variants at the call site so context survives.

/// Shorthand for building a [`CivicError::Storage`] with a formatted detail
/// string.
#[macro_export]
macro_rules! storage_err {
    ($op:expr, $($arg:tt)*) => {
        $crate::foundation::error::CivicError::Storage {
            operation: $op.to_string(),
            details: format!($($arg)*),
        }
    };
}
