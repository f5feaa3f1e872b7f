use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::meeting::SchedulingError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The string payloads are short machine-readable reasons (`missing_fields`,
/// `job_not_found`, ...) that the frontend switches on.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error("Validation error: {0}")]
    Validation(&'static str),

    /// A workflow guard refused the operation for the record's current status.
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Conflict: {0}")]
    Conflict(&'static str),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Forbidden")]
    Forbidden,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidState { .. } => {
                tracing::debug!("Rejected meeting transition: {err}");
                AppError::InvalidState("invalid_state")
            }
            SchedulingError::SlotNotFound => AppError::NotFound("slot_not_found"),
            SchedulingError::InvalidSlot => AppError::Validation("invalid_time_slot"),
            SchedulingError::NoSlots => AppError::Validation("missing_fields"),
            SchedulingError::MissingReason => AppError::Validation("missing_reason"),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::Validation("invalid_body")
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path parameter: {}", rejection.body_text());
        AppError::Validation("invalid_path")
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Rejected query string: {}", rejection.body_text());
        AppError::Validation("invalid_query")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(reason) => (StatusCode::NOT_FOUND, "NOT_FOUND", reason.to_string()),
            AppError::Validation(reason) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                reason.to_string(),
            ),
            AppError::InvalidState(reason) => (
                StatusCode::BAD_REQUEST,
                "INVALID_STATE",
                reason.to_string(),
            ),
            AppError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason.to_string()),
            AppError::Unauthorized(reason) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                reason.to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "forbidden".to_string(),
            ),
            AppError::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "not_found".to_string())
            }
            AppError::Store(StoreError::Conflict) => {
                (StatusCode::CONFLICT, "CONFLICT", "conflict".to_string())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
