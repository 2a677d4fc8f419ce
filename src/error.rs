use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Use the verify-pickup endpoint to complete orders")]
    InvalidTransition,

    #[error("Order is not ready for pickup")]
    NotReady,

    #[error("Invalid pickup code")]
    CodeMismatch,

    #[error("Only completed orders can be rated")]
    NotCompleted,

    #[error("{0}")]
    ValidationFailed(String),

    #[error("{0}")]
    RoleMismatch(String),

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("Record was modified concurrently, reload and retry")]
    Conflict,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidTransition => "INVALID_TRANSITION",
            AppError::NotReady => "NOT_READY",
            AppError::CodeMismatch => "CODE_MISMATCH",
            AppError::NotCompleted => "NOT_COMPLETED",
            AppError::ValidationFailed(_) => "VALIDATION_FAILED",
            AppError::RoleMismatch(_) => "ROLE_MISMATCH",
            AppError::InvalidOtp => "INVALID_OTP",
            AppError::Conflict => "CONFLICT",
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::InvalidTransition
            | AppError::NotReady
            | AppError::CodeMismatch
            | AppError::NotCompleted => StatusCode::BAD_REQUEST,
            AppError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RoleMismatch(_) => StatusCode::FORBIDDEN,
            AppError::InvalidOtp => StatusCode::UNAUTHORIZED,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    kind: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                kind: self.kind(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Map a failed conditional update to [`AppError::Conflict`].
pub(crate) fn version_conflict(err: sea_orm::DbErr) -> AppError {
    match err {
        sea_orm::DbErr::RecordNotUpdated => AppError::Conflict,
        other => AppError::OrmError(other),
    }
}
