//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use symptom_core::{IntakeError, Notice};

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    TooManyRequests(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, notice) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Notice::warning(msg)),
            AppError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, Notice::warning(msg))
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, Notice::error(msg))
            }
        };

        (status, Json(notice)).into_response()
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Internal(format!("Template rendering failed: {}", err))
    }
}
