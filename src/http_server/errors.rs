//! # HTTP Errors

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler errors. An unmatched question is not one of them.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
