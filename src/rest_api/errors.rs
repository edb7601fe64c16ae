//! # REST API Errors
//!
//! Error types for the REST API module.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::model::ValidationErrors;
use crate::observability::Logger;
use crate::store::StoreError;

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Invalid query parameter
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    /// Invalid request body
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Field-level validation failure
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    /// Resource not found
    #[error("Not found.")]
    NotFound,

    /// Format suffix or `?format=` other than json
    #[error("Not found: unsupported format '{0}'")]
    UnsupportedFormat(String),

    /// `If-Match` / `If-None-Match` / `If-Unmodified-Since` did not hold
    #[error("Precondition failed")]
    PreconditionFailed,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Internal error during request handling
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RestError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RestError::Validation(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            RestError::NotFound => StatusCode::NOT_FOUND,
            RestError::UnsupportedFormat(_) => StatusCode::NOT_FOUND,

            // 412 Precondition Failed
            RestError::PreconditionFailed => StatusCode::PRECONDITION_FAILED,

            // 500 Internal Server Error
            RestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for RestError {
    fn from(errors: ValidationErrors) -> Self {
        RestError::Validation(errors)
    }
}

impl From<StoreError> for RestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => RestError::NotFound,
            StoreError::InvalidReference { field, id } => RestError::Validation(
                ValidationErrors::single(
                    field,
                    format!("Invalid pk \"{}\" - object does not exist.", id),
                ),
            ),
            StoreError::Invalid(message) => RestError::InvalidBody(message.to_string()),
            other => {
                let message = other.to_string();
                Logger::error("STORE_ERROR", &[("error", &message)]);
                RestError::Internal(message)
            }
        }
    }
}

impl From<JsonRejection> for RestError {
    fn from(rejection: JsonRejection) -> Self {
        RestError::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for RestError {
    fn from(_: PathRejection) -> Self {
        RestError::NotFound
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
}

impl From<RestError> for ErrorResponse {
    fn from(err: RestError) -> Self {
        let code = err.status_code().as_u16();
        let error = err.to_string();
        let fields = match err {
            RestError::Validation(errors) => Some(errors),
            _ => None,
        };
        Self {
            error,
            code,
            fields,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
