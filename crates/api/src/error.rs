//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use helpdesk_shared::{HelpdeskError, ValidationErrors};
use serde_json::json;

use crate::{lyzr::LyzrError, storage::StorageError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Authentication errors
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Authentication required")]
    Unauthorized,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // Resource errors
    #[error("{0} not found")]
    NotFound(&'static str),

    // Upstream errors
    #[error("Agent service error: {0}")]
    Upstream(String),
    #[error("File storage error: {0}")]
    Storage(String),

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", self.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),

            // Validation
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            // Resources
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),

            // Upstream
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", self.to_string()),
            ApiError::Storage(_) => (StatusCode::BAD_GATEWAY, "STORAGE_ERROR", self.to_string()),

            // Internal
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", "Database error".to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource"),
            _ => ApiError::Database(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<HelpdeskError> for ApiError {
    fn from(err: HelpdeskError) -> Self {
        match err {
            HelpdeskError::NotFound(what) => {
                tracing::debug!(missing = %what, "Referenced record not found");
                ApiError::NotFound("Resource")
            }
            HelpdeskError::Database(db_err) => db_err.into(),
        }
    }
}

impl From<LyzrError> for ApiError {
    fn from(err: LyzrError) -> Self {
        tracing::warn!(error = %err, "Agent service call failed");
        ApiError::Upstream(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::warn!(error = %err, "Knowledge base upload failed");
        ApiError::Storage(err.to_string())
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
