//! Error types for sentiment-api
//!
//! Maps validation failures and pipeline errors onto HTTP responses with a
//! uniform JSON body: `{"error": {"code": ..., "message": ...}}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned to clients when analysis fails; details go to the log only
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze sentiment";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed validation (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Body was not sent as JSON (415)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Unknown route (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Route exists but not for this method (405)
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Pipeline failure (500)
    #[error("Analysis failed: {0}")]
    Analysis(#[from] sentiment_core::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMediaType(
                "Content-Type must be application/json".to_string(),
            ),
            other => ApiError::Validation(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg,
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::MethodNotAllowed(msg) => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                msg,
            ),
            ApiError::Analysis(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ANALYSIS_FAILED",
                ANALYSIS_FAILED_MESSAGE.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
