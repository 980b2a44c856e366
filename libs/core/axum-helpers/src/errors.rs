use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// - `code`: Integer error code for logging/monitoring (e.g., 1004)
/// - `error`: Machine-readable error identifier (e.g., "NOT_FOUND")
/// - `message`: Human-readable error message
/// - `details`: Optional additional error details (e.g., validation errors)
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Course 'intro-to-rust' not found"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: i32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, i32, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, 1001, "VALIDATION_ERROR"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, 1002, "BAD_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, 1004, "NOT_FOUND"),
            AppError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, 1500, "INTERNAL_ERROR")
            }
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, 1503, "SERVICE_UNAVAILABLE")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.parts();

        let (message, details) = match self {
            AppError::ValidationError(e) => {
                tracing::info!(error_code = code, "Validation error: {:?}", e);
                (
                    "Request validation failed".to_string(),
                    Some(serde_json::to_value(&e).unwrap_or(serde_json::json!(null))),
                )
            }
            AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                tracing::info!(error_code = code, "{}", msg);
                (msg, None)
            }
            AppError::InternalServerError(msg) => {
                // Details stay in the logs
                tracing::error!(error_code = code, "Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(error_code = code, "Service unavailable: {}", msg);
                (msg, None)
            }
        };

        let body = ErrorResponse {
            code,
            error: error.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Fallback handler for unknown routes
pub async fn not_found() -> AppError {
    AppError::NotFound("The requested resource was not found".to_string())
}
