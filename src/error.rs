//! Domain error types for Report Insight.
//!
//! Uses thiserror for ergonomic error handling with automatic Display
//! implementations. Most report-shape and value problems never become
//! errors at all: they are absorbed as defaults/`None`/`unknown` during
//! normalization. What remains here are the boundary conditions.

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Report source fetch or parse failed
    #[error("Report fetch error: {0}")]
    ReportFetch(String),

    /// No classifier/answer collaborators are loaded yet
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, response_message) = match self {
            AppError::ReportFetch(err_str) => {
                tracing::warn!("Report fetch error: {}", err_str);
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "REPORT_FETCH_FAILED",
                    self.to_string(),
                )
            }
            AppError::NotReady(_) => (
                actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                "NOT_READY",
                self.to_string(),
            ),
            AppError::InvalidInput(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                self.to_string(),
            ),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ReportFetch(err.to_string())
    }
}
