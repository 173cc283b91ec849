//! Error types for the PDFEdit server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::document::{ErrorKind, OperationError};

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Operation(e) => match e.kind() {
                ErrorKind::MalformedParameter => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Engine => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) | AppError::Timeout(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error_type, message) = match &self {
            AppError::Operation(e) => match e.kind() {
                ErrorKind::MalformedParameter => ("malformed_parameter", e.to_string()),
                ErrorKind::Validation => ("validation_error", e.to_string()),
                ErrorKind::Engine => {
                    tracing::error!("PDF engine error: {}", e);
                    ("engine_error", "The PDF engine failed to process the document".to_string())
                }
            },
            AppError::BadRequest(msg) => ("bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string())
            }
            AppError::Timeout(secs) => {
                tracing::error!("Operation timed out after {}s", secs);
                ("timeout", "The operation took too long".to_string())
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                ("io_error", "IO error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
