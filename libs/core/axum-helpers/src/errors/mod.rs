pub mod handlers;
pub mod responses;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Body of every error response.
///
/// ```json
/// { "error": "Product not found" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Application error type that renders as `{ "error": <message> }`.
///
/// Client errors are logged at info level; server errors at error level with
/// the raw message, which is also what the caller receives.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("{0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("{0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Malformed bodies and query strings are client input errors
            AppError::JsonExtractorRejection(_) | AppError::QueryExtractorRejection(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::JsonExtractorRejection(e) => e.body_text(),
            AppError::QueryExtractorRejection(e) => e.body_text(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", message);
        } else {
            tracing::info!(status = status.as_u16(), "Request rejected: {}", message);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
