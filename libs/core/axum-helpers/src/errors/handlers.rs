use axum::response::{IntoResponse, Response};

use super::AppError;

pub const NOT_FOUND_MESSAGE: &str = "Not found";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// Router fallback for unknown paths.
pub async fn not_found() -> Response {
    AppError::NotFound(NOT_FOUND_MESSAGE.to_string()).into_response()
}

/// Method-router fallback for verbs a resource does not handle.
pub async fn method_not_allowed() -> Response {
    AppError::MethodNotAllowed(METHOD_NOT_ALLOWED_MESSAGE.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_fallback_statuses() {
        assert_eq!(not_found().await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            method_not_allowed().await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
