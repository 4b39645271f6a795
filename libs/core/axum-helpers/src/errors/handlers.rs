use axum::{http::StatusCode, response::Response};

use super::{ErrorCode, ErrorResponse};

/// Fallback handler for unknown routes.
pub async fn not_found() -> Response {
    ErrorResponse::new(ErrorCode::NotFound, "The requested resource was not found")
        .into_response_with(StatusCode::NOT_FOUND)
}

/// Handler for 405 Method Not Allowed errors.
pub async fn method_not_allowed() -> Response {
    ErrorResponse::new(
        ErrorCode::MethodNotAllowed,
        ErrorCode::MethodNotAllowed.default_message(),
    )
    .into_response_with(StatusCode::METHOD_NOT_ALLOWED)
}
