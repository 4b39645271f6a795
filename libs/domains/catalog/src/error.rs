use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        CatalogError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Prefix store failures with the operation that produced them.
    ///
    /// Client-facing kinds pass through untouched.
    pub fn context(self, operation: impl std::fmt::Display) -> Self {
        match self {
            CatalogError::Store(msg) => CatalogError::Store(format!("{}: {}", operation, msg)),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidIdentifier(id) => AppError::InvalidIdentifier(id),
            err @ CatalogError::NotFound { .. } => AppError::NotFound(err.to_string()),
            CatalogError::InvalidRequest(msg) => AppError::BadRequest(msg),
            CatalogError::Conflict(msg) => AppError::Conflict(msg),
            CatalogError::Store(msg) => {
                // driver detail stays in the logs
                tracing::error!(error = %msg, "Catalog store failure");
                AppError::InternalServerError("The catalog store failed to complete the request".to_string())
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

const DUPLICATE_KEY: i32 = 11000;

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        match err.kind.as_ref() {
            // unique index on a business code
            ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY => {
                CatalogError::Conflict(format!("Duplicate key: {}", write.message))
            }
            _ => CatalogError::Store(err.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for CatalogError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        CatalogError::Store(format!("BSON serialization failed: {}", err))
    }
}

impl From<mongodb::bson::de::Error> for CatalogError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        CatalogError::Store(format!("BSON deserialization failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(err: validator::ValidationErrors) -> Self {
        CatalogError::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_context_only_touches_store_errors() {
        let err = CatalogError::Store("connection reset".to_string()).context("products.update");
        assert_eq!(err.to_string(), "Store error: products.update: connection reset");

        let err = CatalogError::not_found("Product", "abc").context("products.update");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CatalogError::InvalidIdentifier("x".into()), StatusCode::BAD_REQUEST),
            (CatalogError::not_found("Brand", 7), StatusCode::NOT_FOUND),
            (CatalogError::InvalidRequest("empty".into()), StatusCode::BAD_REQUEST),
            (CatalogError::Conflict("dup".into()), StatusCode::CONFLICT),
            (CatalogError::Store("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
