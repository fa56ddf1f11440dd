//! Domain error types for the monitoring upload portal.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Uploaded file could not be decoded as the declared tabular kind
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// No catalog entry for the requested category
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The parse produced zero data rows
    #[error("Empty payload: {0}")]
    EmptyPayload(String),

    /// The period/category foreign-key chain could not be resolved at staging
    #[error("Unresolved foreign key: {0}")]
    UnresolvedForeignKey(String),

    /// The column mapping vanished between staging and approval
    #[error("Unresolved schema: {0}")]
    UnresolvedSchema(String),

    /// A decision was attempted against a non-pending artifact
    #[error("Artifact {0} has already been decided")]
    AlreadyDecided(uuid::Uuid),

    /// A row insert failed during commit; the whole transaction was rolled back
    #[error("Insert failed: {0}")]
    InsertFailed(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Filesystem operation failed
    #[error("Filesystem error: {0}")]
    FileSystem(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Server is over capacity
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;

        let (status, error_code, response_message) = match self {
            AppError::MalformedInput(_) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_INPUT", self.to_string())
            }
            AppError::UnknownCategory(_) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_CATEGORY", self.to_string())
            }
            AppError::EmptyPayload(_) => {
                (StatusCode::BAD_REQUEST, "EMPTY_PAYLOAD", self.to_string())
            }
            AppError::UnresolvedForeignKey(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNRESOLVED_FOREIGN_KEY",
                self.to_string(),
            ),
            AppError::UnresolvedSchema(_) => {
                (StatusCode::CONFLICT, "UNRESOLVED_SCHEMA", self.to_string())
            }
            AppError::AlreadyDecided(_) => {
                (StatusCode::CONFLICT, "ALREADY_DECIDED", self.to_string())
            }
            AppError::InsertFailed(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INSERT_FAILED",
                format!(
                    "{}. No rows were committed; the artifact remains pending and may be retried.",
                    self
                ),
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::FileSystem(err_str) => {
                tracing::error!("Filesystem error: {}", err_str);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FILESYSTEM_ERROR",
                    "An internal filesystem error occurred".to_string(),
                )
            }
            AppError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", self.to_string())
            }
            AppError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            }
            AppError::ServiceUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                self.to_string(),
            ),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching the OpenAPI schema.
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

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid UUID: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_staging_errors_map_to_bad_request() {
        for err in [
            AppError::MalformedInput("bad bytes".into()),
            AppError::UnknownCategory("NOx".into()),
            AppError::EmptyPayload("no data rows".into()),
        ] {
            assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_decision_conflicts_map_to_conflict() {
        let err = AppError::AlreadyDecided(uuid::Uuid::nil());
        assert_eq!(err.error_response().status(), StatusCode::CONFLICT);

        let err = AppError::UnresolvedSchema("table gone".into());
        assert_eq!(err.error_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_insert_failed_is_retryable() {
        let err = AppError::InsertFailed("numeric overflow".into());
        assert_eq!(
            err.error_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_database_detail_is_not_leaked() {
        let err = AppError::Database("password authentication failed".into());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
