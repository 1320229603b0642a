//! # API Error Type
//!
//! Unified error type for station commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command Function  ─►  ApiResult<T>                                     │
//! │         │                                                               │
//! │         ├── ValidationError  (bad form input)   ──┐                     │
//! │         ├── CoreError        (rental rules)     ──┤                     │
//! │         ├── DbError          (storage)          ──┼──►  ApiError        │
//! │         └── ReaderError      (serial device)    ──┘    { code, message }│
//! │                                                             │           │
//! │                                                             ▼           │
//! │                                               console prints message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details (SQL text, driver errors) are logged, not shown.

use serde::Serialize;
use std::fmt;
use tracing::error;

use rentrack_core::{CoreError, ValidationError};
use rentrack_db::DbError;
use rentrack_reader::ReaderError;

/// Error returned from station commands.
///
/// ## Serialization
/// ```json
/// { "code": "DUPLICATE_TAG", "message": "Tag a55a... is already registered" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,
}

/// Error codes for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    DuplicateTag,
    UnregisteredTag,

    /// Product status and rentals disagree, or changed under us
    RentalState,

    /// Product is rented or has history, so the request is refused
    Conflict,

    DeviceError,
    DatabaseError,
    Internal,
}

/// Result type for station commands.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::DuplicateTag(tag) => ApiError::new(
                ErrorCode::DuplicateTag,
                format!("Tag {} is already registered", tag),
            ),
            DbError::RentalAlreadyOpen { product_id } => ApiError::new(
                ErrorCode::RentalState,
                format!("Product {} already has an open rental", product_id),
            ),
            DbError::StatusConflict {
                product_id,
                expected,
            } => ApiError::new(
                ErrorCode::Conflict,
                format!("Product {} is not {}", product_id, expected),
            ),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                error!(message = %message, "Foreign key violation");
                ApiError::new(
                    ErrorCode::Conflict,
                    "Product has rental history and cannot be deleted",
                )
            }
            DbError::CorruptRecord(detail) => {
                error!(detail = %detail, "Corrupt record");
                ApiError::new(
                    ErrorCode::RentalState,
                    "A stored record has an unknown status or rental type",
                )
            }
            DbError::ConnectionFailed(e) => {
                error!(error = %e, "Database connection failed");
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!(error = %e, "Database migration failed");
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!(error = %e, "Database query failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Internal(e) => {
                error!(error = %e, "Internal database error");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnregisteredTag(tag) => ApiError::new(
                ErrorCode::UnregisteredTag,
                format!("Tag {} is not registered", tag),
            ),
            e @ CoreError::InconsistentRentalState { .. } => {
                error!(error = %e, "Rental state inconsistent");
                ApiError::new(ErrorCode::RentalState, e.to_string())
            }
            e @ CoreError::StateChanged { .. } => ApiError::new(ErrorCode::RentalState, e.to_string()),
            e @ CoreError::ProductRented(_) => ApiError::new(ErrorCode::Conflict, e.to_string()),
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ReaderError> for ApiError {
    fn from(err: ReaderError) -> Self {
        ApiError::new(ErrorCode::DeviceError, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_tag_code() {
        let err: ApiError = DbError::DuplicateTag("a55a00".to_string()).into();
        assert_eq!(err.code, ErrorCode::DuplicateTag);
        assert!(err.message.contains("a55a00"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: ApiError = DbError::QueryFailed("no such column: rate".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("column"));
    }

    #[test]
    fn test_validation_passes_through_core() {
        let err: ApiError =
            CoreError::Validation(ValidationError::Required { field: "phone".into() }).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("phone"));
    }

    #[test]
    fn test_serializes_screaming_code() {
        let err = ApiError::new(ErrorCode::UnregisteredTag, "x");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"UNREGISTERED_TAG","message":"x"}"#);
    }

    #[test]
    fn test_reader_error_is_device_error() {
        let err: ApiError = ReaderError::Device("broken pipe".into()).into();
        assert_eq!(err.code, ErrorCode::DeviceError);
    }
}
