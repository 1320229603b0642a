//! # Error Types
//!
//! Domain-specific error types for rentrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rentrack-core errors (this file)                                       │
//! │  ├── CoreError        - Rental state / domain rule failures             │
//! │  └── ValidationError  - Form input failures                             │
//! │                                                                         │
//! │  rentrack-db errors                                                     │
//! │  └── DbError          - Database failures (DuplicateTag, NotFound...)   │
//! │                                                                         │
//! │  rentrack-reader errors                                                 │
//! │  └── ReaderError      - DeviceNotFound, Device I/O                      │
//! │                                                                         │
//! │  station errors                                                         │
//! │  └── ApiError         - What the operator sees (code + message)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Rental state and domain rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A tag was detected that no product is registered under.
    ///
    /// ## User Workflow
    /// ```text
    /// Tap unknown tag in Rental view
    ///      │
    ///      ▼
    /// UnregisteredTag("a55a0019...")
    ///      │
    ///      ▼
    /// Station offers: "register this tag?" (prefills the form)
    /// ```
    #[error("Tag {0} is not registered to any product")]
    UnregisteredTag(String),

    /// Product status and the rentals table disagree.
    ///
    /// ## When This Occurs
    /// - Product is `Rented` but has no open rental row
    /// - Product is `Available` but an open rental row exists
    /// - Rows edited by hand outside the station
    ///
    /// The transition is aborted; nothing is written.
    #[error("Inconsistent rental state for product {product_id}: {reason}")]
    InconsistentRentalState { product_id: i64, reason: String },

    /// The product changed state between detection and confirmation.
    #[error("Product {product_id} is now {actual}, expected {expected}")]
    StateChanged {
        product_id: i64,
        expected: String,
        actual: String,
    },

    /// Operation is not allowed while the product is out on rental.
    #[error("Product {0} is currently rented")]
    ProductRented(i64),

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs; state is never changed.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (bad tag ID, bad amount, bad email...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn too_long(field: &str, max: usize) -> Self {
        ValidationError::TooLong {
            field: field.to_string(),
            max,
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InconsistentRentalState {
            product_id: 7,
            reason: "status is Rented but no open rental exists".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Inconsistent rental state for product 7: status is Rented but no open rental exists"
        );

        let err = CoreError::UnregisteredTag("a55a00".to_string());
        assert_eq!(err.to_string(), "Tag a55a00 is not registered to any product");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("phone").to_string(), "phone is required");
        assert_eq!(
            ValidationError::too_long("name", 200).to_string(),
            "name must be at most 200 characters"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("tag").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
