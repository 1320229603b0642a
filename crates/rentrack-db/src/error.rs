//! # Database Errors
//!
//! Error types for database operations.
//!
//! ## Mapping From SQLite
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite / sqlx                                 DbError                  │
//! │  ──────────────────────────────────────        ──────────────────────   │
//! │  UNIQUE constraint failed: products.tag_id  ─► DuplicateTag             │
//! │  UNIQUE constraint failed: rentals.product_id► RentalAlreadyOpen        │
//! │  UNIQUE constraint failed: <other>          ─► UniqueViolation          │
//! │  FOREIGN KEY constraint failed              ─► ForeignKeyViolation      │
//! │  ColumnDecode / Decode ("Rented?" status)   ─► CorruptRecord            │
//! │  RowNotFound                                ─► NotFound                 │
//! │  PoolTimedOut                               ─► PoolExhausted            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

const TAG_UNIQUE_FIELD: &str = "products.tag_id";
const OPEN_RENTAL_UNIQUE_FIELD: &str = "rentals.product_id";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Product or rental ID doesn't exist
    /// - Closing a rental that is already closed
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The tag is already registered to another product.
    ///
    /// ## When This Occurs
    /// - Registering a tag twice
    /// - Editing a product to use another product's tag
    ///
    /// The existing row is left untouched.
    #[error("Tag '{0}' is already registered")]
    DuplicateTag(String),

    /// A product already has an open rental.
    #[error("Product {product_id} already has an open rental")]
    RentalAlreadyOpen { product_id: i64 },

    /// Product status was not what the write expected.
    ///
    /// ## When This Occurs
    /// - Opening a rental on a product that is not `Available`
    /// - Closing a rental on a product that is not `Rented`
    /// - Deleting a product that is out on rental
    ///
    /// The whole transaction is rolled back.
    #[error("Product {product_id} is not {expected}")]
    StatusConflict { product_id: i64, expected: String },

    /// Other unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Deleting a product that still has rental history
    /// - Inserting a rental for a product ID that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A stored value could not be read back.
    ///
    /// ## When This Occurs
    /// - `status` or `rental_type` holds text other than the known values
    /// - Timestamp column holds a malformed date
    ///
    /// Usually means the file was edited by hand.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Replaces an anonymous tag uniqueness failure with one naming the tag.
    pub(crate) fn with_tag(self, tag: &str) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } if field == TAG_UNIQUE_FIELD => {
                DbError::DuplicateTag(tag.to_string())
            }
            other => other,
        }
    }

    /// Names the product in an open-rental uniqueness failure.
    pub(crate) fn with_product(self, product_id: i64) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } if field == OPEN_RENTAL_UNIQUE_FIELD => {
                DbError::RentalAlreadyOpen { product_id }
            }
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // UNIQUE constraint failed: <table>.<column>
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.trim().to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::CorruptRecord(format!("column {}: {}", index, source))
            }

            sqlx::Error::Decode(source) => DbError::CorruptRecord(source.to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_tag_only_rewrites_tag_violations() {
        let err = DbError::UniqueViolation {
            field: "products.tag_id".to_string(),
            value: "unknown".to_string(),
        };
        assert!(matches!(err.with_tag("a55a"), DbError::DuplicateTag(t) if t == "a55a"));

        let err = DbError::UniqueViolation {
            field: "rentals.product_id".to_string(),
            value: "unknown".to_string(),
        };
        assert!(matches!(
            err.with_tag("a55a"),
            DbError::UniqueViolation { .. }
        ));
    }

    #[test]
    fn test_with_product_rewrites_open_rental_violation() {
        let err = DbError::UniqueViolation {
            field: "rentals.product_id".to_string(),
            value: "unknown".to_string(),
        };
        assert!(matches!(
            err.with_product(4),
            DbError::RentalAlreadyOpen { product_id: 4 }
        ));
    }
}
