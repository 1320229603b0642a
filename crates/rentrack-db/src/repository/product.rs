//! # Product Repository
//!
//! Registration, editing and lookup of tagged products.
//!
//! ## Tag Lookup Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reader frame ─► TagId ─► get_by_tag(tag)                               │
//! │                               │                                         │
//! │                               │  SELECT ... WHERE tag_id = ?            │
//! │                               │  (UNIQUE index: one row or none)        │
//! │                               ▼                                         │
//! │                     Some(Product) / None (unregistered tag)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status is written only by [`ProductRepository::set_status`] and the
//! rental transactions. Insert always writes `Available`; update never
//! touches status.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use rentrack_core::{NewProduct, Product, ProductStatus, ProductUpdate, TagId};

pub(crate) const PRODUCT_COLUMNS: &str = "id, tag_id, name, category, status, rental_type, \
     rate_cents, last_action_at, created_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Registers a new product as `Available`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted row with its assigned ID
    /// * `Err(DbError::DuplicateTag)` - Tag already registered; nothing written
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(tag = %product.tag_id, name = %product.name, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO products (
                tag_id, name, category, status, rental_type, rate_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(&product.tag_id)
            .bind(&product.name)
            .bind(&product.category)
            .bind(ProductStatus::Available)
            .bind(product.rental_type)
            .bind(product.rate.cents())
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_tag(product.tag_id.as_str()))
    }

    /// Updates the editable fields of a product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No product with this ID
    /// * `Err(DbError::DuplicateTag)` - New tag belongs to another product
    pub async fn update(&self, id: i64, update: &ProductUpdate) -> DbResult<Product> {
        debug!(id = %id, tag = %update.tag_id, "Updating product");

        let sql = format!(
            r#"
            UPDATE products SET
                tag_id = ?2,
                name = ?3,
                category = ?4,
                rental_type = ?5,
                rate_cents = ?6
            WHERE id = ?1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&update.tag_id)
            .bind(&update.name)
            .bind(&update.category)
            .bind(update.rental_type)
            .bind(update.rate.cents())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_tag(update.tag_id.as_str()))?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product that is not out on rental.
    ///
    /// ## Returns
    /// * `Err(DbError::StatusConflict)` - Product is currently rented
    /// * `Err(DbError::ForeignKeyViolation)` - Product has rental history
    /// * `Err(DbError::NotFound)` - No product with this ID
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND status = ?2")
            .bind(id)
            .bind(ProductStatus::Available)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(id).await {
                Ok(Some(_)) | Err(DbError::CorruptRecord(_)) => Err(DbError::StatusConflict {
                    product_id: id,
                    expected: ProductStatus::Available.to_string(),
                }),
                Ok(None) => Err(DbError::not_found("Product", id)),
                Err(e) => Err(e),
            };
        }

        Ok(())
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets the product a tag is registered to.
    pub async fn get_by_tag(&self, tag: &TagId) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE tag_id = ?1", PRODUCT_COLUMNS);

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(tag)
            .fetch_optional(&self.pool)
            .await?;

        debug!(tag = %tag, found = product.is_some(), "Looked up tag");
        Ok(product)
    }

    /// Lists all products, by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY name, id", PRODUCT_COLUMNS);

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Sets status and stamps `last_action_at`.
    pub async fn set_status(
        &self,
        id: i64,
        status: ProductStatus,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = set_status_query(id, status, at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts registered products (for diagnostics and the seed tool).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

pub(crate) fn set_status_query<'q>(
    id: i64,
    status: ProductStatus,
    at: DateTime<Utc>,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    sqlx::query("UPDATE products SET status = ?2, last_action_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(status)
        .bind(at)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use rentrack_core::{Money, RentalType};

    const CUTTER_TAG: &str = "a55a0019833000e200001b260c02562050e0f800";
    const GRINDER_TAG: &str = "a55a0019833000e200001b6604009417203cbf00";

    fn new_product(tag: &str, name: &str) -> NewProduct {
        NewProduct {
            tag_id: TagId::parse(tag).unwrap(),
            name: name.to_string(),
            category: Some("Cutters".to_string()),
            rental_type: RentalType::PerDay,
            rate: Money::from_cents(10_000),
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_creates_available_product() {
        let db = db().await;
        let product = db
            .products()
            .insert(&new_product(CUTTER_TAG, "Cutter 11"))
            .await
            .unwrap();

        assert!(product.id > 0);
        assert_eq!(product.status, ProductStatus::Available);
        assert_eq!(product.rate_cents, 10_000);
        assert_eq!(product.last_action_at, None);

        let fetched = db
            .products()
            .get_by_tag(&TagId::parse(CUTTER_TAG).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, product);
    }

    #[tokio::test]
    async fn test_duplicate_tag_is_rejected_and_original_kept() {
        let db = db().await;
        let original = db
            .products()
            .insert(&new_product(CUTTER_TAG, "Cutter 11"))
            .await
            .unwrap();

        let err = db
            .products()
            .insert(&new_product(CUTTER_TAG, "Impostor"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateTag(ref t) if t == CUTTER_TAG));

        let all = db.products().list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], original);
    }

    #[tokio::test]
    async fn test_update_does_not_touch_status() {
        let db = db().await;
        let product = db
            .products()
            .insert(&new_product(CUTTER_TAG, "Cutter 11"))
            .await
            .unwrap();
        db.products()
            .set_status(product.id, ProductStatus::Rented, Utc::now())
            .await
            .unwrap();

        let updated = db
            .products()
            .update(
                product.id,
                &ProductUpdate {
                    tag_id: product.tag_id.clone(),
                    name: "Cutter 11 (blue)".to_string(),
                    category: None,
                    rental_type: RentalType::PerHour,
                    rate: Money::from_cents(2_500),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Cutter 11 (blue)");
        assert_eq!(updated.rental_type, RentalType::PerHour);
        assert_eq!(updated.status, ProductStatus::Rented);
    }

    #[tokio::test]
    async fn test_update_to_taken_tag_fails() {
        let db = db().await;
        db.products()
            .insert(&new_product(CUTTER_TAG, "Cutter 11"))
            .await
            .unwrap();
        let grinder = db
            .products()
            .insert(&new_product(GRINDER_TAG, "Grinder 05"))
            .await
            .unwrap();

        let err = db
            .products()
            .update(
                grinder.id,
                &ProductUpdate {
                    tag_id: TagId::parse(CUTTER_TAG).unwrap(),
                    name: grinder.name.clone(),
                    category: None,
                    rental_type: grinder.rental_type,
                    rate: grinder.rate(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateTag(_)));
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = db().await;
        let err = db
            .products()
            .update(
                42,
                &ProductUpdate {
                    tag_id: TagId::parse(CUTTER_TAG).unwrap(),
                    name: "Ghost".to_string(),
                    category: None,
                    rental_type: RentalType::PerDay,
                    rate: Money::zero(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let product = db
            .products()
            .insert(&new_product(CUTTER_TAG, "Cutter 11"))
            .await
            .unwrap();

        db.products()
            .set_status(product.id, ProductStatus::Rented, Utc::now())
            .await
            .unwrap();
        assert!(matches!(
            db.products().delete(product.id).await,
            Err(DbError::StatusConflict { .. })
        ));

        db.products()
            .set_status(product.id, ProductStatus::Available, Utc::now())
            .await
            .unwrap();
        db.products().delete(product.id).await.unwrap();
        assert_eq!(db.products().count().await.unwrap(), 0);

        assert!(matches!(
            db.products().delete(product.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_status_surfaces_as_corrupt_record() {
        let db = db().await;
        let product = db
            .products()
            .insert(&new_product(CUTTER_TAG, "Cutter 11"))
            .await
            .unwrap();

        sqlx::query("UPDATE products SET status = 'Lost' WHERE id = ?1")
            .bind(product.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db
            .products()
            .get_by_tag(&product.tag_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CorruptRecord(_)));
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let db = db().await;
        db.products()
            .insert(&new_product(GRINDER_TAG, "Grinder 05"))
            .await
            .unwrap();
        db.products()
            .insert(&new_product(CUTTER_TAG, "Cutter 11"))
            .await
            .unwrap();

        let names: Vec<String> = db
            .products()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Cutter 11", "Grinder 05"]);
    }
}
