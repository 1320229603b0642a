//! # Rental Repository
//!
//! Opening, closing and browsing rentals.
//!
//! ## Atomic Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open(new_rental)                     close(rental_id, ended_at, total) │
//! │  ─────────────────                    ─────────────────────────────────  │
//! │  BEGIN                                BEGIN                             │
//! │   INSERT INTO rentals ...              UPDATE rentals SET ended_at,     │
//! │   UPDATE products                        total WHERE open               │
//! │     SET status = 'Rented'              UPDATE products                  │
//! │     WHERE status = 'Available'           SET status = 'Available'       │
//! │  COMMIT                                  WHERE status = 'Rented'        │
//! │                                       COMMIT                            │
//! │                                                                         │
//! │  Any step affecting 0 rows ─► error, transaction dropped (rollback)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The partial unique index `idx_rentals_open_per_product` backs the
//! one-open-rental-per-product rule at the storage layer.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::product::set_status_query;
use rentrack_core::{Money, NewRental, ProductStatus, Rental, RentalHistoryEntry};

const RENTAL_COLUMNS: &str = "id, product_id, customer_name, phone, email, vehicle, place, \
     planned_duration, rental_type, rate_cents, started_at, ended_at, total_cost_cents";

const HISTORY_SELECT: &str = r#"
    SELECT
        r.id AS rental_id,
        r.product_id,
        p.name AS product_name,
        p.tag_id,
        r.customer_name,
        r.phone,
        r.rental_type,
        r.rate_cents,
        r.started_at,
        r.ended_at,
        r.total_cost_cents
    FROM rentals r
    INNER JOIN products p ON p.id = r.product_id
"#;

/// Repository for rental database operations.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    pool: SqlitePool,
}

impl RentalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RentalRepository { pool }
    }

    // =========================================================================
    // Single-Row Writes
    // =========================================================================

    /// Inserts a rental row without touching product status.
    ///
    /// Prefer [`RentalRepository::open`], which also flips the status.
    pub async fn insert(&self, rental: &NewRental) -> DbResult<Rental> {
        let mut conn = self.pool.acquire().await?;
        insert_rental(&mut conn, rental).await
    }

    /// Stamps `ended_at` and `total_cost_cents` on an open rental.
    ///
    /// Prefer [`RentalRepository::close`], which also flips the status.
    pub async fn end(
        &self,
        rental_id: i64,
        ended_at: DateTime<Utc>,
        total: Money,
    ) -> DbResult<Rental> {
        let mut conn = self.pool.acquire().await?;
        end_rental(&mut conn, rental_id, None, ended_at, total).await
    }

    // =========================================================================
    // Transactional Transitions
    // =========================================================================

    /// Opens a rental and marks the product `Rented`, atomically.
    ///
    /// ## Returns
    /// * `Err(DbError::StatusConflict)` - Product is not `Available`
    /// * `Err(DbError::RentalAlreadyOpen)` - Product already has an open rental
    /// * `Err(DbError::ForeignKeyViolation)` - Product doesn't exist
    pub async fn open(&self, rental: &NewRental) -> DbResult<Rental> {
        let mut tx = self.pool.begin().await?;

        let opened = insert_rental(&mut tx, rental).await?;

        let result = sqlx::query(
            "UPDATE products SET status = ?2, last_action_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(rental.product_id)
        .bind(ProductStatus::Rented)
        .bind(rental.started_at)
        .bind(ProductStatus::Available)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::StatusConflict {
                product_id: rental.product_id,
                expected: ProductStatus::Available.to_string(),
            });
        }

        tx.commit().await?;

        info!(
            rental_id = opened.id,
            product_id = opened.product_id,
            customer = %opened.customer_name,
            "Rental opened"
        );
        Ok(opened)
    }

    /// Closes an open rental and marks the product `Available`, atomically.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No open rental with this ID for the product
    /// * `Err(DbError::StatusConflict)` - Product is not `Rented`
    pub async fn close(
        &self,
        rental_id: i64,
        product_id: i64,
        ended_at: DateTime<Utc>,
        total: Money,
    ) -> DbResult<Rental> {
        let mut tx = self.pool.begin().await?;

        let closed = end_rental(&mut tx, rental_id, Some(product_id), ended_at, total).await?;

        let result = sqlx::query(
            "UPDATE products SET status = ?2, last_action_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(product_id)
        .bind(ProductStatus::Available)
        .bind(ended_at)
        .bind(ProductStatus::Rented)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::StatusConflict {
                product_id,
                expected: ProductStatus::Rented.to_string(),
            });
        }

        tx.commit().await?;

        info!(
            rental_id = closed.id,
            product_id = closed.product_id,
            total_cents = total.cents(),
            "Rental closed"
        );
        Ok(closed)
    }

    /// Sets status outside a rental transaction.
    pub async fn set_product_status(
        &self,
        product_id: i64,
        status: ProductStatus,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = set_status_query(product_id, status, at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a rental by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Rental>> {
        let sql = format!("SELECT {} FROM rentals WHERE id = ?1", RENTAL_COLUMNS);

        let rental = sqlx::query_as::<_, Rental>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    /// Gets the open rental of a product, if any.
    pub async fn active_for_product(&self, product_id: i64) -> DbResult<Option<Rental>> {
        let sql = format!(
            "SELECT {} FROM rentals WHERE product_id = ?1 AND ended_at IS NULL",
            RENTAL_COLUMNS
        );

        let rental = sqlx::query_as::<_, Rental>(&sql)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    /// Most recent rentals first, open and closed.
    pub async fn history(&self, limit: u32) -> DbResult<Vec<RentalHistoryEntry>> {
        let sql = format!(
            "{} ORDER BY r.started_at DESC, r.id DESC LIMIT ?1",
            HISTORY_SELECT
        );

        let entries = sqlx::query_as::<_, RentalHistoryEntry>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = entries.len(), limit, "Loaded rental history");
        Ok(entries)
    }

    /// Every open rental, oldest first.
    pub async fn active(&self) -> DbResult<Vec<RentalHistoryEntry>> {
        let sql = format!(
            "{} WHERE r.ended_at IS NULL ORDER BY r.started_at, r.id",
            HISTORY_SELECT
        );

        let entries = sqlx::query_as::<_, RentalHistoryEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }
}

// =============================================================================
// Shared Statements
// =============================================================================
// Take a bare connection so they run the same inside or outside a transaction.

async fn insert_rental(
    conn: &mut sqlx::SqliteConnection,
    rental: &NewRental,
) -> DbResult<Rental> {
    debug!(product_id = rental.product_id, "Inserting rental");

    let sql = format!(
        r#"
        INSERT INTO rentals (
            product_id, customer_name, phone, email, vehicle, place,
            planned_duration, rental_type, rate_cents, started_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        RETURNING {}
        "#,
        RENTAL_COLUMNS
    );

    let c = &rental.customer;
    sqlx::query_as::<_, Rental>(&sql)
        .bind(rental.product_id)
        .bind(&c.customer_name)
        .bind(&c.phone)
        .bind(&c.email)
        .bind(&c.vehicle)
        .bind(&c.place)
        .bind(c.planned_duration)
        .bind(rental.rental_type)
        .bind(rental.rate_cents)
        .bind(rental.started_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DbError::from(e).with_product(rental.product_id))
}

async fn end_rental(
    conn: &mut sqlx::SqliteConnection,
    rental_id: i64,
    product_id: Option<i64>,
    ended_at: DateTime<Utc>,
    total: Money,
) -> DbResult<Rental> {
    debug!(rental_id, total_cents = total.cents(), "Ending rental");

    let sql = format!(
        r#"
        UPDATE rentals SET
            ended_at = ?2,
            total_cost_cents = ?3
        WHERE id = ?1
          AND ended_at IS NULL
          AND (?4 IS NULL OR product_id = ?4)
        RETURNING {}
        "#,
        RENTAL_COLUMNS
    );

    sqlx::query_as::<_, Rental>(&sql)
        .bind(rental_id)
        .bind(ended_at)
        .bind(total.cents())
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Open rental", rental_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use rentrack_core::{CustomerDetails, NewProduct, Product, RentalType, TagId};

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                tag_id: TagId::parse("a55a0019833000e200001b260c02562050e0f800").unwrap(),
                name: "Cutter 11".to_string(),
                category: Some("Cutters".to_string()),
                rental_type: RentalType::PerDay,
                rate: Money::from_cents(10_000),
            })
            .await
            .unwrap();
        (db, product)
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            customer_name: "Ravi Kumar".to_string(),
            phone: "9845012345".to_string(),
            email: None,
            vehicle: Some("KA01AB1234".to_string()),
            place: "Whitefield".to_string(),
            planned_duration: 2,
        }
    }

    fn jan1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_open_sets_rented_and_snapshots_pricing() {
        let (db, product) = setup().await;

        let rental = db
            .rentals()
            .open(&NewRental::for_product(&product, customer(), jan1()))
            .await
            .unwrap();

        assert!(rental.is_active());
        assert_eq!(rental.rate_cents, 10_000);
        assert_eq!(rental.rental_type, RentalType::PerDay);
        assert_eq!(rental.started_at, jan1());

        let product = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(product.status, ProductStatus::Rented);
        assert_eq!(product.last_action_at, Some(jan1()));

        let active = db
            .rentals()
            .active_for_product(product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active, rental);
    }

    #[tokio::test]
    async fn test_second_open_is_rejected_without_side_effects() {
        let (db, product) = setup().await;
        db.rentals()
            .open(&NewRental::for_product(&product, customer(), jan1()))
            .await
            .unwrap();

        let err = db
            .rentals()
            .open(&NewRental::for_product(
                &product,
                customer(),
                jan1() + Duration::hours(1),
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::RentalAlreadyOpen { .. } | DbError::StatusConflict { .. }
        ));

        assert_eq!(db.rentals().history(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_on_rented_product_rolls_back_insert() {
        let (db, product) = setup().await;
        db.products()
            .set_status(product.id, ProductStatus::Rented, jan1())
            .await
            .unwrap();

        let err = db
            .rentals()
            .open(&NewRental::for_product(&product, customer(), jan1()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StatusConflict { .. }));

        // The rental insert was rolled back with the status update
        assert!(db
            .rentals()
            .active_for_product(product.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_close_stamps_end_and_frees_product() {
        let (db, product) = setup().await;
        let rental = db
            .rentals()
            .open(&NewRental::for_product(&product, customer(), jan1()))
            .await
            .unwrap();

        let end = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let closed = db
            .rentals()
            .close(rental.id, product.id, end, Money::from_cents(20_000))
            .await
            .unwrap();

        assert_eq!(closed.ended_at, Some(end));
        assert_eq!(closed.total_cost(), Some(Money::from_cents(20_000)));

        let product = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(product.status, ProductStatus::Available);
        assert!(db
            .rentals()
            .active_for_product(product.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_close_twice_is_not_found() {
        let (db, product) = setup().await;
        let rental = db
            .rentals()
            .open(&NewRental::for_product(&product, customer(), jan1()))
            .await
            .unwrap();
        db.rentals()
            .close(rental.id, product.id, jan1(), Money::zero())
            .await
            .unwrap();

        let err = db
            .rentals()
            .close(rental.id, product.id, jan1(), Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_history_and_active_listing() {
        let (db, product) = setup().await;
        let first = db
            .rentals()
            .open(&NewRental::for_product(&product, customer(), jan1()))
            .await
            .unwrap();
        db.rentals()
            .close(first.id, product.id, jan1() + Duration::days(1), Money::from_cents(10_000))
            .await
            .unwrap();

        let second = db
            .rentals()
            .open(&NewRental::for_product(
                &product,
                customer(),
                jan1() + Duration::days(2),
            ))
            .await
            .unwrap();

        let history = db.rentals().history(10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].rental_id, second.id);
        assert_eq!(history[0].product_name, "Cutter 11");
        assert_eq!(history[1].total_cost_cents, Some(10_000));

        let active = db.rentals().active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].rental_id, second.id);

        assert_eq!(db.rentals().history(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_product_with_history_cannot_be_deleted() {
        let (db, product) = setup().await;
        let rental = db
            .rentals()
            .open(&NewRental::for_product(&product, customer(), jan1()))
            .await
            .unwrap();
        db.rentals()
            .close(rental.id, product.id, jan1(), Money::zero())
            .await
            .unwrap();

        let err = db.products().delete(product.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
