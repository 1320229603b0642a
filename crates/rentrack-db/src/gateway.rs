//! # Persistence Gateway
//!
//! The storage contract the rental flow is written against.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  station::commands::rental::detect / confirm_start / confirm_end        │
//! │       │                                                                 │
//! │       │  G: RentalGateway                                               │
//! │       ▼                                                                 │
//! │  impl RentalGateway for Database  ──►  ProductRepository                │
//! │                                   ──►  RentalRepository                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method returns a typed [`DbResult`]. Nothing here decides whether
//! a rental should start or end; that is `rentrack_core::resolve`.

use chrono::{DateTime, Utc};
use std::future::Future;

use crate::error::DbResult;
use crate::pool::Database;
use rentrack_core::{
    Money, NewProduct, NewRental, Product, ProductStatus, ProductUpdate, Rental,
    RentalHistoryEntry, TagId,
};

/// Storage operations needed by the rental station.
pub trait RentalGateway: Send + Sync {
    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Registers a product as `Available`. Fails with `DuplicateTag`.
    fn add_product(&self, product: &NewProduct) -> impl Future<Output = DbResult<Product>> + Send;

    /// Edits name, tag, category and pricing. Never changes status.
    fn update_product(
        &self,
        id: i64,
        update: &ProductUpdate,
    ) -> impl Future<Output = DbResult<Product>> + Send;

    fn delete_product(&self, id: i64) -> impl Future<Output = DbResult<()>> + Send;

    fn list_products(&self) -> impl Future<Output = DbResult<Vec<Product>>> + Send;

    fn fetch_product(&self, id: i64) -> impl Future<Output = DbResult<Option<Product>>> + Send;

    fn fetch_product_by_tag(
        &self,
        tag: &TagId,
    ) -> impl Future<Output = DbResult<Option<Product>>> + Send;

    fn update_product_status(
        &self,
        id: i64,
        status: ProductStatus,
        at: DateTime<Utc>,
    ) -> impl Future<Output = DbResult<()>> + Send;

    // -------------------------------------------------------------------------
    // Rentals
    // -------------------------------------------------------------------------

    /// Inserts a rental row only.
    fn add_rental(&self, rental: &NewRental) -> impl Future<Output = DbResult<Rental>> + Send;

    /// Closes a rental row only.
    fn end_rental(
        &self,
        rental_id: i64,
        ended_at: DateTime<Utc>,
        total: Money,
    ) -> impl Future<Output = DbResult<Rental>> + Send;

    fn fetch_active_rental_for_product(
        &self,
        product_id: i64,
    ) -> impl Future<Output = DbResult<Option<Rental>>> + Send;

    /// Inserts the rental and marks the product `Rented` in one transaction.
    fn open_rental(&self, rental: &NewRental) -> impl Future<Output = DbResult<Rental>> + Send;

    /// Closes the rental and marks the product `Available` in one transaction.
    fn close_rental(
        &self,
        rental_id: i64,
        product_id: i64,
        ended_at: DateTime<Utc>,
        total: Money,
    ) -> impl Future<Output = DbResult<Rental>> + Send;

    fn rental_history(
        &self,
        limit: u32,
    ) -> impl Future<Output = DbResult<Vec<RentalHistoryEntry>>> + Send;

    fn active_rentals(&self) -> impl Future<Output = DbResult<Vec<RentalHistoryEntry>>> + Send;
}

impl RentalGateway for Database {
    async fn add_product(&self, product: &NewProduct) -> DbResult<Product> {
        self.products().insert(product).await
    }

    async fn update_product(&self, id: i64, update: &ProductUpdate) -> DbResult<Product> {
        self.products().update(id, update).await
    }

    async fn delete_product(&self, id: i64) -> DbResult<()> {
        self.products().delete(id).await
    }

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        self.products().list().await
    }

    async fn fetch_product(&self, id: i64) -> DbResult<Option<Product>> {
        self.products().get_by_id(id).await
    }

    async fn fetch_product_by_tag(&self, tag: &TagId) -> DbResult<Option<Product>> {
        self.products().get_by_tag(tag).await
    }

    async fn update_product_status(
        &self,
        id: i64,
        status: ProductStatus,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        self.products().set_status(id, status, at).await
    }

    async fn add_rental(&self, rental: &NewRental) -> DbResult<Rental> {
        self.rentals().insert(rental).await
    }

    async fn end_rental(
        &self,
        rental_id: i64,
        ended_at: DateTime<Utc>,
        total: Money,
    ) -> DbResult<Rental> {
        self.rentals().end(rental_id, ended_at, total).await
    }

    async fn fetch_active_rental_for_product(&self, product_id: i64) -> DbResult<Option<Rental>> {
        self.rentals().active_for_product(product_id).await
    }

    async fn open_rental(&self, rental: &NewRental) -> DbResult<Rental> {
        self.rentals().open(rental).await
    }

    async fn close_rental(
        &self,
        rental_id: i64,
        product_id: i64,
        ended_at: DateTime<Utc>,
        total: Money,
    ) -> DbResult<Rental> {
        self.rentals()
            .close(rental_id, product_id, ended_at, total)
            .await
    }

    async fn rental_history(&self, limit: u32) -> DbResult<Vec<RentalHistoryEntry>> {
        self.rentals().history(limit).await
    }

    async fn active_rentals(&self) -> DbResult<Vec<RentalHistoryEntry>> {
        self.rentals().active().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbConfig, DbError};
    use rentrack_core::{CustomerDetails, RentalType};

    async fn gateway() -> impl RentalGateway {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_single_row_operations_compose_a_rental() {
        let gw = gateway().await;
        let product = gw
            .add_product(&NewProduct {
                tag_id: TagId::parse("a55a0019833000e200001b6604009417203cbf00").unwrap(),
                name: "Grinder 05".to_string(),
                category: None,
                rental_type: RentalType::PerHour,
                rate: Money::from_cents(5_000),
            })
            .await
            .unwrap();

        let now = Utc::now();
        let rental = gw
            .add_rental(&NewRental::for_product(
                &product,
                CustomerDetails {
                    customer_name: "Meera".to_string(),
                    phone: "080 4123 4567".to_string(),
                    place: "Jayanagar".to_string(),
                    planned_duration: 4,
                    ..Default::default()
                },
                now,
            ))
            .await
            .unwrap();
        gw.update_product_status(product.id, ProductStatus::Rented, now)
            .await
            .unwrap();

        let active = gw
            .fetch_active_rental_for_product(product.id)
            .await
            .unwrap();
        assert_eq!(active.as_ref().map(|r| r.id), Some(rental.id));

        let ended = gw
            .end_rental(rental.id, now, Money::from_cents(1_234))
            .await
            .unwrap();
        assert_eq!(ended.total_cost_cents, Some(1_234));

        // Ending twice finds no open rental
        assert!(matches!(
            gw.end_rental(rental.id, now, Money::zero()).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_tag_is_none() {
        let gw = gateway().await;
        let tag = TagId::parse("a55a0019833000e200001b260c02562050e0f800").unwrap();
        assert!(gw.fetch_product_by_tag(&tag).await.unwrap().is_none());
        assert!(gw.list_products().await.unwrap().is_empty());
        assert!(gw.active_rentals().await.unwrap().is_empty());
    }
}
