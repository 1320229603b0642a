//! # Product Commands
//!
//! Registration, editing and listing of rental equipment.
//!
//! ## Registration Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Registration view: tag tapped (or typed)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductInput { tag_id, name, rental_type, rate, category }             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TagId::parse · RentalType::from_str · Money::parse · validated()       │
//! │       │            (any failure → ValidationError, nothing written)     │
//! │       ▼                                                                 │
//! │  add_product  ──► DUPLICATE_TAG if the tag is already registered        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductDto (status = Available)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use rentrack_core::{
    CoreError, Money, NewProduct, Product, ProductStatus, ProductUpdate, RentalType, TagId,
};
use rentrack_db::RentalGateway;

/// Product DTO for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub tag_id: String,
    pub name: String,
    pub category: Option<String>,
    pub status: ProductStatus,
    pub rental_type: RentalType,
    pub rate_cents: i64,
    pub last_action_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            tag_id: p.tag_id.into_inner(),
            name: p.name,
            category: p.category,
            status: p.status,
            rental_type: p.rental_type,
            rate_cents: p.rate_cents,
            last_action_at: p.last_action_at,
        }
    }
}

/// Raw form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub tag_id: String,
    pub name: String,
    pub category: Option<String>,
    /// "Per Day" / "Per Hour" (also "day", "hourly", ...)
    pub rental_type: String,
    /// Decimal, e.g. "100" or "12.50"
    pub rate: String,
}

impl ProductInput {
    /// Parses the typed fields. Field rules are checked by `validated()`.
    fn parse(self) -> ApiResult<NewProduct> {
        Ok(NewProduct {
            tag_id: TagId::parse(&self.tag_id)?,
            name: self.name,
            category: self.category,
            rental_type: self.rental_type.parse()?,
            rate: Money::parse(&self.rate)?,
        })
    }

    /// Form prefilled from an existing product.
    pub fn from_product(product: &ProductDto) -> Self {
        ProductInput {
            tag_id: product.tag_id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            rental_type: product.rental_type.to_string(),
            rate: Money::from_cents(product.rate_cents).to_string(),
        }
    }
}

/// Registers a new product as `Available`.
pub async fn register_product<G: RentalGateway>(
    db: &G,
    input: ProductInput,
) -> ApiResult<ProductDto> {
    let new_product = input.parse()?.validated()?;
    debug!(tag = %new_product.tag_id, "register_product command");

    let product = db.add_product(&new_product).await?;
    info!(
        product_id = product.id,
        tag = %product.tag_id,
        name = %product.name,
        "Product registered"
    );

    Ok(product.into())
}

/// Edits name, tag, category and pricing. Status is never touched.
pub async fn update_product<G: RentalGateway>(
    db: &G,
    id: i64,
    input: ProductInput,
) -> ApiResult<ProductDto> {
    let parsed = input.parse()?;
    let update = ProductUpdate {
        tag_id: parsed.tag_id,
        name: parsed.name,
        category: parsed.category,
        rental_type: parsed.rental_type,
        rate: parsed.rate,
    }
    .validated()?;

    let product = db.update_product(id, &update).await?;
    info!(product_id = id, "Product updated");

    Ok(product.into())
}

/// Deletes a product that is not out on rental.
///
/// Products with rental history are refused by the database.
pub async fn delete_product<G: RentalGateway>(db: &G, id: i64) -> ApiResult<()> {
    let product = db
        .fetch_product(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id.to_string()))?;

    if product.is_rented() {
        return Err(CoreError::ProductRented(id).into());
    }

    db.delete_product(id).await?;
    info!(product_id = id, tag = %product.tag_id, "Product deleted");

    Ok(())
}

/// All products, sorted by name.
pub async fn list_products<G: RentalGateway>(db: &G) -> ApiResult<Vec<ProductDto>> {
    let products = db.list_products().await?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

pub async fn get_product<G: RentalGateway>(db: &G, id: i64) -> ApiResult<ProductDto> {
    db.fetch_product(id)
        .await?
        .map(ProductDto::from)
        .ok_or_else(|| ApiError::not_found("Product", &id.to_string()))
}

/// Looks up a product by a typed or scanned tag.
pub async fn get_product_by_tag<G: RentalGateway>(
    db: &G,
    tag: &str,
) -> ApiResult<Option<ProductDto>> {
    let tag = TagId::parse(tag)?;
    Ok(db.fetch_product_by_tag(&tag).await?.map(ProductDto::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rentrack_db::{Database, DbConfig};

    const CUTTER_TAG: &str = "a55a0019833000e200001b260c02562050e0f800";

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn cutter() -> ProductInput {
        ProductInput {
            tag_id: CUTTER_TAG.to_uppercase(),
            name: " Cutter 11 ".to_string(),
            category: Some("Cutters".to_string()),
            rental_type: "per day".to_string(),
            rate: "100".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_product() {
        let db = setup().await;
        let product = register_product(&db, cutter()).await.unwrap();

        assert_eq!(product.tag_id, CUTTER_TAG);
        assert_eq!(product.name, "Cutter 11");
        assert_eq!(product.status, ProductStatus::Available);
        assert_eq!(product.rental_type, RentalType::PerDay);
        assert_eq!(product.rate_cents, 10_000);
    }

    #[tokio::test]
    async fn test_register_duplicate_tag_keeps_original() {
        let db = setup().await;
        register_product(&db, cutter()).await.unwrap();

        let mut second = cutter();
        second.name = "Another".to_string();
        let err = register_product(&db, second).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateTag);

        let products = list_products(&db).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Cutter 11");
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let db = setup().await;

        for input in [
            ProductInput { rate: "12.345".into(), ..cutter() },
            ProductInput { rate: "-1".into(), ..cutter() },
            ProductInput { rental_type: "weekly".into(), ..cutter() },
            ProductInput { tag_id: "e200001b260c".into(), ..cutter() },
            ProductInput { name: "  ".into(), ..cutter() },
        ] {
            let err = register_product(&db, input).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError, "{}", err.message);
        }

        assert!(list_products(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_product() {
        let db = setup().await;
        let product = register_product(&db, cutter()).await.unwrap();

        let mut input = ProductInput::from_product(&product);
        input.rate = "120.50".to_string();
        input.rental_type = "Per Hour".to_string();

        let updated = update_product(&db, product.id, input).await.unwrap();
        assert_eq!(updated.rate_cents, 12_050);
        assert_eq!(updated.rental_type, RentalType::PerHour);
        assert_eq!(updated.status, ProductStatus::Available);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let db = setup().await;
        let product = register_product(&db, cutter()).await.unwrap();

        delete_product(&db, product.id).await.unwrap();
        assert!(get_product_by_tag(&db, CUTTER_TAG).await.unwrap().is_none());

        let err = delete_product(&db, product.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_get_product() {
        let db = setup().await;
        let product = register_product(&db, cutter()).await.unwrap();

        assert_eq!(get_product(&db, product.id).await.unwrap(), product);
        assert_eq!(
            get_product(&db, 999).await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }
}
