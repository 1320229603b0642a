//! # Domain Types
//!
//! Products, rentals and the inputs that create them.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐  1     0..*  ┌──────────────────────────┐          │
//! │  │    Product      │◄─────────────│        Rental            │          │
//! │  │  ─────────────  │              │  ──────────────────────  │          │
//! │  │  id (integer)   │              │  id, product_id (FK)     │          │
//! │  │  tag_id UNIQUE  │              │  customer contact        │          │
//! │  │  status         │              │  rental_type  (snapshot) │          │
//! │  │  rental_type    │              │  rate_cents   (snapshot) │          │
//! │  │  rate_cents     │              │  started_at / ended_at   │          │
//! │  └─────────────────┘              │  total_cost_cents        │          │
//! │                                   └──────────────────────────┘          │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │ ProductStatus   │   │   RentalType    │                              │
//! │  │  Available      │   │   Per Day       │                              │
//! │  │  Rented         │   │   Per Hour      │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A rental copies the product's `rental_type` and `rate_cents` when it
//! opens. Editing the product afterwards does not reprice rentals that are
//! already running.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::frame::TagId;
use crate::money::Money;
use crate::validation;

// =============================================================================
// Product Status
// =============================================================================

/// Whether a product is on the shelf or out with a customer.
///
/// Changes only when a rental opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum ProductStatus {
    Available,
    Rented,
}

impl ProductStatus {
    /// Stored and displayed form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "Available",
            ProductStatus::Rented => "Rented",
        }
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Available
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Rental Type
// =============================================================================

/// Billing unit of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum RentalType {
    #[serde(rename = "Per Day")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Per Day"))]
    PerDay,

    #[serde(rename = "Per Hour")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Per Hour"))]
    PerHour,
}

impl RentalType {
    pub const ALL: [RentalType; 2] = [RentalType::PerDay, RentalType::PerHour];

    /// Stored and displayed form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RentalType::PerDay => "Per Day",
            RentalType::PerHour => "Per Hour",
        }
    }

    /// Length of one billing unit in milliseconds.
    pub const fn unit_millis(&self) -> i64 {
        match self {
            RentalType::PerDay => 86_400_000,
            RentalType::PerHour => 3_600_000,
        }
    }

    /// Singular unit name for forms ("days", "hours").
    pub const fn unit_label(&self) -> &'static str {
        match self {
            RentalType::PerDay => "days",
            RentalType::PerHour => "hours",
        }
    }
}

impl Default for RentalType {
    fn default() -> Self {
        RentalType::PerDay
    }
}

impl fmt::Display for RentalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the stored form plus the short forms an operator types.
impl FromStr for RentalType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per day" | "day" | "daily" => Ok(RentalType::PerDay),
            "per hour" | "hour" | "hourly" => Ok(RentalType::PerHour),
            _ => Err(ValidationError::NotAllowed {
                field: "rental_type".to_string(),
                allowed: RentalType::ALL.iter().map(|t| t.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A registered, rentable piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Database-assigned identifier.
    pub id: i64,

    /// RFID tag attached to the product. Unique.
    pub tag_id: TagId,

    pub name: String,

    pub category: Option<String>,

    pub status: ProductStatus,

    pub rental_type: RentalType,

    /// Rate per unit of `rental_type`, in cents.
    pub rate_cents: i64,

    /// Last time a rental opened or closed on this product.
    pub last_action_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn rate(&self) -> Money {
        Money::from_cents(self.rate_cents)
    }

    #[inline]
    pub fn is_rented(&self) -> bool {
        self.status == ProductStatus::Rented
    }
}

/// Registration form input.
///
/// Registration never takes a status: new products are always `Available`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub tag_id: TagId,
    pub name: String,
    pub category: Option<String>,
    pub rental_type: RentalType,
    pub rate: Money,
}

impl NewProduct {
    /// Checks every field and normalizes text (trimmed, empty category → None).
    pub fn validated(self) -> Result<Self, ValidationError> {
        validation::validate_product_name(&self.name)?;
        let category = validation::normalize_optional("category", self.category, 100)?;
        validation::validate_rate(self.rate)?;

        Ok(NewProduct {
            tag_id: self.tag_id,
            name: self.name.trim().to_string(),
            category,
            rental_type: self.rental_type,
            rate: self.rate,
        })
    }
}

/// Editable product fields. Status is not one of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub tag_id: TagId,
    pub name: String,
    pub category: Option<String>,
    pub rental_type: RentalType,
    pub rate: Money,
}

impl ProductUpdate {
    pub fn validated(self) -> Result<Self, ValidationError> {
        validation::validate_product_name(&self.name)?;
        let category = validation::normalize_optional("category", self.category, 100)?;
        validation::validate_rate(self.rate)?;

        Ok(ProductUpdate {
            tag_id: self.tag_id,
            name: self.name.trim().to_string(),
            category,
            rental_type: self.rental_type,
            rate: self.rate,
        })
    }
}

// =============================================================================
// Rental
// =============================================================================

/// One rental of one product. Active while `ended_at` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Rental {
    pub id: i64,
    pub product_id: i64,

    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle: Option<String>,
    pub place: String,

    /// Planned length, in units of `rental_type`.
    pub planned_duration: i64,

    /// Billing unit at the time the rental opened (frozen).
    pub rental_type: RentalType,

    /// Rate in cents at the time the rental opened (frozen).
    pub rate_cents: i64,

    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_cost_cents: Option<i64>,
}

impl Rental {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    #[inline]
    pub fn rate(&self) -> Money {
        Money::from_cents(self.rate_cents)
    }

    pub fn total_cost(&self) -> Option<Money> {
        self.total_cost_cents.map(Money::from_cents)
    }
}

/// Customer details captured when a rental starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle: Option<String>,
    pub place: String,
    pub planned_duration: i64,
}

impl CustomerDetails {
    /// Checks every field and normalizes text.
    ///
    /// ## Example
    /// ```rust
    /// use rentrack_core::CustomerDetails;
    ///
    /// let details = CustomerDetails {
    ///     customer_name: " Ravi Kumar ".into(),
    ///     phone: "+91 98450 12345".into(),
    ///     email: Some("".into()),
    ///     vehicle: None,
    ///     place: "Whitefield".into(),
    ///     planned_duration: 2,
    /// }
    /// .validated()
    /// .unwrap();
    ///
    /// assert_eq!(details.customer_name, "Ravi Kumar");
    /// assert_eq!(details.email, None);
    /// ```
    pub fn validated(self) -> Result<Self, ValidationError> {
        validation::validate_customer_name(&self.customer_name)?;
        validation::validate_phone(&self.phone)?;
        validation::validate_place(&self.place)?;
        validation::validate_planned_duration(self.planned_duration)?;

        let email = validation::normalize_optional("email", self.email, 200)?;
        if let Some(email) = &email {
            validation::validate_email(email)?;
        }
        let vehicle = validation::normalize_optional("vehicle", self.vehicle, 50)?;

        Ok(CustomerDetails {
            customer_name: self.customer_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email,
            vehicle,
            place: self.place.trim().to_string(),
            planned_duration: self.planned_duration,
        })
    }
}

/// Everything needed to insert a rental row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRental {
    pub product_id: i64,
    pub customer: CustomerDetails,
    pub rental_type: RentalType,
    pub rate_cents: i64,
    pub started_at: DateTime<Utc>,
}

impl NewRental {
    /// Builds the row for `product`, snapshotting its pricing.
    pub fn for_product(product: &Product, customer: CustomerDetails, now: DateTime<Utc>) -> Self {
        NewRental {
            product_id: product.id,
            customer,
            rental_type: product.rental_type,
            rate_cents: product.rate_cents,
            started_at: now,
        }
    }
}

/// A rental joined with the product it belongs to, for history screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RentalHistoryEntry {
    pub rental_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub tag_id: TagId,
    pub customer_name: String,
    pub phone: String,
    pub rental_type: RentalType,
    pub rate_cents: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_cost_cents: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tag() -> TagId {
        TagId::parse("a55a0019833000e200001b260c02562050e0f800").unwrap()
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&RentalType::PerDay).unwrap(),
            "\"Per Day\""
        );
        assert_eq!(
            serde_json::to_string(&ProductStatus::Rented).unwrap(),
            "\"Rented\""
        );
        let parsed: RentalType = serde_json::from_str("\"Per Hour\"").unwrap();
        assert_eq!(parsed, RentalType::PerHour);
    }

    #[test]
    fn test_rental_type_from_str() {
        assert_eq!("Per Day".parse::<RentalType>().unwrap(), RentalType::PerDay);
        assert_eq!("hour".parse::<RentalType>().unwrap(), RentalType::PerHour);
        assert!("weekly".parse::<RentalType>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ProductStatus::default(), ProductStatus::Available);
        assert_eq!(RentalType::default(), RentalType::PerDay);
    }

    #[test]
    fn test_new_product_validation_normalizes() {
        let product = NewProduct {
            tag_id: tag(),
            name: "  Cutter 11 ".to_string(),
            category: Some("   ".to_string()),
            rental_type: RentalType::PerDay,
            rate: Money::from_cents(10_000),
        }
        .validated()
        .unwrap();

        assert_eq!(product.name, "Cutter 11");
        assert_eq!(product.category, None);
    }

    #[test]
    fn test_new_product_rejects_empty_name() {
        let result = NewProduct {
            tag_id: tag(),
            name: " ".to_string(),
            category: None,
            rental_type: RentalType::PerHour,
            rate: Money::from_cents(500),
        }
        .validated();

        assert!(matches!(result, Err(ValidationError::Required { .. })));
    }

    #[test]
    fn test_customer_details_validation() {
        let base = CustomerDetails {
            customer_name: "Anita".to_string(),
            phone: "9845012345".to_string(),
            email: Some("anita@example.com".to_string()),
            vehicle: Some("KA01AB1234".to_string()),
            place: "Indiranagar".to_string(),
            planned_duration: 3,
        };
        assert!(base.clone().validated().is_ok());

        let no_phone = CustomerDetails {
            phone: "".to_string(),
            ..base.clone()
        };
        assert!(no_phone.validated().is_err());

        let zero_duration = CustomerDetails {
            planned_duration: 0,
            ..base.clone()
        };
        assert!(zero_duration.validated().is_err());

        let bad_email = CustomerDetails {
            email: Some("not-an-email".to_string()),
            ..base
        };
        assert!(bad_email.validated().is_err());
    }
}
