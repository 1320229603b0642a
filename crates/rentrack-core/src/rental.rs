//! # Rental State Resolver
//!
//! Decides what a detection of a registered product means.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │        detect + confirm (customer details)                              │
//! │   ┌───────────┐ ──────────────────────────────────► ┌───────────┐       │
//! │   │ Available │        open rental, stamp start     │  Rented   │       │
//! │   │           │ ◄────────────────────────────────── │           │       │
//! │   └───────────┘        detect + confirm             └───────────┘       │
//! │                        close rental, stamp end,                         │
//! │                        total = rate × elapsed                           │
//! │                                                                         │
//! │   Rented + no open rental     ─┐                                        │
//! │   Available + an open rental  ─┴─► InconsistentRentalState (abort)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`resolve`] is pure. Callers fetch the product and its open rental, call
//! it, and apply the resulting [`Transition`] atomically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing;
use crate::types::{Product, ProductStatus, Rental};

/// What should happen to a product on this detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// Open a new rental; product becomes `Rented`.
    Start { product_id: i64 },

    /// Close the open rental; product becomes `Available`.
    End {
        rental_id: i64,
        product_id: i64,
        ended_at: DateTime<Utc>,
        total: Money,
    },
}

impl Transition {
    /// Short name used in logs and state-changed errors.
    pub fn label(&self) -> &'static str {
        match self {
            Transition::Start { .. } => "start",
            Transition::End { .. } => "end",
        }
    }

    pub fn product_id(&self) -> i64 {
        match self {
            Transition::Start { product_id } | Transition::End { product_id, .. } => *product_id,
        }
    }
}

/// Resolves the transition for `product` given its open rental, if any.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use rentrack_core::{resolve, Product, ProductStatus, RentalType, TagId, Transition};
///
/// let product = Product {
///     id: 1,
///     tag_id: TagId::parse("a55a0019833000e200001b260c02562050e0f800").unwrap(),
///     name: "Cutter 11".into(),
///     category: Some("Cutters".into()),
///     status: ProductStatus::Available,
///     rental_type: RentalType::PerDay,
///     rate_cents: 10_000,
///     last_action_at: None,
///     created_at: Utc::now(),
/// };
///
/// let transition = resolve(&product, None, Utc::now()).unwrap();
/// assert_eq!(transition, Transition::Start { product_id: 1 });
/// ```
pub fn resolve(
    product: &Product,
    active_rental: Option<&Rental>,
    now: DateTime<Utc>,
) -> CoreResult<Transition> {
    if let Some(rental) = active_rental {
        if rental.product_id != product.id || !rental.is_active() {
            return Err(inconsistent(
                product,
                format!("rental {} is not an open rental of this product", rental.id),
            ));
        }
    }

    match (product.status, active_rental) {
        (ProductStatus::Available, None) => Ok(Transition::Start {
            product_id: product.id,
        }),

        (ProductStatus::Rented, Some(rental)) => {
            let total = pricing::rental_cost(rental.rate(), rental.rental_type, rental.started_at, now);
            Ok(Transition::End {
                rental_id: rental.id,
                product_id: product.id,
                ended_at: now,
                total,
            })
        }

        (ProductStatus::Rented, None) => Err(inconsistent(
            product,
            "status is Rented but no open rental exists".to_string(),
        )),

        (ProductStatus::Available, Some(rental)) => Err(inconsistent(
            product,
            format!("status is Available but rental {} is still open", rental.id),
        )),
    }
}

fn inconsistent(product: &Product, reason: String) -> CoreError {
    CoreError::InconsistentRentalState {
        product_id: product.id,
        reason,
    }
}
