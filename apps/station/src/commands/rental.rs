//! # Rental Commands
//!
//! Turns a tag detection into a proposed transition, and carries out the
//! transition once the operator confirms it.
//!
//! ## Detect → Confirm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  detect(tag)                         (read-only)                        │
//! │     │                                                                   │
//! │     ├── no product ───────────────► Detection::Unregistered             │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  resolve(product, open rental, now)                                     │
//! │     │                                                                   │
//! │     ├── Start ────────────────────► Detection::StartProposal            │
//! │     ├── End ──────────────────────► Detection::EndProposal (+ preview)  │
//! │     └── inconsistent ─────────────► RENTAL_STATE error                  │
//! │                                                                         │
//! │  operator fills customer form / confirms return                         │
//! │                                                                         │
//! │  confirm_start(tag, customer)        confirm_end(tag)                   │
//! │     │  re-resolve at confirm time       │  re-resolve at confirm time   │
//! │     │  must still be Start              │  must still be End            │
//! │     ▼                                   ▼                               │
//! │  open_rental (1 tx):                 close_rental (1 tx):               │
//! │    INSERT rental                       stamp ended_at, total_cost       │
//! │    product → Rented                    product → Available              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cost charged on return is computed at confirmation, not at detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::product::ProductDto;
use crate::error::ApiResult;
use rentrack_core::pricing::elapsed_units;
use rentrack_core::{
    resolve, CoreError, CustomerDetails, NewRental, Product, ProductStatus, Rental, RentalType,
    TagId, Transition,
};
use rentrack_db::RentalGateway;

/// Rental DTO for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalDto {
    pub id: i64,
    pub product_id: i64,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub vehicle: Option<String>,
    pub place: String,
    pub planned_duration: i64,
    pub rental_type: RentalType,
    pub rate_cents: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_cost_cents: Option<i64>,
}

impl From<Rental> for RentalDto {
    fn from(r: Rental) -> Self {
        RentalDto {
            id: r.id,
            product_id: r.product_id,
            customer_name: r.customer_name,
            phone: r.phone,
            email: r.email,
            vehicle: r.vehicle,
            place: r.place,
            planned_duration: r.planned_duration,
            rental_type: r.rental_type,
            rate_cents: r.rate_cents,
            started_at: r.started_at,
            ended_at: r.ended_at,
            total_cost_cents: r.total_cost_cents,
        }
    }
}

/// Outcome of a tag detection in the rental view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Detection {
    /// No product carries this tag. The tag can prefill registration.
    Unregistered { tag_id: String },

    /// Product is available: ask for customer details.
    StartProposal { product: ProductDto },

    /// Product is out: show the running cost and ask to confirm the return.
    EndProposal {
        product: ProductDto,
        rental: RentalDto,
        elapsed_units: f64,
        total_cents: i64,
    },
}

impl Detection {
    pub fn tag_id(&self) -> &str {
        match self {
            Detection::Unregistered { tag_id } => tag_id,
            Detection::StartProposal { product } | Detection::EndProposal { product, .. } => {
                &product.tag_id
            }
        }
    }
}

/// Proposes a transition for a detected tag. Writes nothing.
pub async fn detect<G: RentalGateway>(
    db: &G,
    tag: &TagId,
    now: DateTime<Utc>,
) -> ApiResult<Detection> {
    let Some(product) = db.fetch_product_by_tag(tag).await? else {
        info!(tag = %tag, "Unregistered tag detected");
        return Ok(Detection::Unregistered {
            tag_id: tag.to_string(),
        });
    };

    let rental = db.fetch_active_rental_for_product(product.id).await?;
    let transition = resolve(&product, rental.as_ref(), now)?;
    debug!(
        product_id = product.id,
        transition = transition.label(),
        "Detection resolved"
    );

    let detection = match (transition, rental) {
        (Transition::Start { .. }, _) => Detection::StartProposal {
            product: product.into(),
        },
        (Transition::End { total, .. }, Some(rental)) => Detection::EndProposal {
            elapsed_units: elapsed_units(rental.rental_type, rental.started_at, now),
            total_cents: total.cents(),
            product: product.into(),
            rental: rental.into(),
        },
        // resolve only yields End with an open rental
        (Transition::End { .. }, None) => {
            return Err(CoreError::InconsistentRentalState {
                product_id: product.id,
                reason: "no open rental".to_string(),
            }
            .into())
        }
    };

    Ok(detection)
}

/// Opens a rental for `tag`. The product must still be available.
pub async fn confirm_start<G: RentalGateway>(
    db: &G,
    tag: &TagId,
    customer: CustomerDetails,
    now: DateTime<Utc>,
) -> ApiResult<RentalDto> {
    let customer = customer.validated()?;
    let (product, transition) = resolve_for(db, tag, now).await?;

    let Transition::Start { .. } = transition else {
        return Err(state_changed(&product, ProductStatus::Available));
    };

    let rental = db
        .open_rental(&NewRental::for_product(&product, customer, now))
        .await?;

    info!(
        rental_id = rental.id,
        product_id = product.id,
        tag = %tag,
        customer = %rental.customer_name,
        "Rental started"
    );

    Ok(rental.into())
}

/// Closes the open rental for `tag`, charging up to `now`.
pub async fn confirm_end<G: RentalGateway>(
    db: &G,
    tag: &TagId,
    now: DateTime<Utc>,
) -> ApiResult<RentalDto> {
    let (product, transition) = resolve_for(db, tag, now).await?;

    let Transition::End {
        rental_id,
        product_id,
        ended_at,
        total,
    } = transition
    else {
        return Err(state_changed(&product, ProductStatus::Rented));
    };

    let rental = db
        .close_rental(rental_id, product_id, ended_at, total)
        .await?;

    info!(
        rental_id,
        product_id,
        tag = %tag,
        total = %total,
        "Rental ended"
    );

    Ok(rental.into())
}

async fn resolve_for<G: RentalGateway>(
    db: &G,
    tag: &TagId,
    now: DateTime<Utc>,
) -> ApiResult<(Product, Transition)> {
    let product = db
        .fetch_product_by_tag(tag)
        .await?
        .ok_or_else(|| CoreError::UnregisteredTag(tag.to_string()))?;

    let rental = db.fetch_active_rental_for_product(product.id).await?;
    let transition = resolve(&product, rental.as_ref(), now)?;

    Ok((product, transition))
}

fn state_changed(product: &Product, expected: ProductStatus) -> crate::error::ApiError {
    CoreError::StateChanged {
        product_id: product.id,
        expected: expected.to_string(),
        actual: product.status.to_string(),
    }
    .into()
}
