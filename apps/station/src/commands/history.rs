//! # History Commands
//!
//! Read-only views over rentals: recent history and what is out right now.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiResult;
use rentrack_core::pricing::rental_cost;
use rentrack_core::{Money, RentalHistoryEntry, RentalType};
use rentrack_db::RentalGateway;

/// Upper bound on rows per history request.
pub const MAX_HISTORY_LIMIT: u32 = 500;

/// One row of the history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryDto {
    pub rental_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub tag_id: String,
    pub customer_name: String,
    pub phone: String,
    pub rental_type: RentalType,
    pub rate_cents: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Final cost once returned; the amount accrued so far while out.
    pub cost_cents: i64,
    pub active: bool,
}

impl HistoryEntryDto {
    fn from_entry(e: RentalHistoryEntry, now: DateTime<Utc>) -> Self {
        let cost_cents = match e.total_cost_cents {
            Some(total) => total,
            None => rental_cost(
                Money::from_cents(e.rate_cents),
                e.rental_type,
                e.started_at,
                e.ended_at.unwrap_or(now),
            )
            .cents(),
        };

        HistoryEntryDto {
            rental_id: e.rental_id,
            product_id: e.product_id,
            product_name: e.product_name,
            tag_id: e.tag_id.into_inner(),
            customer_name: e.customer_name,
            phone: e.phone,
            rental_type: e.rental_type,
            rate_cents: e.rate_cents,
            started_at: e.started_at,
            active: e.ended_at.is_none(),
            ended_at: e.ended_at,
            cost_cents,
        }
    }
}

/// Most recent rentals first. `limit` is clamped to 1..=500.
pub async fn rental_history<G: RentalGateway>(
    db: &G,
    limit: u32,
    now: DateTime<Utc>,
) -> ApiResult<Vec<HistoryEntryDto>> {
    let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
    debug!(limit, "rental_history command");

    let entries = db.rental_history(limit).await?;
    Ok(entries
        .into_iter()
        .map(|e| HistoryEntryDto::from_entry(e, now))
        .collect())
}

/// Rentals currently out, with cost accrued up to `now`.
pub async fn active_rentals<G: RentalGateway>(
    db: &G,
    now: DateTime<Utc>,
) -> ApiResult<Vec<HistoryEntryDto>> {
    let entries = db.active_rentals().await?;
    Ok(entries
        .into_iter()
        .map(|e| HistoryEntryDto::from_entry(e, now))
        .collect())
}
