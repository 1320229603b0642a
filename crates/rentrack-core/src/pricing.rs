//! # Rental Pricing
//!
//! ```text
//! total = rate × elapsed_units, rounded half-up to whole cents
//!
//!   elapsed_units = (ended_at − started_at) / unit
//!   unit          = 1 hour  (Per Hour)
//!                 = 1 day   (Per Day)
//! ```
//!
//! Elapsed time is fractional and clamped at zero: a clock that moved
//! backwards yields a zero charge, never a credit. Integer math in `i128`
//! keeps the product `rate_cents × elapsed_ms` from overflowing.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::RentalType;

/// Milliseconds between two instants, never negative.
fn elapsed_millis(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> i64 {
    (ended_at - started_at).num_milliseconds().max(0)
}

/// Cost of a rental from its frozen rate and billing unit.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use rentrack_core::{money::Money, pricing::rental_cost, RentalType};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
///
/// let total = rental_cost(Money::from_cents(10_000), RentalType::PerDay, start, end);
/// assert_eq!(total.to_string(), "200.00");
/// ```
pub fn rental_cost(
    rate: Money,
    rental_type: RentalType,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
) -> Money {
    let elapsed = elapsed_millis(started_at, ended_at) as i128;
    let unit = rental_type.unit_millis() as i128;
    let rate = rate.cents() as i128;

    // Half-up: (2·r·e + u) / 2u
    let cents = (2 * rate * elapsed + unit) / (2 * unit);

    Money::from_cents(i64::try_from(cents).unwrap_or(i64::MAX))
}

/// Elapsed billing units, for display ("1.50 hours").
pub fn elapsed_units(
    rental_type: RentalType,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
) -> f64 {
    elapsed_millis(started_at, ended_at) as f64 / rental_type.unit_millis() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn jan1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_two_days_at_100_per_day() {
        let end = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let total = rental_cost(Money::from_cents(10_000), RentalType::PerDay, jan1(), end);
        assert_eq!(total.cents(), 20_000);
    }

    #[test]
    fn test_ninety_minutes_at_50_per_hour() {
        let end = jan1() + Duration::minutes(90);
        let total = rental_cost(Money::from_cents(5_000), RentalType::PerHour, jan1(), end);
        assert_eq!(total.cents(), 7_500);
    }

    #[test]
    fn test_negative_elapsed_clamps_to_zero() {
        let end = jan1() - Duration::hours(3);
        let total = rental_cost(Money::from_cents(5_000), RentalType::PerHour, jan1(), end);
        assert_eq!(total, Money::zero());
        assert_eq!(elapsed_units(RentalType::PerHour, jan1(), end), 0.0);
    }

    #[test]
    fn test_rounds_half_up_to_cents() {
        // 1 cent/hour for 30 minutes = 0.5 cent → 1
        let end = jan1() + Duration::minutes(30);
        assert_eq!(
            rental_cost(Money::from_cents(1), RentalType::PerHour, jan1(), end).cents(),
            1
        );

        // 1 cent/hour for 29 minutes = 0.483 cent → 0
        let end = jan1() + Duration::minutes(29);
        assert_eq!(
            rental_cost(Money::from_cents(1), RentalType::PerHour, jan1(), end).cents(),
            0
        );
    }

    #[test]
    fn test_partial_day() {
        // 12 hours at 99.99/day = 49.995 → 50.00
        let end = jan1() + Duration::hours(12);
        let total = rental_cost(Money::from_cents(9_999), RentalType::PerDay, jan1(), end);
        assert_eq!(total.cents(), 5_000);
    }

    #[test]
    fn test_elapsed_units() {
        let end = jan1() + Duration::minutes(90);
        assert!((elapsed_units(RentalType::PerHour, jan1(), end) - 1.5).abs() < 1e-9);
        assert!((elapsed_units(RentalType::PerDay, jan1(), end) - 0.0625).abs() < 1e-9);
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let end = jan1() + Duration::days(3650);
        let total = rental_cost(
            Money::from_cents(1_000_000_000),
            RentalType::PerHour,
            jan1(),
            end,
        );
        assert_eq!(total.cents(), 1_000_000_000 * 24 * 3650);
    }
}
