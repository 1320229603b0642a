//! # Validation Module
//!
//! Rules for what an operator may type into the registration and rental
//! forms.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Station command parsing (types: numbers, tag format)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (required fields, lengths, ranges)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite (NOT NULL, UNIQUE tag_id, one open rental/product)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed validation never changes state.

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_PLANNED_DURATION;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn require_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::too_long(field, max));
    }

    Ok(())
}

// =============================================================================
// Product Fields
// =============================================================================

/// Validates a product name.
///
/// ```rust
/// use rentrack_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Cutter 11").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    require_text("name", name, 200)
}

/// Rates may be zero (loaner equipment) but never negative.
pub fn validate_rate(rate: Money) -> ValidationResult<()> {
    if rate.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Customer Fields
// =============================================================================

pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    require_text("customer_name", name, 200)
}

pub fn validate_place(place: &str) -> ValidationResult<()> {
    require_text("place", place, 200)
}

/// Validates a phone number.
///
/// ## Rules
/// - Required
/// - Digits plus `+`, `-`, spaces and parentheses
/// - 7 to 15 digits
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    require_text("phone", phone, 25)?;

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
    {
        return Err(ValidationError::invalid(
            "phone",
            "may contain only digits, spaces, +, - and parentheses",
        ));
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digits) {
        return Err(ValidationError::invalid("phone", "must have 7 to 15 digits"));
    }

    Ok(())
}

/// Minimal shape check: one `@` with text on both sides and a dot in the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid || email.contains(char::is_whitespace) {
        return Err(ValidationError::invalid("email", "not an email address"));
    }

    Ok(())
}

/// Validates the planned rental length (days or hours).
///
/// ## Rules
/// - Must be positive
/// - Must not exceed [`MAX_PLANNED_DURATION`]
pub fn validate_planned_duration(duration: i64) -> ValidationResult<()> {
    if duration <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "planned_duration".to_string(),
        });
    }

    if duration > MAX_PLANNED_DURATION {
        return Err(ValidationError::OutOfRange {
            field: "planned_duration".to_string(),
            min: 1,
            max: MAX_PLANNED_DURATION,
        });
    }

    Ok(())
}

// =============================================================================
// Optional Text
// =============================================================================

/// Trims an optional field; blank becomes `None`.
pub fn normalize_optional(
    field: &str,
    value: Option<String>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > max => Err(ValidationError::too_long(field, max)),
        Some(text) => Ok(Some(text.to_string())),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Grinder 05").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(Money::from_cents(0)).is_ok());
        assert!(validate_rate(Money::from_cents(5_000)).is_ok());
        assert!(validate_rate(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9845012345").is_ok());
        assert!(validate_phone("+91 (80) 4123-4567").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ops@rental.in").is_ok());
        assert!(validate_email("ops@localhost").is_err());
        assert!(validate_email("@rental.in").is_err());
        assert!(validate_email("a@b@c.in").is_err());
        assert!(validate_email("a b@c.in").is_err());
    }

    #[test]
    fn test_validate_planned_duration() {
        assert!(validate_planned_duration(1).is_ok());
        assert!(validate_planned_duration(MAX_PLANNED_DURATION).is_ok());
        assert!(validate_planned_duration(0).is_err());
        assert!(validate_planned_duration(-4).is_err());
        assert!(validate_planned_duration(MAX_PLANNED_DURATION + 1).is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional("v", None, 10).unwrap(), None);
        assert_eq!(normalize_optional("v", Some("  ".into()), 10).unwrap(), None);
        assert_eq!(
            normalize_optional("v", Some(" KA01 ".into()), 10).unwrap(),
            Some("KA01".to_string())
        );
        assert!(normalize_optional("v", Some("x".repeat(11)), 10).is_err());
    }
}
