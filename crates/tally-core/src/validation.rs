//! # Validation Module
//!
//! Field validators shared by order intents and catalog records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Boundary (CLI / HTTP collaborator)                           │
//! │  ├── serde: JSON shape                                                 │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Order engine                                                  │
//! │  └── Stock availability, unknown skus                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (quantity >= 0) constraints                      │
//! │  ├── PRIMARY KEY uniqueness                                            │
//! │  └── Foreign keys (CASCADE / SET NULL)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::{Money, MAX_AMOUNT};
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_sku;
///
/// assert!(validate_sku("HELMET-M").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "sku",
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

/// Validates a required free-text field and returns it trimmed.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Trims an optional text field; blank becomes `None`.
pub fn normalize_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => validate_required_text(field, v, max).map(Some),
    }
}

/// Validates a product or category name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    validate_required_text(field, name, 200)
}

/// Validates a mobile number: digits with optional `+`, spaces or hyphens,
/// 7 to 15 digits in total.
///
/// ```rust
/// use tally_core::validation::validate_mobile_number;
///
/// assert!(validate_mobile_number("+91 98765-43210").is_ok());
/// assert!(validate_mobile_number("12ab").is_err());
/// ```
pub fn validate_mobile_number(raw: &str) -> ValidationResult<String> {
    let value = validate_required_text("mobileNumber", raw, 20)?;

    let allowed = value
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (c == '+' && i == 0));
    let digits = value.chars().filter(char::is_ascii_digit).count();

    if !allowed || !(7..=15).contains(&digits) {
        return Err(ValidationError::invalid_format(
            "mobileNumber",
            "expected 7-15 digits, optionally with a leading +",
        ));
    }

    Ok(value)
}

/// Validates an optional e-mail address (shape only).
pub fn validate_email(raw: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(value) = normalize_optional_text("emailAddress", raw, 254)? else {
        return Ok(None);
    };

    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(Some(value)),
        _ => Err(ValidationError::invalid_format(
            "emailAddress",
            "expected name@domain",
        )),
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::required(field));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid_format(field, "expected YYYY-MM-DD"))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line or stock quantity.
///
/// ## Rules
/// - Must not be negative (zero is accepted; callers decide what it means)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: MAX_LINE_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Validates a price or advance amount: zero up to [`MAX_AMOUNT`].
///
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::validation::validate_amount;
///
/// assert!(validate_amount("price", Money::parse("0").unwrap()).is_ok());
/// assert!(validate_amount("price", Money::parse("-1").unwrap()).is_err());
/// assert!(validate_amount("price", Money::parse("10000000000000").unwrap()).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: MAX_AMOUNT.amount().to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SKU1").is_ok());
        assert!(validate_sku("bell_01").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_required_and_optional_text() {
        assert_eq!(validate_required_text("name", "  Asha ", 10).unwrap(), "Asha");
        assert!(validate_required_text("name", "   ", 10).is_err());
        assert!(validate_required_text("name", "abcdefghijk", 10).is_err());

        assert_eq!(normalize_optional_text("pm", Some("  "), 10).unwrap(), None);
        assert_eq!(normalize_optional_text("pm", None, 10).unwrap(), None);
        assert_eq!(
            normalize_optional_text("pm", Some(" UPI "), 10).unwrap(),
            Some("UPI".to_string())
        );
    }

    #[test]
    fn test_validate_mobile_number() {
        assert!(validate_mobile_number("9876543210").is_ok());
        assert!(validate_mobile_number("+91 98765 43210").is_ok());
        assert!(validate_mobile_number("").is_err());
        assert!(validate_mobile_number("12345").is_err());
        assert!(validate_mobile_number("98765+43210").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(None).unwrap(), None);
        assert_eq!(validate_email(Some("")).unwrap(), None);
        assert!(validate_email(Some("a@b.in")).unwrap().is_some());
        assert!(validate_email(Some("not-an-email")).is_err());
        assert!(validate_email(Some("@b.in")).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("orderDate", "2025-09-05").unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 5).unwrap()
        );
        assert!(parse_date("orderDate", "05/09/2025").is_err());
        assert!(matches!(
            parse_date("orderDate", ""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 0).is_ok());
        assert!(validate_quantity("quantity", 9_999).is_ok());
        assert!(validate_quantity("quantity", -1).is_err());
        assert!(validate_quantity("quantity", 10_000).is_err());
    }

    #[test]
    fn test_validate_amount_bounds() {
        let amount = |raw: &str| Money::parse(raw).unwrap();

        assert!(validate_amount("price", amount("0")).is_ok());
        assert!(validate_amount("price", amount("1000000000000")).is_ok());
        assert!(validate_amount("price", amount("-0.01")).is_err());
        assert!(matches!(
            validate_amount("price", amount("1000000000000.01")),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_amount("price", amount("79228162514264337593543950335")).is_err());
    }
}
