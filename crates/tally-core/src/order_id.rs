//! Order identifier format: `ORD` + sequence number, zero-padded to at
//! least four digits (`ORD0001` … `ORD9999`, `ORD10000`, …).

use crate::error::ValidationError;

pub const ORDER_ID_PREFIX: &str = "ORD";
pub const ORDER_ID_MIN_DIGITS: usize = 4;

/// Formats sequence number `n` as an order id. Never truncates.
///
/// ```rust
/// use tally_core::order_id::format_order_id;
///
/// assert_eq!(format_order_id(1), "ORD0001");
/// assert_eq!(format_order_id(12345), "ORD12345");
/// ```
pub fn format_order_id(n: i64) -> String {
    format!("{ORDER_ID_PREFIX}{n:0width$}", width = ORDER_ID_MIN_DIGITS)
}

/// Extracts the sequence number from an order id.
pub fn parse_order_id(id: &str) -> Result<i64, ValidationError> {
    let invalid = || {
        ValidationError::invalid_format("orderId", format!("expected {ORDER_ID_PREFIX}NNNN, got '{id}'"))
    };

    let digits = id.trim().strip_prefix(ORDER_ID_PREFIX).ok_or_else(invalid)?;
    if digits.len() < ORDER_ID_MIN_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits.parse().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_grows_past_four_digits() {
        assert_eq!(format_order_id(7), "ORD0007");
        assert_eq!(format_order_id(9999), "ORD9999");
        assert_eq!(format_order_id(10000), "ORD10000");
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_order_id("ORD0042").unwrap(), 42);
        assert_eq!(parse_order_id("ORD10000").unwrap(), 10000);
        assert!(parse_order_id("ORD42").is_err());
        assert!(parse_order_id("INV0042").is_err());
        assert!(parse_order_id("ORD00a2").is_err());
    }
}
