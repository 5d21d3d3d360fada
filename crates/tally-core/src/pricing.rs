//! # Pricing Calculator
//!
//! Pure functions from order lines and a tax rate to order totals.
//!
//! ```text
//! subtotal   = Σ unit_price_i × quantity_i
//! tax_amount = subtotal × tax_rate
//! total      = subtotal + tax_amount
//! balance    = max(total − advance_received, 0)
//! ```
//!
//! No rounding happens here. The figures are exact and are persisted as
//! such; `Money`'s `Display` rounds to two places when they are printed.

use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate};

/// Result of pricing a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// `max(total − advance, 0)`
    pub fn balance_due(&self, advance_received: Money) -> Money {
        (self.total - advance_received).floor_at_zero()
    }

    /// Extends the breakdown with the advance already paid.
    pub fn invoice(&self, advance_received: Money) -> InvoiceFigures {
        InvoiceFigures {
            subtotal: self.subtotal,
            tax_rate: self.tax_rate,
            tax_amount: self.tax_amount,
            total: self.total,
            advance_received,
            balance_due: self.balance_due(advance_received),
        }
    }
}

/// Every figure an invoice prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFigures {
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub total: Money,
    pub advance_received: Money,
    pub balance_due: Money,
}

/// Prices `(unit_price, quantity)` lines under `tax_rate`.
///
/// ## Example
/// ```rust
/// use tally_core::money::{Money, TaxRate};
/// use tally_core::pricing::price_lines;
///
/// let lines = [(Money::parse("100.00").unwrap(), 4)];
/// let b = price_lines(lines, TaxRate::parse("0.05").unwrap());
///
/// assert_eq!(b.subtotal.to_string(), "400.00");
/// assert_eq!(b.tax_amount.to_string(), "20.00");
/// assert_eq!(b.total.to_string(), "420.00");
/// ```
pub fn price_lines<I>(lines: I, tax_rate: TaxRate) -> PriceBreakdown
where
    I: IntoIterator<Item = (Money, i64)>,
{
    let subtotal: Money = lines
        .into_iter()
        .map(|(unit_price, quantity)| unit_price * quantity)
        .sum();
    let tax_amount = subtotal.apply_rate(tax_rate);

    PriceBreakdown {
        subtotal,
        tax_rate,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
