//! # Money Module
//!
//! Provides the `Money` and `TaxRate` types for handling monetary values.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    Base-10 arithmetic at full precision. 2-decimal rounding happens    │
//! │    ONLY when a value is rendered, never when it is stored.             │
//! │                                                                         │
//! │    stored  total_cost = 420.0000                                        │
//! │    printed total_cost = 420.00                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::money::{Money, TaxRate};
//!
//! let price = Money::new(Decimal::new(1999, 2)); // 19.99
//! let line = price * 3;                          // 59.97
//! let tax = line.apply_rate(TaxRate::new(Decimal::new(5, 2)).unwrap());
//!
//! assert_eq!(line.to_string(), "59.97");
//! assert_eq!(tax.amount(), Decimal::new(29985, 4)); // 2.9985, unrounded
//! assert_eq!(tax.to_string(), "3.00");
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

use crate::error::ValidationError;

/// Display precision for monetary values.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// 5%, the rate new orders get when neither the caller nor the
/// configuration names one.
pub const DEFAULT_TAX_RATE: TaxRate = TaxRate(Decimal::from_parts(5, 0, 0, false, 2));

/// Largest price or advance accepted: 1 000 000 000 000.
///
/// 200 lines of 9 999 units at this price, taxed at 100%, still fit in a
/// `Decimal`, so pricing a validated intent never overflows.
pub const MAX_AMOUNT: Money = Money(Decimal::from_parts(3_567_587_328, 232, 0, false, 0));

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount at full decimal precision.
///
/// ## Where Money is Used
/// ```text
/// Product.unit_price ──► LineItem.unit_price (snapshot) ──► line total
///                                                               │
/// Σ line totals = subtotal ──► × TaxRate = tax ──► total ──► Order.total_cost
///                                                               │
///                                   total − advance_received = balance due
/// ```
///
/// Serialized as a decimal string (`"420.0000"`); deserializes from either a
/// string or a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Parses a decimal string such as `"100.00"`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Decimal::from_str(raw.trim())
            .map(Money)
            .map_err(|e| ValidationError::invalid_format("amount", e.to_string()))
    }

    /// The exact, unrounded amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// `self × rate`, unrounded.
    pub fn apply_rate(&self, rate: TaxRate) -> Money {
        Money(self.0 * rate.fraction())
    }

    /// Clamps negative amounts to zero.
    pub fn floor_at_zero(&self) -> Money {
        Money(self.0.max(Decimal::ZERO))
    }

    /// Rounded copy for presentation (half away from zero, 2 places).
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Canonical storage form: the full-precision decimal string.
    pub fn to_storage(&self) -> String {
        self.0.to_string()
    }
}

/// Renders the amount with exactly two decimals. Display only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded().0;
        write!(f, "{:.2}", rounded)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Multiplication by a line quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate as a decimal fraction: `0.05` is 5%.
///
/// Snapshotted onto every order; later changes to the configured default
/// never reach existing orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Creates a tax rate, rejecting anything outside `0..=1`.
    pub fn new(fraction: Decimal) -> Result<Self, ValidationError> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(ValidationError::OutOfRange {
                field: "taxRate".to_string(),
                min: "0".to_string(),
                max: "1".to_string(),
            });
        }
        Ok(TaxRate(fraction))
    }

    /// Parses a fraction string such as `"0.05"`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let fraction = Decimal::from_str(raw.trim())
            .map_err(|e| ValidationError::invalid_format("taxRate", e.to_string()))?;
        TaxRate::new(fraction)
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    #[inline]
    pub const fn fraction(&self) -> Decimal {
        self.0
    }

    /// Rate in percent (`0.05` → `5`), for display.
    pub fn percentage(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }

    pub fn to_storage(&self) -> String {
        self.0.to_string()
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        TaxRate::new(value)
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

/// `5.00%`
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self
            .percentage()
            .round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{:.2}%", pct)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
