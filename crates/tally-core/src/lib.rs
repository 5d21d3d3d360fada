//! # tally-core: Pure Business Logic for Tally
//!
//! Everything the order engine decides without touching the database lives
//! here: money and tax-rate types, the pricing calculator, order intent
//! validation, order identifier formatting and stock delta reconciliation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Operator CLI / HTTP collaborator                │   │
//! │  │   JSON payload ──► OrderIntent::from_json ──► engine call       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌───────────────────┐ │   │
//! │  │   │  types   │ │  money   │ │ pricing  │ │ intent/reconcile  │ │   │
//! │  │   │ Product  │ │  Money   │ │ Breakdown│ │ OrderIntent       │ │   │
//! │  │   │ Order    │ │ TaxRate  │ │ Invoice  │ │ StockDelta        │ │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └───────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          tally-db (Stock Ledger, Sequence, Order Engine)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Category, Order, OrderItem)
//! - [`money`] - `Money` and `TaxRate` over `rust_decimal::Decimal`
//! - [`pricing`] - Subtotal / tax / total / balance-due calculator
//! - [`intent`] - Validated order intents built from loose payloads
//! - [`reconcile`] - Per-sku aggregation and edit deltas
//! - [`order_id`] - `ORD0001`-style identifier formatting
//! - [`validation`] - Field validators shared by intents and the catalog
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::money::{Money, TaxRate};
//! use tally_core::pricing::price_lines;
//!
//! let lines = [(Money::new(Decimal::new(10000, 2)), 4)];
//! let rate = TaxRate::new(Decimal::new(5, 2)).unwrap(); // 5%
//!
//! let breakdown = price_lines(lines, rate);
//! assert_eq!(breakdown.total.to_string(), "420.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod intent;
pub mod money;
pub mod order_id;
pub mod pricing;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use intent::{LineItem, OrderIntent, OrderIntentPayload};
pub use money::{Money, TaxRate, DEFAULT_TAX_RATE, MAX_AMOUNT};
pub use pricing::{InvoiceFigures, PriceBreakdown};
pub use reconcile::StockDelta;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines accepted in a single order intent.
pub const MAX_ORDER_LINES: usize = 200;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches fat-finger entries (10000 instead of 10) before they reach the
/// stock ledger.
pub const MAX_LINE_QUANTITY: i64 = 9_999;
