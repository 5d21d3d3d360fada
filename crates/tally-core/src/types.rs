//! # Domain Types
//!
//! Records shared by the catalog, the stock ledger and the order engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│    Product      │◄──│   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name (PK)      │   │  sku (PK)       │   │  order_id (FK)  │       │
//! │  └─────────────────┘   │  category (FK?) │   │  sku (FK?)      │       │
//! │                        │  quantity ≥ 0   │   │  name snapshot  │       │
//! │                        │  unit_price     │   │  price snapshot │       │
//! │                        └─────────────────┘   └────────┬────────┘       │
//! │                                                       │                 │
//! │                                              ┌────────▼────────┐       │
//! │                                              │     Order       │       │
//! │                                              │  id ORD0001     │       │
//! │                                              │  tax_rate snap  │       │
//! │                                              │  total_cost     │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Weak references (`?`) become NULL when the referenced row is deleted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate};
use crate::pricing::{self, InvoiceFigures, PriceBreakdown};

// =============================================================================
// Catalog
// =============================================================================

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stock Keeping Unit - immutable business key.
    pub sku: String,

    /// Display name, copied onto order items at order time.
    pub name: String,

    /// Category name; `None` when uncategorised or the category was removed.
    pub category: Option<String>,

    /// Quantity on hand. Never negative.
    pub quantity: i64,

    /// Current catalog price. Orders keep their own snapshot.
    pub unit_price: Money,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
}

// =============================================================================
// Orders
// =============================================================================

/// An order header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `ORD` + zero-padded sequence number.
    pub id: String,
    pub customer_name: String,
    pub mobile_number: String,
    pub email_address: Option<String>,
    pub order_date: NaiveDate,
    pub planned_delivery_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub advance_received: Money,
    pub personalization_required: bool,
    pub personalization_details: String,
    /// Subtotal plus tax at full precision.
    pub total_cost: Money,
    /// Rate snapshot taken when the order was created or last edited.
    pub tax_rate: TaxRate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order.
///
/// Uses the snapshot pattern: name and price are frozen at order time, so
/// later catalog edits never change what the customer was quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_id: String,
    /// 1-based position in the intent the order was built from.
    pub line_no: i64,
    /// `None` once the product has been deleted from the catalog.
    pub sku: Option<String>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl OrderItem {
    /// `unit_price × quantity`
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Row of the order listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub customer_name: String,
    pub mobile_number: String,
    pub order_date: NaiveDate,
    pub planned_delivery_date: Option<NaiveDate>,
    pub total_cost: Money,
}

/// An order with its items: the shape the invoice renderer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderDetail {
    /// Recomputes subtotal/tax/total from the stored item snapshots and the
    /// stored tax rate.
    pub fn breakdown(&self) -> PriceBreakdown {
        pricing::price_lines(
            self.items.iter().map(|i| (i.unit_price, i.quantity)),
            self.order.tax_rate,
        )
    }

    /// Figures printed on the invoice, including advance and balance due.
    pub fn invoice(&self) -> InvoiceFigures {
        self.breakdown().invoice(self.order.advance_received)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
