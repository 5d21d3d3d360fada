//! # Stock Reconciliation
//!
//! Turns "what the order held before" and "what it should hold now" into the
//! signed per-sku changes the stock ledger has to absorb.
//!
//! ```text
//! old {A:3, B:2}      new {A:5, C:1}
//!          \              /
//!           delta = new − old
//!                 │
//!                 ▼
//!      A:+2  B:−2  C:+1     (positive = more units reserved)
//! ```
//!
//! The ledger applies `−delta`: a positive delta consumes stock, a negative
//! one returns it.

use std::collections::BTreeMap;

use serde::Serialize;

/// Signed change in the quantity an order reserves for one sku.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDelta {
    pub sku: String,
    pub delta: i64,
}

impl StockDelta {
    /// More units are needed from stock.
    #[inline]
    pub fn is_reservation(&self) -> bool {
        self.delta > 0
    }

    /// The signed change to apply to the product's quantity on hand.
    #[inline]
    pub fn ledger_change(&self) -> i64 {
        -self.delta
    }
}

/// Sums quantities per sku. Sorted by sku.
pub fn aggregate_by_sku<'a, I>(lines: I) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut totals = BTreeMap::new();
    for (sku, quantity) in lines {
        *totals.entry(sku.to_string()).or_insert(0) += quantity;
    }
    totals
}

/// `new − old` over the union of skus; zero deltas are omitted.
pub fn reconcile(old: &BTreeMap<String, i64>, new: &BTreeMap<String, i64>) -> Vec<StockDelta> {
    let mut deltas: BTreeMap<&str, i64> = BTreeMap::new();

    for (sku, qty) in new {
        *deltas.entry(sku.as_str()).or_insert(0) += qty;
    }
    for (sku, qty) in old {
        *deltas.entry(sku.as_str()).or_insert(0) -= qty;
    }

    deltas
        .into_iter()
        .filter(|(_, delta)| *delta != 0)
        .map(|(sku, delta)| StockDelta {
            sku: sku.to_string(),
            delta,
        })
        .collect()
}
