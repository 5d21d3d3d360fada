//! # Repositories
//!
//! Row-level access to the catalog and to orders.
//!
//! - [`product`] - Product CRUD
//! - [`category`] - Category CRUD
//! - [`order`] - Order header/item persistence and reads
//!
//! Decimal columns are TEXT; the helpers here parse them back into the core
//! money types and report a corrupt value instead of guessing.

pub mod category;
pub mod order;
pub mod product;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tally_core::{Money, TaxRate};

use crate::error::{DbError, DbResult};

/// Reads a TEXT decimal column as [`Money`].
pub(crate) fn money_column(row: &SqliteRow, column: &str) -> DbResult<Money> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw)
        .map(Money::new)
        .map_err(|_| DbError::corrupt(column, raw))
}

/// Reads a TEXT decimal column as [`TaxRate`].
pub(crate) fn rate_column(row: &SqliteRow, column: &str) -> DbResult<TaxRate> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw)
        .ok()
        .and_then(|fraction| TaxRate::new(fraction).ok())
        .ok_or_else(|| DbError::corrupt(column, raw))
}
