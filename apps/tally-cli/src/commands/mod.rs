//! Subcommand implementations.
//!
//! Each module owns its clap `Args` and an `execute` function returning the
//! JSON document the binary prints.

pub mod category;
pub mod invoice;
pub mod order;
pub mod product;
pub mod stock;

use serde::Serialize;
use serde_json::Value;
use tally_core::order_id::parse_order_id;
use tally_core::Money;

use crate::error::{CliError, ErrorCode};

/// Serializes a command result.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!("Failed to serialize output: {}", e);
        CliError::new(ErrorCode::Internal, "Failed to render output")
    })
}

/// clap value parser for prices.
pub(crate) fn parse_money(raw: &str) -> Result<Money, String> {
    Money::parse(raw).map_err(|e| e.to_string())
}

/// Rejects anything that is not an `ORDNNNN` id before it reaches the store.
pub(crate) fn checked_order_id(raw: &str) -> Result<&str, CliError> {
    parse_order_id(raw)?;
    Ok(raw)
}
