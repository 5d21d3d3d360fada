//! # Order Sequence
//!
//! A single persistent counter holding the last issued order number.
//!
//! ```text
//! order_sequence: (id = 1, last_number = 41)
//!        │
//!        │ UPDATE ... SET last_number = last_number + 1 RETURNING last_number
//!        ▼
//!   42 ──► "ORD0042"
//! ```
//!
//! Must run inside an exclusive unit of work. If that unit of work rolls
//! back, the increment rolls back with it; a committed number is never
//! issued again.

use sqlx::sqlite::SqliteConnection;
use tally_core::order_id::format_order_id;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Increments the counter and returns the new order id.
pub async fn next_order_id(conn: &mut SqliteConnection) -> DbResult<String> {
    let number: Option<i64> = sqlx::query_scalar(
        "UPDATE order_sequence SET last_number = last_number + 1 WHERE id = 1 RETURNING last_number",
    )
    .fetch_optional(&mut *conn)
    .await?;

    let number = number.ok_or_else(|| DbError::Internal("order_sequence row is missing".into()))?;
    let id = format_order_id(number);

    debug!(order_id = %id, "Allocated order id");
    Ok(id)
}

/// The last issued number, without advancing it.
pub async fn last_issued(conn: &mut SqliteConnection) -> DbResult<i64> {
    let number: i64 = sqlx::query_scalar("SELECT last_number FROM order_sequence WHERE id = 1")
        .fetch_one(&mut *conn)
        .await?;

    Ok(number)
}
