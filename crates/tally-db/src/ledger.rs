//! # Stock Ledger
//!
//! The authoritative quantity on hand per product, and the only code that
//! changes it.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  check_available(sku, qty)   → Available | Insufficient{available}     │
//! │                                 | NotFound                             │
//! │                                                                         │
//! │  apply_delta(sku, ±n)        → Applied{new_quantity} | NotFound        │
//! │                                 | WouldGoNegative{available}           │
//! │                                                                         │
//! │  UPDATE products SET quantity = quantity + ?                           │
//! │  WHERE sku = ? AND quantity + ? >= 0        ← never below zero         │
//! │  RETURNING quantity                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The connection-level functions are meant to be called inside
//! [`Database::exclusive`](crate::Database::exclusive) so a check and the
//! delta that follows it see the same quantity. [`StockLedger`] wraps them
//! for one-off operator adjustments.

use sqlx::sqlite::SqliteConnection;
use tally_core::CoreError;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::Database;

/// Result of [`check_available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockCheck {
    Available,
    Insufficient { available: i64 },
    NotFound,
}

/// Result of [`apply_delta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockOutcome {
    Applied { new_quantity: i64 },
    NotFound,
    /// Nothing was changed.
    WouldGoNegative { available: i64 },
}

/// Current quantity on hand, `None` for an unknown sku.
pub async fn quantity_on_hand(conn: &mut SqliteConnection, sku: &str) -> DbResult<Option<i64>> {
    let quantity: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE sku = ?1")
        .bind(sku)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(quantity)
}

/// Can `quantity` units of `sku` be taken from stock right now?
pub async fn check_available(
    conn: &mut SqliteConnection,
    sku: &str,
    quantity: i64,
) -> DbResult<StockCheck> {
    let check = match quantity_on_hand(conn, sku).await? {
        None => StockCheck::NotFound,
        Some(available) if available >= quantity => StockCheck::Available,
        Some(available) => StockCheck::Insufficient { available },
    };

    debug!(sku = %sku, quantity, ?check, "Checked stock");
    Ok(check)
}

/// Like [`check_available`], but turns anything other than `Available` into
/// the domain error that aborts the unit of work.
pub async fn require_available(
    conn: &mut SqliteConnection,
    sku: &str,
    quantity: i64,
) -> DbResult<()> {
    match check_available(conn, sku, quantity).await? {
        StockCheck::Available => Ok(()),
        StockCheck::NotFound => Err(CoreError::UnknownSku(sku.to_string()).into()),
        StockCheck::Insufficient { available } => Err(CoreError::InsufficientStock {
            sku: sku.to_string(),
            available,
            requested: quantity,
        }
        .into()),
    }
}

/// Adds `delta` (negative to consume, positive to restock) to the quantity
/// on hand. A delta that would leave the quantity below zero changes
/// nothing.
pub async fn apply_delta(
    conn: &mut SqliteConnection,
    sku: &str,
    delta: i64,
) -> DbResult<StockOutcome> {
    let new_quantity: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET quantity = quantity + ?2
        WHERE sku = ?1 AND quantity + ?2 >= 0
        RETURNING quantity
        "#,
    )
    .bind(sku)
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await?;

    let outcome = match new_quantity {
        Some(new_quantity) => StockOutcome::Applied { new_quantity },
        // No row updated: tell a missing product from a short one.
        None => match quantity_on_hand(conn, sku).await? {
            None => StockOutcome::NotFound,
            Some(available) => StockOutcome::WouldGoNegative { available },
        },
    };

    debug!(sku = %sku, delta, ?outcome, "Applied stock delta");
    Ok(outcome)
}

// =============================================================================
// Pool-level ledger
// =============================================================================

/// Operator-facing access to the ledger. Each call is its own exclusive
/// unit of work.
#[derive(Debug, Clone)]
pub struct StockLedger {
    db: Database,
}

impl StockLedger {
    pub fn new(db: Database) -> Self {
        StockLedger { db }
    }

    /// See [`check_available`].
    pub async fn check(&self, sku: &str, quantity: i64) -> DbResult<StockCheck> {
        let mut conn = self.db.pool().acquire().await?;
        check_available(&mut conn, sku, quantity).await
    }

    /// Manually adjusts stock (receiving, shrinkage, recount corrections).
    ///
    /// ## Returns
    /// * `Ok(new_quantity)`
    /// * `Err(NotFound)` - unknown sku
    /// * `Err(Domain(InsufficientStock))` - would go below zero; nothing changed
    pub async fn adjust(&self, sku: &str, delta: i64) -> DbResult<i64> {
        let owned_sku = sku.to_string();

        let new_quantity = self
            .db
            .exclusive(move |conn| {
                Box::pin(async move {
                    match apply_delta(conn, &owned_sku, delta).await? {
                        StockOutcome::Applied { new_quantity } => Ok(new_quantity),
                        StockOutcome::NotFound => Err(DbError::not_found("Product", owned_sku)),
                        StockOutcome::WouldGoNegative { available } => {
                            Err(CoreError::InsufficientStock {
                                sku: owned_sku,
                                available,
                                requested: -delta,
                            }
                            .into())
                        }
                    }
                })
            })
            .await?;

        info!(sku = %sku, delta, new_quantity, "Stock adjusted");
        Ok(new_quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use tally_core::{Money, Product};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&Product {
                sku: "SKU1".to_string(),
                name: "Bell".to_string(),
                category: None,
                quantity: 10,
                unit_price: Money::parse("100.00").unwrap(),
            })
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_check_available() {
        let db = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert_eq!(check_available(&mut conn, "SKU1", 10).await.unwrap(), StockCheck::Available);
        assert_eq!(
            check_available(&mut conn, "SKU1", 11).await.unwrap(),
            StockCheck::Insufficient { available: 10 }
        );
        assert_eq!(check_available(&mut conn, "NOPE", 1).await.unwrap(), StockCheck::NotFound);
    }

    #[tokio::test]
    async fn test_apply_delta_never_goes_negative() {
        let db = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert_eq!(
            apply_delta(&mut conn, "SKU1", -4).await.unwrap(),
            StockOutcome::Applied { new_quantity: 6 }
        );
        assert_eq!(
            apply_delta(&mut conn, "SKU1", -7).await.unwrap(),
            StockOutcome::WouldGoNegative { available: 6 }
        );
        assert_eq!(apply_delta(&mut conn, "NOPE", 3).await.unwrap(), StockOutcome::NotFound);
        assert_eq!(quantity_on_hand(&mut conn, "SKU1").await.unwrap(), Some(6));
    }

    #[tokio::test]
    async fn test_require_available_names_the_sku() {
        let db = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = require_available(&mut conn, "SKU1", 15).await.unwrap_err();
        let core = err.as_domain().unwrap();
        assert_eq!(core.sku(), Some("SKU1"));
        assert_eq!(core.shortfall(), Some(5));
    }

    #[tokio::test]
    async fn test_manual_adjust() {
        let db = setup().await;
        let ledger = db.stock();

        assert_eq!(ledger.adjust("SKU1", 5).await.unwrap(), 15);
        assert_eq!(ledger.adjust("SKU1", -15).await.unwrap(), 0);
        assert!(matches!(ledger.adjust("SKU1", -1).await, Err(DbError::Domain(_))));
        assert!(matches!(ledger.adjust("NOPE", 1).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_rejected_adjust_leaves_stock_alone() {
        let db = setup().await;
        let ledger = db.stock();

        let err = ledger.adjust("SKU1", -11).await.unwrap_err();
        let core = err.as_domain().unwrap();
        assert_eq!(core.sku(), Some("SKU1"));
        assert_eq!(core.shortfall(), Some(1));

        let err = ledger.adjust("NOPE", -1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, ref id } if entity == "Product" && id == "NOPE"));

        // The rolled-back units of work must not hold the writer lock.
        assert_eq!(ledger.adjust("SKU1", -10).await.unwrap(), 0);
        let product = db.products().get_by_sku("SKU1").await.unwrap().unwrap();
        assert_eq!(product.quantity, 0);
    }
}
