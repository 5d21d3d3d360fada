//! # Order Mutation Engine
//!
//! Creates, edits and deletes orders. Each operation is one exclusive unit
//! of work: stock checks, id allocation, header and item writes and stock
//! deltas all commit together or not at all.
//!
//! ## Create
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderIntent { items: [SKU1 × 4 @ 100.00] }                             │
//! │       │                                                                 │
//! │       ▼  BEGIN IMMEDIATE                                                │
//! │  1. check_available per sku (quantities summed across lines)           │
//! │  2. next_order_id                    → ORD0007                         │
//! │  3. price under intent rate or default                                 │
//! │  4. insert header + items                                              │
//! │  5. apply_delta(sku, −qty)                                             │
//! │       ▼  COMMIT                                                         │
//! │  "ORD0007"                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Update
//! ```text
//! old items {A:3, B:2} ──┐
//!                        ├──► deltas A:+2 B:−2 C:+1 ──► check A, C
//! new intent {A:5, C:1} ─┘                                  │
//!                                                           ▼
//!        overwrite header, replace items, apply −delta per sku
//! ```
//! Items whose product has since been deleted (NULL sku) are left out of
//! the old side. The tax rate sticks: the intent's rate if it carries one,
//! otherwise the order's stored rate, never the configured default.
//!
//! ## Delete
//! Restocks every item (skipping products that no longer exist), then
//! removes items and header. An order without items only loses its header.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tally_core::reconcile::{self, StockDelta};
use tally_core::{
    CoreError, Money, Order, OrderDetail, OrderIntent, OrderSummary, TaxRate, DEFAULT_TAX_RATE,
};
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::ledger::{self, StockOutcome};
use crate::repository::order;
use crate::sequence;
use crate::Database;

// =============================================================================
// Configuration
// =============================================================================

/// Engine settings fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Rate applied to new orders whose intent carries none.
    pub default_tax_rate: TaxRate,
}

impl EngineConfig {
    pub fn new(default_tax_rate: TaxRate) -> Self {
        EngineConfig { default_tax_rate }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Orchestrates order mutations over the stock ledger and order store.
///
/// ## Usage
/// ```rust,ignore
/// let engine = OrderEngine::new(db.clone(), EngineConfig::default());
///
/// let id = engine.create_order(&intent).await?;
/// let deltas = engine.update_order(&id, &edited).await?;
/// engine.delete_order(&id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderEngine {
    db: Database,
    config: EngineConfig,
}

impl OrderEngine {
    pub fn new(db: Database, config: EngineConfig) -> Self {
        OrderEngine { db, config }
    }

    /// Persists a new order and reserves its stock.
    ///
    /// ## Returns
    /// * `Ok(order_id)`
    /// * `Err(Domain(EmptyOrder))` - no lines
    /// * `Err(Domain(UnknownSku | InsufficientStock))` - nothing was written
    pub async fn create_order(&self, intent: &OrderIntent) -> DbResult<String> {
        intent.ensure_not_empty()?;

        let lines = intent.items.len();
        let intent = intent.clone();
        let default_rate = self.config.default_tax_rate;

        let order_id = self
            .db
            .exclusive(move |conn| {
                Box::pin(async move {
                    let wanted = intent.quantities_by_sku();
                    for (sku, quantity) in &wanted {
                        ledger::require_available(conn, sku, *quantity).await?;
                    }

                    let order_id = sequence::next_order_id(conn).await?;
                    let breakdown = intent.price(default_rate);
                    let now = Utc::now();

                    let header = header_from_intent(
                        order_id.clone(),
                        &intent,
                        breakdown.total,
                        breakdown.tax_rate,
                        now,
                        now,
                    );
                    order::insert_header(conn, &header).await?;
                    order::insert_items(conn, &order_id, &intent.items).await?;

                    for (sku, quantity) in &wanted {
                        match ledger::apply_delta(conn, sku, -quantity).await? {
                            StockOutcome::Applied { .. } => {}
                            StockOutcome::NotFound => {
                                return Err(CoreError::UnknownSku(sku.clone()).into());
                            }
                            StockOutcome::WouldGoNegative { available } => {
                                return Err(CoreError::InsufficientStock {
                                    sku: sku.clone(),
                                    available,
                                    requested: *quantity,
                                }
                                .into());
                            }
                        }
                    }

                    Ok(order_id)
                })
            })
            .await?;

        info!(order_id = %order_id, lines, "Order created");
        Ok(order_id)
    }

    /// Replaces an order's header and items, moving only the stock that
    /// changed.
    ///
    /// ## Returns
    /// * `Ok(deltas)` - the applied per-sku changes, sorted by sku
    /// * `Err(NotFound)` - no such order
    /// * `Err(Domain(..))` - a positive delta can't be covered; nothing changed
    pub async fn update_order(
        &self,
        order_id: &str,
        intent: &OrderIntent,
    ) -> DbResult<Vec<StockDelta>> {
        let order_id = order_id.to_string();
        let intent = intent.clone();

        let (order_id, deltas) = self
            .db
            .exclusive(move |conn| {
                Box::pin(async move {
                    let existing = order::load_header(conn, &order_id)
                        .await?
                        .ok_or_else(|| DbError::not_found("Order", order_id.as_str()))?;

                    let old_items = order::load_items(conn, &order_id).await?;
                    let old = reconcile::aggregate_by_sku(
                        old_items
                            .iter()
                            .filter_map(|item| item.sku.as_deref().map(|sku| (sku, item.quantity))),
                    );
                    let new = intent.quantities_by_sku();
                    let deltas = reconcile::reconcile(&old, &new);

                    for delta in deltas.iter().filter(|d| d.is_reservation()) {
                        ledger::require_available(conn, &delta.sku, delta.delta).await?;
                    }

                    let breakdown = intent.price(existing.tax_rate);
                    let header = header_from_intent(
                        order_id.clone(),
                        &intent,
                        breakdown.total,
                        breakdown.tax_rate,
                        existing.created_at,
                        Utc::now(),
                    );
                    order::update_header(conn, &header).await?;
                    order::delete_items(conn, &order_id).await?;
                    order::insert_items(conn, &order_id, &intent.items).await?;

                    for delta in &deltas {
                        match ledger::apply_delta(conn, &delta.sku, delta.ledger_change()).await? {
                            StockOutcome::Applied { .. } => {}
                            StockOutcome::NotFound if delta.is_reservation() => {
                                return Err(CoreError::UnknownSku(delta.sku.clone()).into());
                            }
                            StockOutcome::NotFound => {
                                warn!(
                                    order_id = %order_id,
                                    sku = %delta.sku,
                                    "Product no longer exists, skipping restock"
                                );
                            }
                            StockOutcome::WouldGoNegative { available } => {
                                return Err(CoreError::InsufficientStock {
                                    sku: delta.sku.clone(),
                                    available,
                                    requested: delta.delta,
                                }
                                .into());
                            }
                        }
                    }

                    Ok((order_id, deltas))
                })
            })
            .await?;

        info!(order_id = %order_id, changed_skus = deltas.len(), "Order updated");
        Ok(deltas)
    }

    /// Deletes an order and returns its stock.
    ///
    /// ## Returns
    /// * `Ok(())`
    /// * `Err(NotFound)` - no such order (e.g. already deleted); nothing changed
    pub async fn delete_order(&self, order_id: &str) -> DbResult<()> {
        let owned_id = order_id.to_string();

        self.db
            .exclusive(move |conn| {
                Box::pin(async move {
                    let order_id = owned_id;
                    let items = order::load_items(conn, &order_id).await?;

                    if !items.is_empty() {
                        let orphaned = items.iter().filter(|item| item.sku.is_none()).count();
                        if orphaned > 0 {
                            warn!(order_id = %order_id, orphaned, "Items of deleted products are not restocked");
                        }

                        let returned: BTreeMap<String, i64> = reconcile::aggregate_by_sku(
                            items
                                .iter()
                                .filter_map(|item| item.sku.as_deref().map(|sku| (sku, item.quantity))),
                        );

                        for (sku, quantity) in &returned {
                            match ledger::apply_delta(conn, sku, *quantity).await? {
                                StockOutcome::Applied { .. } => {}
                                StockOutcome::NotFound => {
                                    warn!(order_id = %order_id, sku = %sku, "Product no longer exists, skipping restock");
                                }
                                StockOutcome::WouldGoNegative { available } => {
                                    return Err(DbError::Internal(format!(
                                        "restocking {sku} by {quantity} rejected at {available}"
                                    )));
                                }
                            }
                        }

                        order::delete_items(conn, &order_id).await?;
                    }

                    if order::delete_header(conn, &order_id).await? == 0 {
                        return Err(DbError::not_found("Order", order_id));
                    }

                    Ok(())
                })
            })
            .await?;

        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    /// Header, items and stored tax rate of one order.
    pub async fn get_order(&self, order_id: &str) -> DbResult<OrderDetail> {
        self.db
            .orders()
            .get(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    /// All orders, newest first.
    pub async fn list_orders(&self) -> DbResult<Vec<OrderSummary>> {
        self.db.orders().list().await
    }
}

fn header_from_intent(
    id: String,
    intent: &OrderIntent,
    total_cost: Money,
    tax_rate: TaxRate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Order {
    Order {
        id,
        customer_name: intent.customer_name.clone(),
        mobile_number: intent.mobile_number.clone(),
        email_address: intent.email_address.clone(),
        order_date: intent.order_date,
        planned_delivery_date: intent.planned_delivery_date,
        payment_method: intent.payment_method.clone(),
        advance_received: intent.advance_received,
        personalization_required: intent.personalization_required,
        personalization_details: intent.personalization_details.clone(),
        total_cost,
        tax_rate,
        created_at,
        updated_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbConfig, sequence};
    use serde_json::json;
    use std::collections::HashSet;
    use tally_core::{ErrorKind, Product};

    async fn setup(stock: &[(&str, i64, &str)]) -> (Database, OrderEngine) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_products(&db, stock).await;
        let engine = OrderEngine::new(db.clone(), EngineConfig::default());
        (db, engine)
    }

    async fn seed_products(db: &Database, stock: &[(&str, i64, &str)]) {
        for (sku, quantity, price) in stock {
            db.products()
                .insert(&Product {
                    sku: sku.to_string(),
                    name: format!("Product {sku}"),
                    category: None,
                    quantity: *quantity,
                    unit_price: Money::parse(price).unwrap(),
                })
                .await
                .unwrap();
        }
    }

    fn intent(lines: &[(&str, i64, &str)]) -> OrderIntent {
        intent_with(lines, json!(null))
    }

    fn intent_with(lines: &[(&str, i64, &str)], tax_rate: serde_json::Value) -> OrderIntent {
        let items: Vec<_> = lines
            .iter()
            .map(|(sku, quantity, price)| {
                json!({"sku": sku, "productName": format!("Product {sku}"), "quantity": quantity, "price": price})
            })
            .collect();
        let body = json!({
            "customerName": "Asha Rao",
            "mobileNumber": "9876543210",
            "emailAddress": "asha@example.in",
            "orderDate": "2025-09-05",
            "plannedDeliveryDate": "2025-09-12",
            "paymentMethod": "UPI",
            "advanceReceived": "100",
            "taxRate": tax_rate,
            "items": items,
        });
        OrderIntent::from_json(&body.to_string()).unwrap()
    }

    async fn stock_of(db: &Database, sku: &str) -> i64 {
        db.products().get_by_sku(sku).await.unwrap().unwrap().quantity
    }

    async fn last_issued(db: &Database) -> i64 {
        let mut conn = db.pool().acquire().await.unwrap();
        sequence::last_issued(&mut conn).await.unwrap()
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_reserves_stock_and_prices_order() {
        let (db, engine) = setup(&[("SKU1", 10, "100.00")]).await;

        let id = engine.create_order(&intent(&[("SKU1", 4, "100.00")])).await.unwrap();
        assert_eq!(id, "ORD0001");
        assert_eq!(stock_of(&db, "SKU1").await, 6);

        let detail = engine.get_order(&id).await.unwrap();
        assert_eq!(detail.order.tax_rate, DEFAULT_TAX_RATE);
        assert_eq!(detail.order.total_cost.to_string(), "420.00");

        let invoice = detail.invoice();
        assert_eq!(invoice.subtotal.to_string(), "400.00");
        assert_eq!(invoice.tax_amount.to_string(), "20.00");
        assert_eq!(invoice.total.to_string(), "420.00");
        assert_eq!(invoice.balance_due.to_string(), "320.00");
    }

    #[tokio::test]
    async fn test_failed_create_leaves_no_trace() {
        let (db, engine) = setup(&[("SKU1", 10, "100"), ("SKU2", 2, "50")]).await;

        let err = engine
            .create_order(&intent(&[("SKU1", 1, "100"), ("SKU2", 5, "50")]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        let core = err.as_domain().unwrap();
        assert_eq!(core.sku(), Some("SKU2"));
        assert_eq!(core.shortfall(), Some(3));

        assert_eq!(stock_of(&db, "SKU1").await, 10);
        assert_eq!(stock_of(&db, "SKU2").await, 2);
        assert!(engine.list_orders().await.unwrap().is_empty());
        assert_eq!(last_issued(&db).await, 0);
    }

    #[tokio::test]
    async fn test_create_sums_lines_sharing_a_sku() {
        let (db, engine) = setup(&[("SKU1", 5, "10")]).await;

        let err = engine
            .create_order(&intent(&[("SKU1", 3, "10"), ("SKU1", 3, "10")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 5, requested: 6, .. })
        ));
        assert_eq!(stock_of(&db, "SKU1").await, 5);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_sku_and_empty_orders() {
        let (_db, engine) = setup(&[("SKU1", 5, "10")]).await;

        let err = engine.create_order(&intent(&[("GHOST", 1, "10")])).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::UnknownSku(ref sku)) if sku == "GHOST"));

        let err = engine.create_order(&intent(&[])).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyOrder)));
    }

    #[tokio::test]
    async fn test_get_after_create_round_trips() {
        let (db, engine) = setup(&[("SKU1", 10, "100"), ("SKU2", 10, "25.50")]).await;

        let request = intent_with(&[("SKU2", 2, "25.50"), ("SKU1", 1, "99.99")], json!("0.18"));
        let id = engine.create_order(&request).await.unwrap();

        // Later catalog edits must not reach the stored snapshot.
        let mut product = db.products().get_by_sku("SKU1").await.unwrap().unwrap();
        product.unit_price = Money::parse("150").unwrap();
        product.name = "Renamed".to_string();
        db.products().update(&product).await.unwrap();

        let detail = engine.get_order(&id).await.unwrap();
        let order = &detail.order;
        assert_eq!(order.customer_name, request.customer_name);
        assert_eq!(order.mobile_number, request.mobile_number);
        assert_eq!(order.email_address, request.email_address);
        assert_eq!(order.order_date, request.order_date);
        assert_eq!(order.planned_delivery_date, request.planned_delivery_date);
        assert_eq!(order.payment_method.as_deref(), Some("UPI"));
        assert_eq!(order.advance_received, Money::parse("100").unwrap());
        assert_eq!(order.tax_rate, TaxRate::parse("0.18").unwrap());

        let lines: Vec<_> = detail
            .items
            .iter()
            .map(|i| (i.line_no, i.sku.clone().unwrap(), i.product_name.clone(), i.quantity, i.unit_price))
            .collect();
        assert_eq!(
            lines,
            vec![
                (1, "SKU2".to_string(), "Product SKU2".to_string(), 2, Money::parse("25.50").unwrap()),
                (2, "SKU1".to_string(), "Product SKU1".to_string(), 1, Money::parse("99.99").unwrap()),
            ]
        );
        assert_eq!(detail.breakdown().total, order.total_cost);
    }

    #[tokio::test]
    async fn test_get_missing_order_is_not_found() {
        let (_db, engine) = setup(&[]).await;
        let err = engine.get_order("ORD0404").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    // -------------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_applies_only_the_deltas() {
        let (db, engine) = setup(&[("A", 10, "1"), ("B", 10, "1"), ("C", 10, "1")]).await;
        let id = engine.create_order(&intent(&[("A", 3, "1"), ("B", 2, "1")])).await.unwrap();

        let deltas = engine
            .update_order(&id, &intent(&[("A", 5, "1"), ("B", 0, "1"), ("C", 1, "1")]))
            .await
            .unwrap();

        let applied: Vec<_> = deltas.iter().map(|d| (d.sku.as_str(), d.delta)).collect();
        assert_eq!(applied, vec![("A", 2), ("B", -2), ("C", 1)]);
        assert_eq!(stock_of(&db, "A").await, 5);
        assert_eq!(stock_of(&db, "B").await, 10);
        assert_eq!(stock_of(&db, "C").await, 9);

        let skus: Vec<_> = engine
            .get_order(&id)
            .await
            .unwrap()
            .items
            .into_iter()
            .filter_map(|i| i.sku)
            .collect();
        assert_eq!(skus, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_update_checks_only_the_increase() {
        // Only 2 more A are on hand: holding 3 and asking for 5 fits, 6 doesn't.
        let (db, engine) = setup(&[("A", 5, "1")]).await;
        let id = engine.create_order(&intent(&[("A", 3, "1")])).await.unwrap();

        engine.update_order(&id, &intent(&[("A", 5, "1")])).await.unwrap();
        assert_eq!(stock_of(&db, "A").await, 0);

        let err = engine.update_order(&id, &intent(&[("A", 6, "1")])).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 0, requested: 1, .. })
        ));
        assert_eq!(stock_of(&db, "A").await, 0);
        assert_eq!(engine.get_order(&id).await.unwrap().items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_update_adding_unknown_sku_changes_nothing() {
        let (db, engine) = setup(&[("A", 10, "100"), ("B", 10, "50")]).await;
        let id = engine
            .create_order(&intent(&[("A", 3, "100"), ("B", 2, "50")]))
            .await
            .unwrap();
        let before = engine.get_order(&id).await.unwrap();

        // A's increase passes its check before GHOST fails.
        let err = engine
            .update_order(&id, &intent(&[("A", 5, "100"), ("B", 0, "50"), ("GHOST", 1, "10")]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(err, DbError::Domain(CoreError::UnknownSku(ref sku)) if sku == "GHOST"));

        assert_eq!(stock_of(&db, "A").await, 7);
        assert_eq!(stock_of(&db, "B").await, 8);

        let after = engine.get_order(&id).await.unwrap();
        assert_eq!(after.items, before.items);
        assert_eq!(after.order.total_cost, before.order.total_cost);
        assert_eq!(after.order.total_cost.to_string(), "420.00");
    }

    #[tokio::test]
    async fn test_update_keeps_stored_tax_rate() {
        let (_db, engine) = setup(&[("A", 10, "100")]).await;
        let id = engine
            .create_order(&intent_with(&[("A", 1, "100")], json!(0.18)))
            .await
            .unwrap();

        engine.update_order(&id, &intent(&[("A", 2, "100")])).await.unwrap();
        let detail = engine.get_order(&id).await.unwrap();
        assert_eq!(detail.order.tax_rate, TaxRate::parse("0.18").unwrap());
        assert_eq!(detail.order.total_cost.to_string(), "236.00");

        engine
            .update_order(&id, &intent_with(&[("A", 2, "100")], json!("0.12")))
            .await
            .unwrap();
        let detail = engine.get_order(&id).await.unwrap();
        assert_eq!(detail.order.total_cost.to_string(), "224.00");
        assert!(detail.order.updated_at >= detail.order.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_order_is_not_found() {
        let (db, engine) = setup(&[("A", 10, "1")]).await;
        let err = engine.update_order("ORD0042", &intent(&[("A", 1, "1")])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(stock_of(&db, "A").await, 10);
    }

    #[tokio::test]
    async fn test_update_ignores_items_of_deleted_products() {
        let (db, engine) = setup(&[("A", 10, "1"), ("B", 10, "1")]).await;
        let id = engine.create_order(&intent(&[("A", 2, "1"), ("B", 1, "1")])).await.unwrap();
        db.products().delete("B").await.unwrap();

        let deltas = engine.update_order(&id, &intent(&[("A", 3, "1")])).await.unwrap();
        let applied: Vec<_> = deltas.iter().map(|d| (d.sku.as_str(), d.delta)).collect();
        assert_eq!(applied, vec![("A", 1)]);
        assert_eq!(stock_of(&db, "A").await, 7);
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_twice_restores_stock_once() {
        let (db, engine) = setup(&[("SKU1", 10, "100")]).await;
        let id = engine.create_order(&intent(&[("SKU1", 4, "100")])).await.unwrap();

        engine.delete_order(&id).await.unwrap();
        assert_eq!(stock_of(&db, "SKU1").await, 10);

        let err = engine.delete_order(&id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(stock_of(&db, "SKU1").await, 10);
        assert_eq!(engine.get_order(&id).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_order_without_items() {
        let (db, engine) = setup(&[("A", 10, "1")]).await;
        let id = engine.create_order(&intent(&[("A", 2, "1")])).await.unwrap();

        engine.update_order(&id, &intent(&[])).await.unwrap();
        assert_eq!(stock_of(&db, "A").await, 10);
        assert!(engine.get_order(&id).await.unwrap().items.is_empty());

        engine.delete_order(&id).await.unwrap();
        assert!(engine.list_orders().await.unwrap().is_empty());
        assert_eq!(stock_of(&db, "A").await, 10);
    }

    #[tokio::test]
    async fn test_delete_skips_vanished_products() {
        let (db, engine) = setup(&[("A", 10, "1"), ("B", 10, "1")]).await;
        let id = engine.create_order(&intent(&[("A", 2, "1"), ("B", 3, "1")])).await.unwrap();
        db.products().delete("B").await.unwrap();

        let detail = engine.get_order(&id).await.unwrap();
        assert_eq!(detail.items[1].sku, None);
        assert_eq!(detail.items[1].product_name, "Product B");

        engine.delete_order(&id).await.unwrap();
        assert_eq!(stock_of(&db, "A").await, 10);
    }

    // -------------------------------------------------------------------------
    // Listing
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_list_is_newest_first_by_number() {
        let (db, engine) = setup(&[("A", 10, "1")]).await;
        sqlx::query("UPDATE order_sequence SET last_number = 9998")
            .execute(db.pool())
            .await
            .unwrap();

        engine.create_order(&intent(&[("A", 1, "1")])).await.unwrap();
        engine.create_order(&intent(&[("A", 1, "1")])).await.unwrap();

        let ids: Vec<_> = engine.list_orders().await.unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["ORD10000", "ORD9999"]);
    }

    // -------------------------------------------------------------------------
    // Concurrency
    // -------------------------------------------------------------------------

    async fn file_engine(dir: &tempfile::TempDir, stock: &[(&str, i64, &str)]) -> (Database, OrderEngine) {
        let config = DbConfig::new(dir.path().join("tally.db"))
            .max_connections(4)
            .busy_timeout(std::time::Duration::from_secs(10));
        let db = Database::new(config).await.unwrap();
        seed_products(&db, stock).await;
        let engine = OrderEngine::new(db.clone(), EngineConfig::default());
        (db, engine)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let (db, engine) = file_engine(&dir, &[("A", 100, "1")]).await;

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.create_order(&intent(&[("A", 1, "1")])).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap());
        }

        assert_eq!(ids.len(), 20);
        assert_eq!(stock_of(&db, "A").await, 80);
        assert_eq!(last_issued(&db).await, 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let (db, engine) = file_engine(&dir, &[("A", 5, "1")]).await;

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.create_order(&intent(&[("A", 1, "1")])).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err.kind(), ErrorKind::Validation),
            }
        }

        assert_eq!(created, 5);
        assert_eq!(stock_of(&db, "A").await, 0);
        assert_eq!(engine.list_orders().await.unwrap().len(), 5);
    }
}
