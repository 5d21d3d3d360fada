//! # Order Repository
//!
//! Persistence of order headers and their line items.
//!
//! ## Write vs Read Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WRITES (connection-level, inside Database::exclusive)                 │
//! │    insert_header / update_header / delete_header                       │
//! │    insert_items / delete_items / load_header / load_items              │
//! │    Called only by the order engine, which owns stock bookkeeping.      │
//! │                                                                         │
//! │  READS (OrderRepository, pool-level)                                   │
//! │    get(id)  → OrderDetail   header + items in entry order              │
//! │    list()   → OrderSummary  newest first                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};
use tally_core::{LineItem, Order, OrderDetail, OrderItem, OrderSummary};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{money_column, rate_column};

const SELECT_HEADER: &str = r#"
    SELECT id, customer_name, mobile_number, email_address, order_date,
           planned_delivery_date, payment_method, advance_received,
           personalization_required, personalization_details, total_cost,
           tax_rate, created_at, updated_at
    FROM orders
    WHERE id = ?1
"#;

// =============================================================================
// Connection-level writes
// =============================================================================

pub async fn insert_header(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    debug!(order_id = %order.id, "Inserting order header");

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, customer_name, mobile_number, email_address, order_date,
            planned_delivery_date, payment_method, advance_received,
            personalization_required, personalization_details, total_cost,
            tax_rate, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&order.id)
    .bind(&order.customer_name)
    .bind(&order.mobile_number)
    .bind(&order.email_address)
    .bind(order.order_date)
    .bind(order.planned_delivery_date)
    .bind(&order.payment_method)
    .bind(order.advance_received.to_storage())
    .bind(order.personalization_required)
    .bind(&order.personalization_details)
    .bind(order.total_cost.to_storage())
    .bind(order.tax_rate.to_storage())
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Overwrites every mutable header field. `id` and `created_at` stay.
pub async fn update_header(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    debug!(order_id = %order.id, "Updating order header");

    let result = sqlx::query(
        r#"
        UPDATE orders
        SET customer_name = ?2,
            mobile_number = ?3,
            email_address = ?4,
            order_date = ?5,
            planned_delivery_date = ?6,
            payment_method = ?7,
            advance_received = ?8,
            personalization_required = ?9,
            personalization_details = ?10,
            total_cost = ?11,
            tax_rate = ?12,
            updated_at = ?13
        WHERE id = ?1
        "#,
    )
    .bind(&order.id)
    .bind(&order.customer_name)
    .bind(&order.mobile_number)
    .bind(&order.email_address)
    .bind(order.order_date)
    .bind(order.planned_delivery_date)
    .bind(&order.payment_method)
    .bind(order.advance_received.to_storage())
    .bind(order.personalization_required)
    .bind(&order.personalization_details)
    .bind(order.total_cost.to_storage())
    .bind(order.tax_rate.to_storage())
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Order", order.id.as_str()));
    }

    Ok(())
}

/// Deletes the header (items cascade). Returns the number of rows removed.
pub async fn delete_header(conn: &mut SqliteConnection, order_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Appends `items` in order, numbering lines from 1.
pub async fn insert_items(
    conn: &mut SqliteConnection,
    order_id: &str,
    items: &[LineItem],
) -> DbResult<()> {
    for (idx, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_sku, line_no, quantity, unit_price, product_name)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(order_id)
        .bind(&item.sku)
        .bind(idx as i64 + 1)
        .bind(item.quantity)
        .bind(item.unit_price.to_storage())
        .bind(&item.product_name)
        .execute(&mut *conn)
        .await?;
    }

    debug!(order_id = %order_id, count = items.len(), "Inserted order items");
    Ok(())
}

pub async fn delete_items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

pub async fn load_header(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Option<Order>> {
    let row = sqlx::query(SELECT_HEADER)
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(order_from_row).transpose()
}

/// Items in entry order.
pub async fn load_items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
    let rows = sqlx::query(
        r#"
        SELECT order_id, line_no, product_sku, product_name, quantity, unit_price
        FROM order_items
        WHERE order_id = ?1
        ORDER BY line_no, id
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(item_from_row).collect()
}

// =============================================================================
// Pool-level reads
// =============================================================================

/// Read access to orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Header and items of one order, read in a single transaction.
    pub async fn get(&self, order_id: &str) -> DbResult<Option<OrderDetail>> {
        let mut tx = self.pool.begin().await?;

        let Some(order) = load_header(&mut tx, order_id).await? else {
            return Ok(None);
        };
        let items = load_items(&mut tx, order_id).await?;
        tx.commit().await?;

        Ok(Some(OrderDetail { order, items }))
    }

    /// All orders, newest first.
    ///
    /// Ids are compared numerically (`ORD10000` above `ORD9999`): a longer
    /// id is always a larger number.
    pub async fn list(&self) -> DbResult<Vec<OrderSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_name, mobile_number, order_date,
                   planned_delivery_date, total_cost
            FROM orders
            ORDER BY length(id) DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(OrderSummary {
                    id: row.try_get("id")?,
                    customer_name: row.try_get("customer_name")?,
                    mobile_number: row.try_get("mobile_number")?,
                    order_date: row.try_get("order_date")?,
                    planned_delivery_date: row.try_get("planned_delivery_date")?,
                    total_cost: money_column(row, "total_cost")?,
                })
            })
            .collect()
    }
}

// =============================================================================
// Row mapping
// =============================================================================

fn order_from_row(row: &SqliteRow) -> DbResult<Order> {
    Ok(Order {
        id: row.try_get("id")?,
        customer_name: row.try_get("customer_name")?,
        mobile_number: row.try_get("mobile_number")?,
        email_address: row.try_get("email_address")?,
        order_date: row.try_get("order_date")?,
        planned_delivery_date: row.try_get("planned_delivery_date")?,
        payment_method: row.try_get("payment_method")?,
        advance_received: money_column(row, "advance_received")?,
        personalization_required: row.try_get("personalization_required")?,
        personalization_details: row.try_get("personalization_details")?,
        total_cost: money_column(row, "total_cost")?,
        tax_rate: rate_column(row, "tax_rate")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn item_from_row(row: &SqliteRow) -> DbResult<OrderItem> {
    Ok(OrderItem {
        order_id: row.try_get("order_id")?,
        line_no: row.try_get("line_no")?,
        sku: row.try_get("product_sku")?,
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        unit_price: money_column(row, "unit_price")?,
    })
}
