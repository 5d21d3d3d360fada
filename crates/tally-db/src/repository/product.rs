//! # Product Repository
//!
//! Catalog operations for products.
//!
//! ## Key Operations
//! - Add / update / delete by sku
//! - Lookup and listing
//!
//! ## Deleting a Product
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DELETE FROM products WHERE sku = 'BELL-01'                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  order_items.product_sku = 'BELL-01'  ──►  NULL   (ON DELETE SET NULL) │
//! │                                                                         │
//! │  The items keep product_name and unit_price, so existing orders and    │
//! │  their invoices still read correctly.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantity changes caused by orders go through the [stock
//! ledger](crate::ledger), never through this repository.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tally_core::validation::{validate_amount, validate_name, validate_sku};
use tally_core::{Product, ValidationError};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::category::CategoryRepository;
use crate::repository::money_column;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// repo.insert(&product).await?;
/// let product = repo.get_by_sku("HELMET-M").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by sku.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT sku, name, category, quantity, unit_price
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Lists all products, sorted by sku.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT sku, name, category, quantity, unit_price
            FROM products
            ORDER BY sku
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Lists the products in one category.
    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT sku, name, category, quantity, unit_price
            FROM products
            WHERE category = ?1
            ORDER BY sku
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the stored (trimmed) product
    /// * `Err(UniqueViolation)` - the sku is taken
    /// * `Err(Domain(Validation))` - bad field, or unknown category
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        let product = self.validated(product).await?;
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (sku, name, category, quantity, unit_price)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.quantity)
        .bind(product.unit_price.to_storage())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("sku", product.sku.as_str()),
            other => other,
        })?;

        info!(sku = %product.sku, "Product added");
        Ok(product)
    }

    /// Overwrites name, category and price of an existing product.
    ///
    /// `product.quantity` is ignored: stock only moves through the
    /// [ledger](crate::ledger), so an edit made from a stale read can't undo
    /// a reservation. Existing orders are unaffected: their items hold their
    /// own snapshot.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the stored product, with its current quantity
    /// * `Err(NotFound)` - unknown sku
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        let product = self.validated(product).await?;
        debug!(sku = %product.sku, "Updating product");

        let quantity: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET name = ?2, category = ?3, unit_price = ?4
            WHERE sku = ?1
            RETURNING quantity
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.unit_price.to_storage())
        .fetch_optional(&self.pool)
        .await?;

        let Some(quantity) = quantity else {
            return Err(DbError::not_found("Product", product.sku));
        };

        info!(sku = %product.sku, "Product updated");
        Ok(Product { quantity, ..product })
    }

    /// Deletes a product. Order items that referenced it keep their
    /// snapshots with a NULL sku.
    pub async fn delete(&self, sku: &str) -> DbResult<()> {
        debug!(sku = %sku, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE sku = ?1")
            .bind(sku)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", sku));
        }

        info!(sku = %sku, "Product deleted");
        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Field checks plus "the category exists".
    async fn validated(&self, product: &Product) -> DbResult<Product> {
        let sku = product.sku.trim().to_string();
        validate_sku(&sku)?;
        let name = validate_name("name", &product.name)?;
        if product.quantity < 0 {
            return Err(ValidationError::Negative {
                field: "quantity".to_string(),
            }
            .into());
        }
        validate_amount("unitPrice", product.unit_price)?;

        let category = match product.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => {
                if !CategoryRepository::new(self.pool.clone()).exists(name).await? {
                    return Err(ValidationError::invalid_format(
                        "category",
                        format!("unknown category '{name}'"),
                    )
                    .into());
                }
                Some(name.to_string())
            }
        };

        Ok(Product {
            sku,
            name,
            category,
            quantity: product.quantity,
            unit_price: product.unit_price,
        })
    }
}

fn product_from_row(row: &SqliteRow) -> DbResult<Product> {
    Ok(Product {
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        quantity: row.try_get("quantity")?,
        unit_price: money_column(row, "unit_price")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use tally_core::{ErrorKind, Money};

    fn product(sku: &str, quantity: i64, price: &str) -> Product {
        Product {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            category: None,
            quantity,
            unit_price: Money::parse(price).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&product("SKU1", 10, "100.005")).await.unwrap();

        let stored = repo.get_by_sku("SKU1").await.unwrap().unwrap();
        assert_eq!(stored.quantity, 10);
        assert_eq!(stored.unit_price.to_storage(), "100.005");
        assert!(repo.get_by_sku("SKU2").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_conflict() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&product("SKU1", 1, "1")).await.unwrap();

        let err = db.products().insert(&product("SKU1", 2, "2")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_unknown_category_is_validation_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut p = product("SKU1", 1, "1");
        p.category = Some("Ghosts".to_string());
        let err = db.products().insert(&p).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        db.categories().add("Ghosts").await.unwrap();
        db.products().insert(&p).await.unwrap();
        assert_eq!(db.products().list_by_category("Ghosts").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&product("SKU1", 1, "1")).await.unwrap();

        let mut changed = product("SKU1", 7, "2.50");
        changed.name = "Renamed".to_string();
        let returned = repo.update(&changed).await.unwrap();
        let stored = repo.get_by_sku("SKU1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.unit_price, Money::parse("2.50").unwrap());
        assert_eq!(stored.quantity, 1);
        assert_eq!(returned, stored);

        assert!(matches!(
            repo.update(&product("SKU9", 1, "1")).await,
            Err(DbError::NotFound { .. })
        ));

        repo.delete("SKU1").await.unwrap();
        assert!(matches!(repo.delete("SKU1").await, Err(DbError::NotFound { .. })));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_from_stale_read_keeps_stock_movements() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&product("SKU1", 10, "100")).await.unwrap();

        let mut edited = repo.get_by_sku("SKU1").await.unwrap().unwrap();
        assert_eq!(db.stock().adjust("SKU1", -4).await.unwrap(), 6);

        edited.name = "Road Helmet".to_string();
        let returned = repo.update(&edited).await.unwrap();

        let stored = repo.get_by_sku("SKU1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Road Helmet");
        assert_eq!(stored.quantity, 6);
        assert_eq!(returned.quantity, 6);
    }

    #[tokio::test]
    async fn test_rejects_negative_quantity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.products().insert(&product("SKU1", -1, "1")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
