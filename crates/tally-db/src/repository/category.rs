//! # Category Repository
//!
//! Categories are plain names. Deleting one leaves its products in place
//! with `category = NULL` (`ON DELETE SET NULL`).

use sqlx::SqlitePool;
use tally_core::validation::validate_name;
use tally_core::Category;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Repository for category operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Adds a category.
    ///
    /// ## Returns
    /// * `Err(UniqueViolation)` - the name is taken
    pub async fn add(&self, name: &str) -> DbResult<Category> {
        let name = validate_name("category", name)?;
        debug!(name = %name, "Adding category");

        sqlx::query("INSERT INTO categories (name) VALUES (?1)")
            .bind(&name)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("category", name.as_str()),
                other => other,
            })?;

        info!(name = %name, "Category added");
        Ok(Category { name })
    }

    /// Deletes a category; its products become uncategorised.
    pub async fn delete(&self, name: &str) -> DbResult<()> {
        debug!(name = %name, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", name));
        }

        info!(name = %name, "Category deleted");
        Ok(())
    }

    pub async fn exists(&self, name: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// All categories, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(names.into_iter().map(|name| Category { name }).collect())
    }
}
