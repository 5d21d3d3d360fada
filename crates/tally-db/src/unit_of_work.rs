//! # Exclusive Unit of Work
//!
//! Every mutation of stock, orders or the order sequence runs inside one
//! `BEGIN IMMEDIATE` transaction.
//!
//! ```text
//! exclusive(pool, work)
//!    │
//!    ├── BEGIN IMMEDIATE     write lock taken before the first read;
//!    │                       other writers wait (busy_timeout)
//!    ├── work(&mut conn)
//!    │      ├── Ok(v)  ──► COMMIT   ──► Ok(v)
//!    │      └── Err(e) ──► ROLLBACK ──► Err(e)
//!    │
//!    └── future dropped mid-way ──► transaction dropped ──► ROLLBACK
//! ```
//!
//! Taking the lock up front is what keeps a stock check and the decrement
//! that follows it from interleaving with another writer, and what keeps the
//! sequence's read-increment-write from issuing an id twice.

use futures::future::BoxFuture;
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Runs `work` in an exclusive transaction on a pooled connection.
///
/// Commits when `work` returns `Ok`, rolls back when it returns `Err`. If
/// the returned future is dropped before completion the transaction is
/// dropped too, which rolls it back.
///
/// ## Example
/// ```rust,ignore
/// let id = exclusive(&pool, |conn| Box::pin(async move {
///     sequence::next_order_id(conn).await
/// })).await?;
/// ```
pub async fn exclusive<T, F>(pool: &SqlitePool, work: F) -> DbResult<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, DbResult<T>> + Send,
{
    let mut tx = pool
        .begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(|e| match DbError::from(e) {
            busy @ DbError::Busy(_) => busy,
            other => DbError::TransactionFailed(other.to_string()),
        })?;
    debug!("Exclusive transaction started");

    match work(&mut *tx).await {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            debug!("Exclusive transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            debug!(error = %err, "Exclusive transaction rolled back");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn category_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_commits_on_ok() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let inserted = db
            .exclusive(|conn| {
                Box::pin(async move {
                    let result = sqlx::query("INSERT INTO categories (name) VALUES ('Bells')")
                        .execute(&mut *conn)
                        .await?;
                    Ok(result.rows_affected())
                })
            })
            .await
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(category_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_rolls_back_on_err() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let result: DbResult<()> = db
            .exclusive(|conn| {
                Box::pin(async move {
                    sqlx::query("INSERT INTO categories (name) VALUES ('Bells')")
                        .execute(&mut *conn)
                        .await?;
                    Err(DbError::not_found("Order", "ORD0001"))
                })
            })
            .await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert_eq!(category_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_dropped_future_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let pending = db.exclusive(|conn| {
            Box::pin(async move {
                sqlx::query("INSERT INTO categories (name) VALUES ('Bells')")
                    .execute(&mut *conn)
                    .await?;
                futures::future::pending::<()>().await;
                Ok(())
            })
        });
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(50), pending).await;
        assert!(timed_out.is_err());

        assert_eq!(category_count(&db).await, 0);
    }
}
