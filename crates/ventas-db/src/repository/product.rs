//! # Product Repository (Inventory Ledger)
//!
//! Row operations for products, including the two inventory ledger
//! primitives: `reserve_stock` and `release_stock`.
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: read stock, check in memory, write new value     │
//! │     (two concurrent sales both pass the stale check)        │
//! │                                                             │
//! │  ✅ CORRECT: atomic conditional update                      │
//! │     UPDATE products SET stock = stock - ?                   │
//! │     WHERE id = ? AND stock >= ?                             │
//! │     → zero rows affected = the failure condition            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ventas_core::{CoreError, Product};

/// Gets a product by id.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, description, category, stock, stock_minimum,
               supplier_id, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(product)
}

/// Inserts a new product.
pub async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    debug!(id = %product.id, name = %product.name, "inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, name, description, category, stock, stock_minimum,
            supplier_id, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.category)
    .bind(product.stock)
    .bind(product.stock_minimum)
    .bind(&product.supplier_id)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Lists products at or below their reorder threshold.
pub async fn list_low_stock(conn: &mut SqliteConnection) -> DbResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, description, category, stock, stock_minimum,
               supplier_id, created_at, updated_at
        FROM products
        WHERE stock <= stock_minimum
        ORDER BY stock ASC
        "#,
    )
    .fetch_all(conn)
    .await?;

    Ok(products)
}

/// Atomically decrements stock within the caller's transaction.
///
/// Fails with `InsufficientStock` if `quantity` exceeds the current
/// (transaction-consistent) stock; the conditional update is the
/// authority, so two interleaved sales can never both decrement past
/// zero. Does not commit independently.
pub async fn reserve_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    debug!(product_id = %product_id, quantity = %quantity, "reserving stock");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // Classify: missing product vs not enough stock
        return match get(conn, product_id).await? {
            None => Err(DbError::not_found("product", product_id)),
            Some(product) => Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available: product.stock,
                requested: quantity,
            }
            .into()),
        };
    }

    Ok(())
}

/// Unconditionally increments stock within the caller's transaction.
///
/// Used by purchases and by cancellation/reversal.
pub async fn release_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    debug!(product_id = %product_id, quantity = %quantity, "releasing stock");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("product", product_id));
    }

    Ok(())
}
