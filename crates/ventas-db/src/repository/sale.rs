//! # Sale Repository
//!
//! Row operations for sales, sale lines, and return records.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  create_sale (engine)                                       │
//! │    cash   → Sale { status: Completed }                      │
//! │    credit → Sale { status: Pending }                        │
//! │                                                             │
//! │  apply_payment (collection engine)                          │
//! │    fully paid → mark_completed                              │
//! │                                                             │
//! │  cancel_sale (reversal engine)                              │
//! │    any non-cancelled state → mark_cancelled (terminal)      │
//! │    + Return / ReturnLine rows, stock restored               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ventas_core::{CoreError, Return, ReturnLine, Sale, SaleLine};

/// Gets a sale by id.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, customer_id, created_by, payment_account_id,
               sale_type, total_cents, status, created_at, updated_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(sale)
}

/// Inserts a sale row.
pub async fn insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, total_cents = %sale.total_cents, "inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, customer_id, created_by, payment_account_id,
            sale_type, total_cents, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.customer_id)
    .bind(&sale.created_by)
    .bind(&sale.payment_account_id)
    .bind(sale.sale_type)
    .bind(sale.total_cents)
    .bind(sale.status)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts one line item of a sale.
pub async fn insert_line(conn: &mut SqliteConnection, line: &SaleLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_lines (id, sale_id, product_id, quantity, unit_price_cents)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&line.id)
    .bind(&line.sale_id)
    .bind(&line.product_id)
    .bind(line.quantity)
    .bind(line.unit_price_cents)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets all line items of a sale.
pub async fn lines(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleLine>> {
    let lines = sqlx::query_as::<_, SaleLine>(
        r#"
        SELECT id, sale_id, product_id, quantity, unit_price_cents
        FROM sale_lines
        WHERE sale_id = ?1
        ORDER BY id
        "#,
    )
    .bind(sale_id)
    .fetch_all(conn)
    .await?;

    Ok(lines)
}

/// Transitions a sale to completed (fully paid).
pub async fn mark_completed(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE sales
        SET status = 'completed', updated_at = ?2
        WHERE id = ?1 AND status = 'pending'
        "#,
    )
    .bind(sale_id)
    .bind(now)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::Domain(CoreError::Conflict {
            entity: "sale",
            id: sale_id.to_string(),
        }));
    }

    Ok(())
}

/// Transitions a sale to cancelled (terminal, one-way).
///
/// The condition repeats the caller's pre-check so that two
/// interleaved cancellations cannot both succeed.
pub async fn mark_cancelled(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE sales
        SET status = 'cancelled', updated_at = ?2
        WHERE id = ?1 AND status != 'cancelled'
        "#,
    )
    .bind(sale_id)
    .bind(now)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::Domain(CoreError::AlreadyCancelled {
            sale_id: sale_id.to_string(),
        }));
    }

    Ok(())
}

// =============================================================================
// Returns
// =============================================================================

/// Inserts a return record.
pub async fn insert_return(conn: &mut SqliteConnection, ret: &Return) -> DbResult<()> {
    debug!(id = %ret.id, sale_id = %ret.sale_id, "inserting return");

    sqlx::query(
        r#"
        INSERT INTO returns (id, sale_id, reason, return_type, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&ret.id)
    .bind(&ret.sale_id)
    .bind(&ret.reason)
    .bind(ret.return_type)
    .bind(ret.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts one restored line of a return.
pub async fn insert_return_line(conn: &mut SqliteConnection, line: &ReturnLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO return_lines (id, return_id, product_id, quantity, note)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&line.id)
    .bind(&line.return_id)
    .bind(&line.product_id)
    .bind(line.quantity)
    .bind(&line.note)
    .execute(conn)
    .await?;

    Ok(())
}
