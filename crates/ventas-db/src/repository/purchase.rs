//! # Purchase Repository
//!
//! Row operations for suppliers, purchases, purchase lines, and
//! supplier payments.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use ventas_core::{Purchase, PurchaseLine, Supplier, SupplierPayment};

// =============================================================================
// Suppliers
// =============================================================================

/// Gets a supplier by id.
pub async fn get_supplier(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Supplier>> {
    let supplier = sqlx::query_as::<_, Supplier>(
        r#"
        SELECT id, name, address, contact, created_at
        FROM suppliers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(supplier)
}

/// Inserts a new supplier.
pub async fn insert_supplier(conn: &mut SqliteConnection, supplier: &Supplier) -> DbResult<()> {
    debug!(id = %supplier.id, name = %supplier.name, "inserting supplier");

    sqlx::query(
        r#"
        INSERT INTO suppliers (id, name, address, contact, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&supplier.id)
    .bind(&supplier.name)
    .bind(&supplier.address)
    .bind(&supplier.contact)
    .bind(supplier.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Purchases
// =============================================================================

/// Gets a purchase by id.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Purchase>> {
    let purchase = sqlx::query_as::<_, Purchase>(
        r#"
        SELECT id, supplier_id, total_cents, status, created_at
        FROM purchases
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(purchase)
}

/// Inserts a purchase row.
pub async fn insert(conn: &mut SqliteConnection, purchase: &Purchase) -> DbResult<()> {
    debug!(id = %purchase.id, total_cents = %purchase.total_cents, "inserting purchase");

    sqlx::query(
        r#"
        INSERT INTO purchases (id, supplier_id, total_cents, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&purchase.id)
    .bind(&purchase.supplier_id)
    .bind(purchase.total_cents)
    .bind(purchase.status)
    .bind(purchase.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts one line item of a purchase.
pub async fn insert_line(conn: &mut SqliteConnection, line: &PurchaseLine) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_lines (
            id, purchase_id, product_id, quantity, unit_cost_cents, subtotal_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&line.id)
    .bind(&line.purchase_id)
    .bind(&line.product_id)
    .bind(line.quantity)
    .bind(line.unit_cost_cents)
    .bind(line.subtotal_cents)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets all line items of a purchase.
pub async fn lines(conn: &mut SqliteConnection, purchase_id: &str) -> DbResult<Vec<PurchaseLine>> {
    let lines = sqlx::query_as::<_, PurchaseLine>(
        r#"
        SELECT id, purchase_id, product_id, quantity, unit_cost_cents, subtotal_cents
        FROM purchase_lines
        WHERE purchase_id = ?1
        ORDER BY id
        "#,
    )
    .bind(purchase_id)
    .fetch_all(conn)
    .await?;

    Ok(lines)
}

/// Transitions a purchase to completed (fully paid).
pub async fn mark_completed(conn: &mut SqliteConnection, purchase_id: &str) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE purchases
        SET status = 'completed'
        WHERE id = ?1 AND status = 'pending'
        "#,
    )
    .bind(purchase_id)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Supplier Payments
// =============================================================================

/// Inserts a supplier payment.
pub async fn insert_payment(conn: &mut SqliteConnection, payment: &SupplierPayment) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO supplier_payments (id, purchase_id, amount_cents, method, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.purchase_id)
    .bind(payment.amount_cents)
    .bind(&payment.method)
    .bind(payment.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Sum of all payments recorded against a purchase.
///
/// Recomputed from scratch on every call (no cached running total),
/// so completion detection stays consistent.
pub async fn total_paid(conn: &mut SqliteConnection, purchase_id: &str) -> DbResult<i64> {
    let total: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT SUM(amount_cents)
        FROM supplier_payments
        WHERE purchase_id = ?1
        "#,
    )
    .bind(purchase_id)
    .fetch_one(conn)
    .await?;

    Ok(total.unwrap_or(0))
}

/// Gets all payments recorded against a purchase, oldest first.
pub async fn payments(
    conn: &mut SqliteConnection,
    purchase_id: &str,
) -> DbResult<Vec<SupplierPayment>> {
    let payments = sqlx::query_as::<_, SupplierPayment>(
        r#"
        SELECT id, purchase_id, amount_cents, method, created_at
        FROM supplier_payments
        WHERE purchase_id = ?1
        ORDER BY created_at, id
        "#,
    )
    .bind(purchase_id)
    .fetch_all(conn)
    .await?;

    Ok(payments)
}
