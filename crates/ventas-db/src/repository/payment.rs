//! # Payment Repository
//!
//! Row operations for payment accounts, the append-only payment audit
//! trail, and persisted installment schedules.
//!
//! The account balance is mutated exclusively through
//! [`apply_to_account`], an atomic conditional update - never by
//! reading a value, computing in application memory, and writing it
//! back separately.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ventas_core::{Installment, InstallmentStatus, PaymentAccount, PaymentEntry, PaymentType};

/// Lists the payment method catalog.
pub async fn list_payment_types(conn: &mut SqliteConnection) -> DbResult<Vec<PaymentType>> {
    let types = sqlx::query_as::<_, PaymentType>(
        "SELECT id, description FROM payment_types ORDER BY id",
    )
    .fetch_all(conn)
    .await?;

    Ok(types)
}

// =============================================================================
// Payment Accounts
// =============================================================================

/// Gets a payment account by id.
pub async fn get_account(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<PaymentAccount>> {
    let account = sqlx::query_as::<_, PaymentAccount>(
        r#"
        SELECT id, payment_type_id, amount_paid_cents, status, paid_at, created_at
        FROM payment_accounts
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(account)
}

/// Inserts a payment account.
pub async fn insert_account(conn: &mut SqliteConnection, account: &PaymentAccount) -> DbResult<()> {
    debug!(id = %account.id, status = ?account.status, "inserting payment account");

    sqlx::query(
        r#"
        INSERT INTO payment_accounts (
            id, payment_type_id, amount_paid_cents, status, paid_at, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&account.id)
    .bind(&account.payment_type_id)
    .bind(account.amount_paid_cents)
    .bind(account.status)
    .bind(account.paid_at)
    .bind(account.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Applies a payment to an account balance, atomically.
///
/// The row is only touched when the account is still collectible and
/// the new balance would not exceed `total_cents`; the status flips to
/// `completed` exactly when the balance reaches the total, `partial`
/// otherwise. Returns the number of rows affected - zero means a
/// concurrent mutation invalidated the caller's checks, and the caller
/// must treat it as a conflict, not retry blindly within the same
/// transaction.
pub async fn apply_to_account(
    conn: &mut SqliteConnection,
    account_id: &str,
    amount_cents: i64,
    total_cents: i64,
    paid_at: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE payment_accounts
        SET amount_paid_cents = amount_paid_cents + ?2,
            status = CASE
                WHEN amount_paid_cents + ?2 >= ?3 THEN 'completed'
                ELSE 'partial'
            END,
            paid_at = ?4
        WHERE id = ?1
          AND status IN ('pending', 'partial')
          AND amount_paid_cents + ?2 <= ?3
        "#,
    )
    .bind(account_id)
    .bind(amount_cents)
    .bind(total_cents)
    .bind(paid_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Voids an account on sale cancellation.
///
/// `amount_paid` is left untouched: no refund accounting is modeled.
pub async fn void_account(conn: &mut SqliteConnection, account_id: &str) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE payment_accounts
        SET status = 'cancelled'
        WHERE id = ?1
        "#,
    )
    .bind(account_id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("payment account", account_id));
    }

    Ok(())
}

// =============================================================================
// Audit Trail
// =============================================================================

/// Appends one immutable audit entry describing a payment event.
pub async fn insert_entry(conn: &mut SqliteConnection, entry: &PaymentEntry) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payment_entries (id, account_id, amount_cents, description, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.account_id)
    .bind(entry.amount_cents)
    .bind(&entry.description)
    .bind(entry.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets the audit trail of an account, oldest first.
pub async fn entries_for_account(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> DbResult<Vec<PaymentEntry>> {
    let entries = sqlx::query_as::<_, PaymentEntry>(
        r#"
        SELECT id, account_id, amount_cents, description, created_at
        FROM payment_entries
        WHERE account_id = ?1
        ORDER BY created_at, id
        "#,
    )
    .bind(account_id)
    .fetch_all(conn)
    .await?;

    Ok(entries)
}

// =============================================================================
// Installment Schedules
// =============================================================================

/// Persists one installment of a credit schedule.
pub async fn insert_installment(
    conn: &mut SqliteConnection,
    installment: &Installment,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO installments (id, sale_id, number, amount_cents, due_date, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&installment.id)
    .bind(&installment.sale_id)
    .bind(installment.number)
    .bind(installment.amount_cents)
    .bind(installment.due_date)
    .bind(installment.status)
    .execute(conn)
    .await?;

    Ok(())
}

/// Gets the installment schedule of a sale, in plan order.
pub async fn installments_for_sale(
    conn: &mut SqliteConnection,
    sale_id: &str,
) -> DbResult<Vec<Installment>> {
    let installments = sqlx::query_as::<_, Installment>(
        r#"
        SELECT id, sale_id, number, amount_cents, due_date, status
        FROM installments
        WHERE sale_id = ?1
        ORDER BY number
        "#,
    )
    .bind(sale_id)
    .fetch_all(conn)
    .await?;

    Ok(installments)
}

/// Marks installments paid from the front of the schedule while the
/// cumulative scheduled amount fits inside `paid_cents`.
///
/// Payments are applied to the account balance, not to a specific
/// installment; this bookkeeping answers "which installments does the
/// money received so far cover".
pub async fn mark_paid_up_to(
    conn: &mut SqliteConnection,
    sale_id: &str,
    paid_cents: i64,
) -> DbResult<()> {
    let schedule = installments_for_sale(conn, sale_id).await?;

    let mut cumulative = 0i64;
    for installment in &schedule {
        cumulative += installment.amount_cents;
        let covered = cumulative <= paid_cents;

        if covered && installment.status != InstallmentStatus::Paid {
            sqlx::query("UPDATE installments SET status = 'paid' WHERE id = ?1")
                .bind(&installment.id)
                .execute(&mut *conn)
                .await?;
        }

        if !covered {
            break;
        }
    }

    Ok(())
}

/// Flags pending installments past their due date as overdue.
/// Returns the number flagged.
pub async fn mark_overdue(conn: &mut SqliteConnection, now: DateTime<Utc>) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE installments
        SET status = 'overdue'
        WHERE status = 'pending' AND due_date < ?1
        "#,
    )
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}
