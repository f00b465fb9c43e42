//! # Customer Repository
//!
//! Row operations for customers, including the delinquency count the
//! credit gate runs on.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ventas_core::{Customer, CustomerStatus};

/// Gets a customer by id.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, first_name, last_name, identity_number, address,
               phone, email, status, created_at
        FROM customers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(customer)
}

/// Inserts a new customer.
pub async fn insert(conn: &mut SqliteConnection, customer: &Customer) -> DbResult<()> {
    debug!(id = %customer.id, "inserting customer");

    sqlx::query(
        r#"
        INSERT INTO customers (
            id, first_name, last_name, identity_number, address,
            phone, email, status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.first_name)
    .bind(&customer.last_name)
    .bind(&customer.identity_number)
    .bind(&customer.address)
    .bind(&customer.phone)
    .bind(&customer.email)
    .bind(customer.status)
    .bind(customer.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Sets a customer's status (block for delinquency / unblock).
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: &str,
    status: CustomerStatus,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE customers SET status = ?2 WHERE id = ?1")
        .bind(id)
        .bind(status)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("customer", id));
    }

    Ok(())
}

/// Counts sales of this customer that are not completed and were
/// created before `cutoff` - the delinquency signal the credit gate
/// fails closed on.
pub async fn count_overdue_unsettled(
    conn: &mut SqliteConnection,
    customer_id: &str,
    cutoff: DateTime<Utc>,
) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM sales
        WHERE customer_id = ?1
          AND status != 'completed'
          AND created_at < ?2
        "#,
    )
    .bind(customer_id)
    .bind(cutoff)
    .fetch_one(conn)
    .await?;

    Ok(count)
}
