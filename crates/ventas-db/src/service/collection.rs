//! # Collection Engine
//!
//! Applies payments against the outstanding balance of credit sales.
//!
//! A payment targets the sale's account balance, not a specific
//! installment: money received covers installments from the front of
//! the schedule, and the account status (`partial` / `completed`) is
//! derived from the balance alone. The guards run in one transaction
//! with the atomic balance update, so a concurrent payment that
//! invalidates them surfaces as `Conflict` instead of silently
//! overshooting the total.

use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{payment, sale};
use crate::service::{new_id, with_deadline};
use ventas_core::{
    validation, CoreError, Money, PaymentEntry, PaymentStatus, SaleStatus,
};

/// The collection engine: partial and full payments against pending
/// sale balances.
#[derive(Debug, Clone)]
pub struct CollectionService {
    pool: SqlitePool,
    timeout: Duration,
}

impl CollectionService {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        CollectionService { pool, timeout }
    }

    /// Applies a payment to a sale's account and returns the balance
    /// still outstanding afterwards.
    ///
    /// Rejections (all without writes):
    /// - the sale does not exist (`NotFound`)
    /// - the sale or its account is cancelled (`AlreadyCancelled`)
    /// - nothing is outstanding (`AlreadySettled`)
    /// - the amount exceeds the outstanding balance (`OverPayment`)
    ///
    /// Reaching the total flips the account to `completed` and the
    /// sale to `completed` in the same transaction.
    pub async fn apply_payment(
        &self,
        sale_id: &str,
        amount_cents: i64,
        description: &str,
    ) -> DbResult<Money> {
        let pool = self.pool.clone();
        let sale_id = sale_id.to_string();
        let description = description.to_string();
        with_deadline("apply_payment", self.timeout, async move {
            Self::apply_payment_tx(&pool, &sale_id, amount_cents, &description).await
        })
        .await
    }

    async fn apply_payment_tx(
        pool: &SqlitePool,
        sale_id: &str,
        amount_cents: i64,
        description: &str,
    ) -> DbResult<Money> {
        validation::validate_payment_amount(amount_cents).map_err(CoreError::from)?;

        let mut tx = pool.begin().await?;
        let now = Utc::now();

        let existing = sale::get(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("sale", sale_id))?;

        let account = payment::get_account(&mut tx, &existing.payment_account_id)
            .await?
            .ok_or_else(|| {
                DbError::not_found("payment account", &existing.payment_account_id)
            })?;

        if existing.status == SaleStatus::Cancelled
            || account.status == PaymentStatus::Cancelled
        {
            return Err(CoreError::AlreadyCancelled {
                sale_id: sale_id.to_string(),
            }
            .into());
        }

        let pending_cents = existing.total_cents - account.amount_paid_cents;
        if pending_cents <= 0 {
            return Err(CoreError::AlreadySettled {
                sale_id: sale_id.to_string(),
            }
            .into());
        }
        if amount_cents > pending_cents {
            return Err(CoreError::OverPayment {
                sale_id: sale_id.to_string(),
                pending_cents,
                amount_cents,
            }
            .into());
        }

        // Atomic; zero rows means another payment got between our read
        // and this update
        let rows = payment::apply_to_account(
            &mut tx,
            &account.id,
            amount_cents,
            existing.total_cents,
            now,
        )
        .await?;
        if rows == 0 {
            return Err(CoreError::Conflict {
                entity: "payment account",
                id: account.id.clone(),
            }
            .into());
        }

        payment::insert_entry(
            &mut tx,
            &PaymentEntry {
                id: new_id(),
                account_id: account.id.clone(),
                amount_cents,
                description: description.to_string(),
                created_at: now,
            },
        )
        .await?;

        let new_paid = account.amount_paid_cents + amount_cents;
        payment::mark_paid_up_to(&mut tx, sale_id, new_paid).await?;

        if new_paid >= existing.total_cents && existing.status == SaleStatus::Pending {
            sale::mark_completed(&mut tx, sale_id).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let remaining = Money::from_cents(existing.total_cents - new_paid);
        info!(
            sale_id = %sale_id,
            amount_cents = %amount_cents,
            remaining = %remaining,
            "payment applied"
        );

        Ok(remaining)
    }

    /// The append-only audit trail of every payment received against a
    /// sale, oldest first.
    pub async fn payment_history(&self, sale_id: &str) -> DbResult<Vec<PaymentEntry>> {
        debug!(sale_id = %sale_id, "loading payment history");

        let mut conn = self.pool.acquire().await?;

        let existing = sale::get(&mut conn, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("sale", sale_id))?;

        payment::entries_for_account(&mut conn, &existing.payment_account_id).await
    }

    /// Maintenance sweep: flags pending installments past their due
    /// date as overdue. Returns the number flagged.
    pub async fn mark_overdue_installments(&self) -> DbResult<u64> {
        let pool = self.pool.clone();
        with_deadline("mark_overdue_installments", self.timeout, async move {
            let mut conn = pool.acquire().await?;
            let flagged = payment::mark_overdue(&mut conn, Utc::now()).await?;
            if flagged > 0 {
                info!(flagged = %flagged, "installments marked overdue");
            }
            Ok(flagged)
        })
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
