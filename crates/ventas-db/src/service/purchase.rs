//! # Purchase Engine
//!
//! Records inbound stock from suppliers and tracks payments made to
//! them against each purchase.
//!
//! Two deliberate asymmetries with the sale side:
//! - stock is incremented the moment the purchase is recorded,
//!   independent of payment
//! - supplier payments carry no overpayment guard; paying more than
//!   the purchase total is accepted and the purchase simply stays
//!   completed

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{product, purchase};
use crate::service::{new_id, with_deadline};
use ventas_core::{
    validation, CoreError, Money, Purchase, PurchaseLine, PurchaseLineInput, PurchaseStatus,
    SupplierPayment,
};

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// Everything needed to record a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchase {
    pub supplier_id: String,
    pub lines: Vec<PurchaseLineInput>,
}

/// A purchase with its lines, payment history, and derived balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseAccountStatus {
    pub purchase: Purchase,
    pub lines: Vec<PurchaseLine>,
    pub payments: Vec<SupplierPayment>,
    /// Sum of all payments, recomputed from the payment rows.
    pub total_paid_cents: i64,
}

impl PurchaseAccountStatus {
    #[inline]
    pub fn total_paid(&self) -> Money {
        Money::from_cents(self.total_paid_cents)
    }

    /// Balance still owed to the supplier. Never negative even when
    /// payments exceed the total.
    #[inline]
    pub fn outstanding(&self) -> Money {
        Money::from_cents((self.purchase.total_cents - self.total_paid_cents).max(0))
    }
}

// =============================================================================
// Purchase Service
// =============================================================================

/// The supplier purchase and supplier payment engine.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    pool: SqlitePool,
    timeout: Duration,
}

impl PurchaseService {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        PurchaseService { pool, timeout }
    }

    /// Records a purchase atomically and returns its id.
    ///
    /// Every line's stock is incremented in the same transaction; the
    /// purchase starts `pending` until its payments reach the total.
    pub async fn record_purchase(&self, input: NewPurchase) -> DbResult<String> {
        let pool = self.pool.clone();
        with_deadline("record_purchase", self.timeout, async move {
            Self::record_purchase_tx(&pool, input).await
        })
        .await
    }

    async fn record_purchase_tx(pool: &SqlitePool, input: NewPurchase) -> DbResult<String> {
        validation::validate_purchase_lines(&input.lines).map_err(CoreError::from)?;

        let mut tx = pool.begin().await?;
        let now = Utc::now();

        purchase::get_supplier(&mut tx, &input.supplier_id)
            .await?
            .ok_or_else(|| DbError::not_found("supplier", &input.supplier_id))?;

        let mut total = Money::zero();
        for line in &input.lines {
            total += line.subtotal();
        }

        let new_purchase = Purchase {
            id: new_id(),
            supplier_id: input.supplier_id.clone(),
            total_cents: total.cents(),
            status: PurchaseStatus::Pending,
            created_at: now,
        };
        purchase::insert(&mut tx, &new_purchase).await?;

        for line in &input.lines {
            purchase::insert_line(
                &mut tx,
                &PurchaseLine {
                    id: new_id(),
                    purchase_id: new_purchase.id.clone(),
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                    unit_cost_cents: line.unit_cost_cents,
                    subtotal_cents: line.subtotal().cents(),
                },
            )
            .await?;

            // Inbound stock lands immediately, not on payment
            product::release_stock(&mut tx, &line.product_id, line.quantity).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            purchase_id = %new_purchase.id,
            supplier_id = %input.supplier_id,
            total = %total,
            "purchase recorded"
        );

        Ok(new_purchase.id)
    }

    /// Records a payment to the supplier against a purchase and
    /// returns the cumulative amount paid.
    ///
    /// The cumulative sum is recomputed from the payment rows; once it
    /// reaches the purchase total the purchase flips to `completed`.
    /// There is no overpayment guard on this side of the ledger.
    pub async fn apply_supplier_payment(
        &self,
        purchase_id: &str,
        amount_cents: i64,
        method: &str,
    ) -> DbResult<Money> {
        let pool = self.pool.clone();
        let purchase_id = purchase_id.to_string();
        let method = method.to_string();
        with_deadline("apply_supplier_payment", self.timeout, async move {
            Self::apply_supplier_payment_tx(&pool, &purchase_id, amount_cents, &method).await
        })
        .await
    }

    async fn apply_supplier_payment_tx(
        pool: &SqlitePool,
        purchase_id: &str,
        amount_cents: i64,
        method: &str,
    ) -> DbResult<Money> {
        validation::validate_payment_amount(amount_cents).map_err(CoreError::from)?;

        let mut tx = pool.begin().await?;
        let now = Utc::now();

        let existing = purchase::get(&mut tx, purchase_id)
            .await?
            .ok_or_else(|| DbError::not_found("purchase", purchase_id))?;

        purchase::insert_payment(
            &mut tx,
            &SupplierPayment {
                id: new_id(),
                purchase_id: purchase_id.to_string(),
                amount_cents,
                method: method.to_string(),
                created_at: now,
            },
        )
        .await?;

        let paid = purchase::total_paid(&mut tx, purchase_id).await?;
        if paid >= existing.total_cents {
            purchase::mark_completed(&mut tx, purchase_id).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            purchase_id = %purchase_id,
            amount_cents = %amount_cents,
            total_paid_cents = %paid,
            "supplier payment recorded"
        );

        Ok(Money::from_cents(paid))
    }

    /// Loads a purchase with its lines, payments, and derived balance.
    pub async fn account_status(&self, purchase_id: &str) -> DbResult<PurchaseAccountStatus> {
        debug!(purchase_id = %purchase_id, "loading purchase account status");

        let mut conn = self.pool.acquire().await?;

        let existing = purchase::get(&mut conn, purchase_id)
            .await?
            .ok_or_else(|| DbError::not_found("purchase", purchase_id))?;

        let lines = purchase::lines(&mut conn, purchase_id).await?;
        let payments = purchase::payments(&mut conn, purchase_id).await?;
        let total_paid_cents = purchase::total_paid(&mut conn, purchase_id).await?;

        Ok(PurchaseAccountStatus {
            purchase: existing,
            lines,
            payments,
            total_paid_cents,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
