//! # Credit Gate
//!
//! Read-only eligibility check: may this customer be granted a credit
//! sale right now?
//!
//! The sale engine re-runs the same decision inside its transaction;
//! this service exists so the counter can ask before building a cart.

use chrono::{Duration as ChronoDuration, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::customer;
use ventas_core::{credit, CreditDecision, DELINQUENCY_WINDOW_DAYS};

/// Customer credit eligibility checks.
#[derive(Debug, Clone)]
pub struct CreditService {
    pool: SqlitePool,
}

impl CreditService {
    pub fn new(pool: SqlitePool) -> Self {
        CreditService { pool }
    }

    /// Evaluates credit eligibility for a customer.
    ///
    /// Denies when the customer is blocked, or when they have
    /// unsettled sales older than the delinquency window. A decision
    /// is advisory: only the sale engine's in-transaction re-check is
    /// authoritative.
    pub async fn evaluate(&self, customer_id: &str) -> DbResult<CreditDecision> {
        let mut conn = self.pool.acquire().await?;

        let existing = customer::get(&mut conn, customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("customer", customer_id))?;

        let cutoff = Utc::now() - ChronoDuration::days(DELINQUENCY_WINDOW_DAYS);
        let overdue = customer::count_overdue_unsettled(&mut conn, customer_id, cutoff).await?;

        let decision = credit::evaluate(existing.status, overdue);
        debug!(
            customer_id = %customer_id,
            eligible = %decision.eligible,
            overdue_sales = %overdue,
            "credit evaluated"
        );

        Ok(decision)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
