//! # Sale Transaction Engine
//!
//! Creates sales (cash or credit) and reverses them on cancellation.
//!
//! ## Create Flow (one transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  validate lines / plan                                      │
//! │       ▼                                                     │
//! │  load customer ── credit? identity + credit gate            │
//! │       ▼                                                     │
//! │  per line: load product, check stock, accumulate total      │
//! │       ▼                                                     │
//! │  create payment account (cash: settled / credit: pending)   │
//! │       ▼                                                     │
//! │  create sale + lines, decrement stock (conditional UPDATE)  │
//! │       ▼                                                     │
//! │  credit? persist installment schedule                       │
//! │       ▼                                                     │
//! │  COMMIT - nothing is observable before this point           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{customer, payment, product, sale};
use crate::service::{new_id, with_deadline};
use ventas_core::{
    credit as credit_gate, schedule, validation, CoreError, CreditPlan, Installment,
    InstallmentStatus, Money, PaymentAccount, PaymentStatus, Return, ReturnLine, ReturnType, Sale,
    SaleLine, SaleLineInput, SaleStatus, SaleType, DELINQUENCY_WINDOW_DAYS,
};

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// Everything needed to create a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub customer_id: String,
    /// Authenticated principal recorded as the sale's creator. Role
    /// gating happened before the engine was invoked.
    pub created_by: String,
    pub sale_type: SaleType,
    pub payment_type_id: String,
    pub lines: Vec<SaleLineInput>,
    /// Required iff `sale_type` is credit.
    pub credit_plan: Option<CreditPlan>,
}

/// A sale with its lines, account, and (for credit) schedule -
/// the read model exposed to the reporting boundary and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDetails {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
    pub account: PaymentAccount,
    pub installments: Vec<Installment>,
}

// =============================================================================
// Sale Service
// =============================================================================

/// The sale transaction and cancellation/reversal engine.
#[derive(Debug, Clone)]
pub struct SaleService {
    pool: SqlitePool,
    timeout: Duration,
}

impl SaleService {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        SaleService { pool, timeout }
    }

    /// Creates a sale atomically and returns its id.
    ///
    /// Cash sales are born settled (account completed, sale
    /// completed); credit sales are born pending with a persisted
    /// installment schedule. Any failure rolls back every effect:
    /// no partial sale, no partial stock change.
    pub async fn create_sale(&self, input: NewSale) -> DbResult<String> {
        let pool = self.pool.clone();
        with_deadline("create_sale", self.timeout, async move {
            Self::create_sale_tx(&pool, input).await
        })
        .await
    }

    async fn create_sale_tx(pool: &SqlitePool, input: NewSale) -> DbResult<String> {
        validation::validate_sale_lines(&input.lines).map_err(CoreError::from)?;

        let plan = match (input.sale_type, input.credit_plan) {
            (SaleType::Credit, None) => {
                return Err(CoreError::Validation(ventas_core::ValidationError::Required {
                    field: "credit_plan",
                })
                .into());
            }
            (SaleType::Credit, Some(plan)) => {
                validation::validate_credit_plan(&plan).map_err(CoreError::from)?;
                Some(plan)
            }
            (SaleType::Cash, _) => None,
        };

        let mut tx = pool.begin().await?;
        let now = Utc::now();

        // 1. Customer must exist
        let customer = customer::get(&mut tx, &input.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("customer", &input.customer_id))?;

        // 2. Credit sales pass the gate first
        if input.sale_type == SaleType::Credit {
            if customer.identity_number.is_none() {
                return Err(CoreError::Validation(ventas_core::ValidationError::Required {
                    field: "identity_number",
                })
                .into());
            }

            let cutoff = now - ChronoDuration::days(DELINQUENCY_WINDOW_DAYS);
            let overdue =
                customer::count_overdue_unsettled(&mut tx, &customer.id, cutoff).await?;
            let decision = credit_gate::evaluate(customer.status, overdue);

            if let Some(reason) = decision.reason {
                return Err(CoreError::CreditDenied {
                    customer_id: customer.id.clone(),
                    reason,
                }
                .into());
            }
        }

        // 3. Check every line against transaction-consistent stock and
        //    accumulate the total. The decrement below re-checks
        //    atomically; this pass exists to report `available` and to
        //    reject before any row is written.
        let mut total = Money::zero();
        for line in &input.lines {
            let prod = product::get(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("product", &line.product_id))?;

            if line.quantity > prod.stock {
                return Err(CoreError::InsufficientStock {
                    product_id: prod.id,
                    available: prod.stock,
                    requested: line.quantity,
                }
                .into());
            }

            total += line.unit_price().multiply_quantity(line.quantity);
        }

        // 4. Payment account: cash is born settled, credit unpaid
        let account = PaymentAccount {
            id: new_id(),
            payment_type_id: input.payment_type_id.clone(),
            amount_paid_cents: match input.sale_type {
                SaleType::Cash => total.cents(),
                SaleType::Credit => 0,
            },
            status: match input.sale_type {
                SaleType::Cash => PaymentStatus::Completed,
                SaleType::Credit => PaymentStatus::Pending,
            },
            paid_at: match input.sale_type {
                SaleType::Cash => Some(now),
                SaleType::Credit => None,
            },
            created_at: now,
        };
        payment::insert_account(&mut tx, &account).await?;

        // 5. Sale record
        let new_sale = Sale {
            id: new_id(),
            customer_id: customer.id.clone(),
            created_by: input.created_by.clone(),
            payment_account_id: account.id.clone(),
            sale_type: input.sale_type,
            total_cents: total.cents(),
            status: match input.sale_type {
                SaleType::Cash => SaleStatus::Completed,
                SaleType::Credit => SaleStatus::Pending,
            },
            created_at: now,
            updated_at: now,
        };
        sale::insert(&mut tx, &new_sale).await?;

        // 6. Lines + stock decrement (same quantity as checked above;
        //    the conditional update is the authority under concurrency)
        for line in &input.lines {
            sale::insert_line(
                &mut tx,
                &SaleLine {
                    id: new_id(),
                    sale_id: new_sale.id.clone(),
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price_cents,
                },
            )
            .await?;

            product::reserve_stock(&mut tx, &line.product_id, line.quantity).await?;
        }

        // 7. Credit: persist the installment schedule
        if let Some(plan) = plan {
            let entries =
                schedule::generate_schedule(total, plan.installment_count, plan.frequency)?;

            for entry in entries {
                payment::insert_installment(
                    &mut tx,
                    &Installment {
                        id: new_id(),
                        sale_id: new_sale.id.clone(),
                        number: entry.number as i64,
                        amount_cents: entry.amount.cents(),
                        due_date: now + ChronoDuration::days(entry.due_offset_days),
                        status: InstallmentStatus::Pending,
                    },
                )
                .await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %new_sale.id,
            sale_type = ?input.sale_type,
            total = %total,
            "sale created"
        );

        Ok(new_sale.id)
    }

    /// Cancels a sale, reversing all of its effects atomically:
    /// stock restored, a total Return recorded, the sale and its
    /// payment account marked cancelled. Fails with `AlreadyCancelled`
    /// on a double cancel and performs no writes in that case.
    ///
    /// `amount_paid` is left untouched; no refund flow is modeled.
    pub async fn cancel_sale(&self, sale_id: &str, reason: &str) -> DbResult<()> {
        let pool = self.pool.clone();
        let sale_id = sale_id.to_string();
        let reason = reason.to_string();
        with_deadline("cancel_sale", self.timeout, async move {
            Self::cancel_sale_tx(&pool, &sale_id, &reason).await
        })
        .await
    }

    async fn cancel_sale_tx(pool: &SqlitePool, sale_id: &str, reason: &str) -> DbResult<()> {
        let mut tx = pool.begin().await?;
        let now = Utc::now();

        let existing = sale::get(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("sale", sale_id))?;

        if existing.status == SaleStatus::Cancelled {
            return Err(CoreError::AlreadyCancelled {
                sale_id: sale_id.to_string(),
            }
            .into());
        }

        // Return record, always total scope
        let ret = Return {
            id: new_id(),
            sale_id: existing.id.clone(),
            reason: reason.to_string(),
            return_type: ReturnType::Total,
            created_at: now,
        };
        sale::insert_return(&mut tx, &ret).await?;

        // Restore stock line by line, mirroring sold quantities
        let lines = sale::lines(&mut tx, sale_id).await?;
        for line in &lines {
            product::release_stock(&mut tx, &line.product_id, line.quantity).await?;

            sale::insert_return_line(
                &mut tx,
                &ReturnLine {
                    id: new_id(),
                    return_id: ret.id.clone(),
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                    note: Some("sale cancellation".to_string()),
                },
            )
            .await?;
        }

        // Conditional transition closes the race with a concurrent cancel
        sale::mark_cancelled(&mut tx, sale_id).await?;
        payment::void_account(&mut tx, &existing.payment_account_id).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(sale_id = %sale_id, reason = %reason, "sale cancelled");
        Ok(())
    }

    /// Loads a sale with its lines, account, and schedule.
    ///
    /// Read-only; this is the surface the reporting boundary consumes.
    pub async fn get_sale(&self, sale_id: &str) -> DbResult<SaleDetails> {
        debug!(sale_id = %sale_id, "loading sale details");

        let mut conn = self.pool.acquire().await?;

        let sale_row = sale::get(&mut conn, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("sale", sale_id))?;

        let lines = sale::lines(&mut conn, sale_id).await?;
        let account = payment::get_account(&mut conn, &sale_row.payment_account_id)
            .await?
            .ok_or_else(|| {
                DbError::not_found("payment account", &sale_row.payment_account_id)
            })?;
        let installments = payment::installments_for_sale(&mut conn, sale_id).await?;

        Ok(SaleDetails {
            sale: sale_row,
            lines,
            account,
            installments,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::service::catalog::{NewCustomer, NewProduct};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, identity: Option<&str>) -> String {
        db.catalog()
            .add_customer(NewCustomer {
                first_name: "Ana".to_string(),
                last_name: "Quispe".to_string(),
                identity_number: identity.map(|s| s.to_string()),
                address: None,
                phone: None,
                email: None,
            })
            .await
            .unwrap()
    }

    async fn seed_product(db: &Database, stock: i64) -> String {
        db.catalog()
            .add_product(NewProduct {
                name: "Rice 1kg".to_string(),
                description: None,
                category: Some("groceries".to_string()),
                stock,
                stock_minimum: 2,
                supplier_id: None,
            })
            .await
            .unwrap()
    }

    fn cash_sale(customer_id: &str, product_id: &str, quantity: i64) -> NewSale {
        NewSale {
            customer_id: customer_id.to_string(),
            created_by: "user-1".to_string(),
            sale_type: SaleType::Cash,
            payment_type_id: "pt-cash".to_string(),
            lines: vec![SaleLineInput {
                product_id: product_id.to_string(),
                quantity,
                unit_price_cents: 5000,
            }],
            credit_plan: None,
        }
    }

    #[tokio::test]
    async fn test_cash_sale_is_born_settled() {
        let db = test_db().await;
        let customer_id = seed_customer(&db, None).await;
        let product_id = seed_product(&db, 10).await;

        let sale_id = db
            .sales()
            .create_sale(cash_sale(&customer_id, &product_id, 2))
            .await
            .unwrap();

        let details = db.sales().get_sale(&sale_id).await.unwrap();
        assert_eq!(details.sale.status, SaleStatus::Completed);
        assert_eq!(details.sale.total_cents, 10000);
        assert_eq!(details.account.status, PaymentStatus::Completed);
        assert_eq!(details.account.amount_paid_cents, 10000);

        let product = db.catalog().get_product(&product_id).await.unwrap();
        assert_eq!(product.stock, 8);
    }

    #[tokio::test]
    async fn test_unknown_customer_rejected() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;

        let err = db
            .sales()
            .create_sale(cash_sale("missing", &product_id, 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(CoreError::NotFound { entity: "customer", .. })
        ));
    }

    #[tokio::test]
    async fn test_insufficient_stock_rejects_and_writes_nothing() {
        let db = test_db().await;
        let customer_id = seed_customer(&db, None).await;
        let product_id = seed_product(&db, 3).await;

        let err = db
            .sales()
            .create_sale(cash_sale(&customer_id, &product_id, 5))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(CoreError::InsufficientStock {
                available: 3,
                requested: 5,
                ..
            })
        ));

        // rollback left stock alone
        let product = db.catalog().get_product(&product_id).await.unwrap();
        assert_eq!(product.stock, 3);
    }

    #[tokio::test]
    async fn test_credit_sale_requires_identity_and_plan() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;

        // No identity number on file
        let anonymous = seed_customer(&db, None).await;
        let mut input = cash_sale(&anonymous, &product_id, 1);
        input.sale_type = SaleType::Credit;
        input.credit_plan = Some(CreditPlan {
            installment_count: 3,
            frequency: ventas_core::Frequency::Monthly,
        });
        let err = db.sales().create_sale(input).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::Validation(_))
        ));

        // Identity present but no plan
        let documented = seed_customer(&db, Some("44556677")).await;
        let mut input = cash_sale(&documented, &product_id, 1);
        input.sale_type = SaleType::Credit;
        input.credit_plan = None;
        let err = db.sales().create_sale(input).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_credit_sale_persists_schedule() {
        let db = test_db().await;
        let customer_id = seed_customer(&db, Some("44556677")).await;
        let product_id = seed_product(&db, 10).await;

        let mut input = cash_sale(&customer_id, &product_id, 6); // 6 × $50 = $300
        input.sale_type = SaleType::Credit;
        input.credit_plan = Some(CreditPlan {
            installment_count: 3,
            frequency: ventas_core::Frequency::Monthly,
        });

        let sale_id = db.sales().create_sale(input).await.unwrap();
        let details = db.sales().get_sale(&sale_id).await.unwrap();

        assert_eq!(details.sale.status, SaleStatus::Pending);
        assert_eq!(details.account.status, PaymentStatus::Pending);
        assert_eq!(details.account.amount_paid_cents, 0);

        assert_eq!(details.installments.len(), 3);
        for (i, installment) in details.installments.iter().enumerate() {
            assert_eq!(installment.number, i as i64 + 1);
            assert_eq!(installment.amount_cents, 10000);
            assert_eq!(installment.status, InstallmentStatus::Pending);
        }
        let gap = details.installments[1].due_date - details.installments[0].due_date;
        assert_eq!(gap.num_days(), 30);
    }

    #[tokio::test]
    async fn test_blocked_customer_denied_credit_but_allowed_cash() {
        let db = test_db().await;
        let customer_id = seed_customer(&db, Some("99887766")).await;
        let product_id = seed_product(&db, 10).await;

        db.catalog().block_customer(&customer_id).await.unwrap();

        let mut credit = cash_sale(&customer_id, &product_id, 1);
        credit.sale_type = SaleType::Credit;
        credit.credit_plan = Some(CreditPlan {
            installment_count: 2,
            frequency: ventas_core::Frequency::Weekly,
        });
        let err = db.sales().create_sale(credit).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::CreditDenied { .. })
        ));

        // Cash path is not gated by status
        db.sales()
            .create_sale(cash_sale(&customer_id, &product_id, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_and_voids_account() {
        let db = test_db().await;
        let customer_id = seed_customer(&db, None).await;
        let product_id = seed_product(&db, 10).await;

        let sale_id = db
            .sales()
            .create_sale(cash_sale(&customer_id, &product_id, 3))
            .await
            .unwrap();
        assert_eq!(db.catalog().get_product(&product_id).await.unwrap().stock, 7);

        db.sales().cancel_sale(&sale_id, "customer returned goods").await.unwrap();

        let product = db.catalog().get_product(&product_id).await.unwrap();
        assert_eq!(product.stock, 10);

        let details = db.sales().get_sale(&sale_id).await.unwrap();
        assert_eq!(details.sale.status, SaleStatus::Cancelled);
        assert_eq!(details.account.status, PaymentStatus::Cancelled);
        // amount_paid untouched: no refund accounting
        assert_eq!(details.account.amount_paid_cents, 15000);
    }

    #[tokio::test]
    async fn test_double_cancel_rejected() {
        let db = test_db().await;
        let customer_id = seed_customer(&db, None).await;
        let product_id = seed_product(&db, 10).await;

        let sale_id = db
            .sales()
            .create_sale(cash_sale(&customer_id, &product_id, 1))
            .await
            .unwrap();

        db.sales().cancel_sale(&sale_id, "first").await.unwrap();
        let err = db.sales().cancel_sale(&sale_id, "second").await.unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(CoreError::AlreadyCancelled { .. })
        ));

        // No double stock restore
        assert_eq!(db.catalog().get_product(&product_id).await.unwrap().stock, 10);
    }
}
