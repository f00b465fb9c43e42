//! # Domain Types
//!
//! Core domain types of the sales and account-ledger engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Sale ──┬── SaleLine*            Purchase ──┬── PurchaseLine*       │
//! │         │                                   └── SupplierPayment*    │
//! │         └── PaymentAccount ──┬── PaymentEntry*  (audit trail)       │
//! │                              └── Installment*   (credit schedule)   │
//! │                                                                     │
//! │  Return ── ReturnLine*          (created only by cancellation)      │
//! │                                                                     │
//! │  Product / Customer / Supplier / PaymentType   (master data)        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary columns are integer cents (`*_cents: i64`) with `Money`
//! accessor methods; see [`crate::money`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Status Enums
// =============================================================================

/// Whether a customer may be offered credit at all.
///
/// Blocked customers cannot be granted credit sales; cash sales are
/// not restricted by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Blocked,
}

/// The lifecycle state of a sale.
///
/// Created as `Pending` (credit) or `Completed` (cash); the collection
/// engine moves pending sales to `Completed` once fully paid; the
/// cancellation engine moves any non-cancelled sale to `Cancelled`
/// (one-way, terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Completed,
    Cancelled,
}

/// How the sale is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    /// Paid in full at creation time.
    Cash,
    /// Collected over time against an installment schedule.
    Credit,
}

/// The state of a payment account's running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing received yet.
    Pending,
    /// Some money received, balance outstanding.
    Partial,
    /// Fully paid.
    Completed,
    /// Voided by sale cancellation. `amount_paid` is left untouched;
    /// no refund accounting is modeled.
    Cancelled,
}

/// Scope of a return record. The cancellation engine always produces
/// `Total`; `Partial` exists for line-level returns entered manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Partial,
    Total,
}

/// The lifecycle state of a supplier purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Per-installment collection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
}

/// Installment cadence for credit plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Monthly,
}

impl Frequency {
    /// Days between consecutive installments.
    #[inline]
    pub const fn interval_days(&self) -> i64 {
        match self {
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
        }
    }
}

// =============================================================================
// Master Data
// =============================================================================

/// A product held in stock.
///
/// `stock` is mutated only through the inventory ledger operations and
/// never goes below zero at a commit point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,

    /// Current stock level. Invariant: `stock >= 0` at every commit.
    pub stock: i64,

    /// Reorder threshold used by the low-stock listing.
    pub stock_minimum: i64,

    /// Preferred supplier, if any.
    pub supplier_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product is at or below its reorder threshold.
    #[inline]
    pub fn is_below_minimum(&self) -> bool {
        self.stock <= self.stock_minimum
    }
}

/// A customer that sales are made to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,

    /// National identity number. Required before a credit sale may be
    /// granted; optional for cash-only customers.
    pub identity_number: Option<String>,

    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
}

/// A supplier that purchases are recorded against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A payment method catalog entry (cash, card, transfer, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentType {
    pub id: String,
    pub description: String,
}

// =============================================================================
// Payment Account
// =============================================================================

/// The running balance-tracking object for one sale's total obligation.
///
/// The amount due is implicit via the owning sale's `total_cents`; the
/// account only holds what has been received. `amount_paid` never
/// decreases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentAccount {
    pub id: String,

    /// Payment method used, from the `payment_types` catalog.
    pub payment_type_id: String,

    /// Total received so far, in cents. Starts at the sale total for
    /// cash sales and zero for credit sales.
    pub amount_paid_cents: i64,

    pub status: PaymentStatus,

    /// Timestamp of the most recent payment applied.
    pub paid_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl PaymentAccount {
    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }
}

/// An immutable append-only audit entry describing one payment event
/// on a payment account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentEntry {
    pub id: String,
    pub account_id: String,
    /// Amount received in this event.
    pub amount_cents: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentEntry {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// One persisted installment of a credit sale's schedule.
///
/// The schedule is descriptive, not authoritative over collection:
/// payments are applied to the account balance as amounts received,
/// and installment statuses are bookkeeping on top of that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Installment {
    pub id: String,
    pub sale_id: String,
    /// 1-based position within the plan.
    pub number: i64,
    pub amount_cents: i64,
    pub due_date: DateTime<Utc>,
    pub status: InstallmentStatus,
}

impl Installment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale of one or more product lines to a customer, cash or credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub customer_id: String,

    /// The authenticated user who created the sale. The core trusts
    /// this value; role gating happens before the engine is invoked.
    pub created_by: String,

    pub payment_account_id: String,
    pub sale_type: SaleType,
    pub total_cents: i64,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item of a sale.
///
/// Unit price is captured at time of sale and does not track the live
/// product price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl SaleLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Return (Devolución)
// =============================================================================

/// The record produced when a sale is cancelled and its stock restored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Return {
    pub id: String,
    pub sale_id: String,
    pub reason: String,
    pub return_type: ReturnType,
    pub created_at: DateTime<Utc>,
}

/// One restored line of a return, mirroring the sale line quantities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReturnLine {
    pub id: String,
    pub return_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub note: Option<String>,
}

// =============================================================================
// Purchase (Compra)
// =============================================================================

/// An inbound stock transaction from a supplier.
///
/// Stock is incremented immediately and unconditionally when the
/// purchase is recorded, independent of payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    pub supplier_id: String,
    pub total_cents: i64,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item of a purchase, with the subtotal computed at record time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseLine {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    pub subtotal_cents: i64,
}

/// A payment made to a supplier against a purchase.
///
/// The purchase transitions to `Completed` once the sum of its
/// payments reaches the purchase total; that sum is recomputed from
/// scratch on every payment rather than cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SupplierPayment {
    pub id: String,
    pub purchase_id: String,
    pub amount_cents: i64,
    pub method: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Engine Inputs
// =============================================================================

/// One requested line of a new sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineInput {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl SaleLineInput {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// The credit plan requested with a credit sale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreditPlan {
    pub installment_count: u32,
    pub frequency: Frequency,
}

/// One requested line of a new purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLineInput {
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
}

impl PurchaseLineInput {
    /// `quantity * unit_cost`, the persisted line subtotal.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_intervals() {
        assert_eq!(Frequency::Weekly.interval_days(), 7);
        assert_eq!(Frequency::Monthly.interval_days(), 30);
    }

    #[test]
    fn test_line_total() {
        let line = SaleLine {
            id: "l1".to_string(),
            sale_id: "s1".to_string(),
            product_id: "p1".to_string(),
            quantity: 3,
            unit_price_cents: 250,
        };
        assert_eq!(line.line_total().cents(), 750);
    }

    #[test]
    fn test_purchase_line_subtotal() {
        let line = PurchaseLineInput {
            product_id: "p1".to_string(),
            quantity: 4,
            unit_cost_cents: 125,
        };
        assert_eq!(line.subtotal().cents(), 500);
    }

    #[test]
    fn test_below_minimum() {
        let product = Product {
            id: "p1".to_string(),
            name: "Rice 1kg".to_string(),
            description: None,
            category: None,
            stock: 3,
            stock_minimum: 5,
            supplier_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(product.is_below_minimum());
    }
}
