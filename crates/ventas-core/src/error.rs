//! # Error Types
//!
//! Domain error types for the ledger engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ventas-core errors (this file)                             │
//! │  ├── CoreError        - Business rule violations            │
//! │  └── ValidationError  - Input validation failures           │
//! │                                                             │
//! │  ventas-db errors (separate crate)                          │
//! │  └── DbError          - Infrastructure failures, wraps      │
//! │                         CoreError transparently             │
//! │                                                             │
//! │  Flow: ValidationError → CoreError → DbError → boundary     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error variants (entity id, offending value)
//! 3. Errors are enum variants, never String
//! 4. The core never encodes transport concerns; the boundary layer
//!    maps these kinds to HTTP/status codes.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain failures.
///
/// This is the closed set of error kinds every engine operation may
/// terminate with. A failing operation rolls back its transaction
/// before propagating one of these; the caller never observes partial
/// state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity is absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input validation failed (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Requested quantity exceeds available stock.
    ///
    /// Raised both by the up-front line check and by the conditional
    /// stock decrement when a concurrent sale won the race.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// The credit gate rejected eligibility.
    #[error("credit denied for customer {customer_id}: {reason}")]
    CreditDenied {
        customer_id: String,
        reason: CreditDenialReason,
    },

    /// The sale's balance is already fully paid.
    #[error("sale {sale_id} is already settled")]
    AlreadySettled { sale_id: String },

    /// A payment would exceed the outstanding balance.
    #[error("payment of {amount_cents} cents exceeds pending balance of {pending_cents} cents on sale {sale_id}")]
    OverPayment {
        sale_id: String,
        pending_cents: i64,
        amount_cents: i64,
    },

    /// Double-cancel attempt.
    #[error("sale {sale_id} is already cancelled")]
    AlreadyCancelled { sale_id: String },

    /// A store operation exceeded its deadline; the transaction was
    /// rolled back.
    #[error("operation {operation} timed out")]
    Timeout { operation: &'static str },

    /// A concurrent mutation was detected by the conditional update
    /// guarding the write.
    #[error("concurrent modification of {entity} {id}")]
    Conflict { entity: &'static str, id: String },
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Credit Denial Reason
// =============================================================================

/// Why the credit gate refused a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditDenialReason {
    /// Customer status is blocked.
    Blocked,
    /// Customer has unsettled sales older than the delinquency window.
    DelinquentBalance,
}

impl std::fmt::Display for CreditDenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreditDenialReason::Blocked => write!(f, "customer is blocked"),
            CreditDenialReason::DelinquentBalance => write!(f, "customer has delinquent balances"),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs, for requests that are malformed
/// regardless of store state.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Value must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: &'static str, value: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative, got {value}")]
    MustNotBeNegative { field: &'static str, value: i64 },

    /// A collection that must not be empty is empty.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
