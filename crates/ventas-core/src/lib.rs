//! # ventas-core: Pure Business Logic
//!
//! This crate is the heart of the sales and account-ledger engine. It
//! contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API boundary (HTTP routing, auth) - external collaborator  │
//! │                           │                                 │
//! │  ┌────────────────────────▼─────────────────────────────┐   │
//! │  │            ★ ventas-core (THIS CRATE) ★              │   │
//! │  │                                                      │   │
//! │  │  types      Money      schedule   credit  validation │   │
//! │  │  Sale,Pago  cents i64  cuotas     gate    rules      │   │
//! │  │                                                      │   │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS  │   │
//! │  └────────────────────────┬─────────────────────────────┘   │
//! │                           │                                 │
//! │  ┌────────────────────────▼─────────────────────────────┐   │
//! │  │          ventas-db (persistence + engines)           │   │
//! │  │      SQLite transactions, repositories, services     │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, PaymentAccount, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Closed set of domain error kinds
//! - [`schedule`] - Installment schedule generation
//! - [`credit`] - Credit eligibility gate decision
//! - [`validation`] - Business input rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input, same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod credit;
pub mod error;
pub mod money;
pub mod schedule;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use credit::{CreditDecision, DELINQUENCY_WINDOW_DAYS};
pub use error::{CoreError, CoreResult, CreditDenialReason, ValidationError};
pub use money::Money;
pub use schedule::ScheduledInstallment;
pub use types::*;
