//! # Repositories
//!
//! Row-level database operations, one module per aggregate.
//!
//! ## Transaction Discipline
//! Every function takes `&mut SqliteConnection` instead of the pool,
//! so it participates in whatever transaction the calling service
//! opened. Repositories never begin or commit transactions; mutations
//! here are only visible once the owning engine operation commits.
//!
//! Mutating functions check `rows_affected()` and classify a zero
//! count into a typed domain error rather than silently succeeding -
//! this is what closes the check-then-act races on stock and balances.

pub mod customer;
pub mod payment;
pub mod product;
pub mod purchase;
pub mod sale;
