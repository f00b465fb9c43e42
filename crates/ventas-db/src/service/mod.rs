//! # Services (Transaction Engines)
//!
//! Each service owns one engine of the system and is the only place
//! transactions are opened. Shape of every mutating operation:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  with_deadline(op, timeout, async {                         │
//! │      let mut tx = pool.begin().await?;                      │
//! │      … validate, load, mutate via repositories …            │
//! │      tx.commit().await?;          // all-or-nothing         │
//! │  })                                                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error (or the deadline elapsing, which drops the transaction)
//! rolls everything back; the caller observes only the typed error,
//! never partial state.

use std::future::Future;
use std::time::Duration;

use uuid::Uuid;

use crate::error::DbResult;
use ventas_core::CoreError;

pub mod catalog;
pub mod collection;
pub mod credit;
pub mod purchase;
pub mod sale;

/// Runs `fut` under the configured operation deadline.
///
/// On elapse the future is dropped - sqlx rolls back a dropped
/// transaction - and the caller gets `CoreError::Timeout`.
pub(crate) async fn with_deadline<T, F>(
    operation: &'static str,
    timeout: Duration,
    fut: F,
) -> DbResult<T>
where
    F: Future<Output = DbResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(CoreError::Timeout { operation }.into()),
    }
}

/// Generates a new entity id (UUID v4).
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
