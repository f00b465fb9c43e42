//! # Customer Credit Gate
//!
//! The eligibility decision for granting a credit sale.
//!
//! The decision itself is pure; the db layer loads the customer row
//! and counts overdue unsettled sales, then delegates here. The gate
//! is advisory to the sale engine - callers must invoke it before
//! granting credit; nothing else enforces it.

use crate::error::CreditDenialReason;
use crate::types::CustomerStatus;

/// Sales older than this many days that are not completed count as a
/// delinquency signal.
pub const DELINQUENCY_WINDOW_DAYS: i64 = 30;

// =============================================================================
// Credit Decision
// =============================================================================

/// The outcome of a credit evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditDecision {
    pub eligible: bool,
    /// Present iff not eligible.
    pub reason: Option<CreditDenialReason>,
}

impl CreditDecision {
    pub const fn eligible() -> Self {
        CreditDecision {
            eligible: true,
            reason: None,
        }
    }

    pub const fn denied(reason: CreditDenialReason) -> Self {
        CreditDecision {
            eligible: false,
            reason: Some(reason),
        }
    }
}

/// Evaluates credit eligibility, failing closed.
///
/// 1. Blocked customers are denied regardless of balances.
/// 2. Any unsettled sale older than [`DELINQUENCY_WINDOW_DAYS`] denies.
/// 3. Otherwise eligible.
pub fn evaluate(status: CustomerStatus, overdue_unsettled_sales: i64) -> CreditDecision {
    if status == CustomerStatus::Blocked {
        return CreditDecision::denied(CreditDenialReason::Blocked);
    }

    if overdue_unsettled_sales > 0 {
        return CreditDecision::denied(CreditDenialReason::DelinquentBalance);
    }

    CreditDecision::eligible()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_customer_denied() {
        let decision = evaluate(CustomerStatus::Blocked, 0);
        assert!(!decision.eligible);
        assert_eq!(decision.reason, Some(CreditDenialReason::Blocked));
    }

    #[test]
    fn test_blocked_wins_over_delinquency() {
        // Blocked is checked first even when balances are also overdue
        let decision = evaluate(CustomerStatus::Blocked, 3);
        assert_eq!(decision.reason, Some(CreditDenialReason::Blocked));
    }

    #[test]
    fn test_delinquent_customer_denied() {
        let decision = evaluate(CustomerStatus::Active, 1);
        assert!(!decision.eligible);
        assert_eq!(decision.reason, Some(CreditDenialReason::DelinquentBalance));
    }

    #[test]
    fn test_active_customer_eligible() {
        let decision = evaluate(CustomerStatus::Active, 0);
        assert!(decision.eligible);
        assert_eq!(decision.reason, None);
    }
}
