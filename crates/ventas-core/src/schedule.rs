//! # Installment Scheduler
//!
//! Generates the due-date sequence for a credit sale's payment plan.
//!
//! The schedule is descriptive, not authoritative over collection:
//! payments are applied to the account balance as amounts actually
//! received. Generation is pure; persistence happens in ventas-db.

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Frequency;

// =============================================================================
// Scheduled Installment
// =============================================================================

/// One entry of a generated schedule, before persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledInstallment {
    /// 1-based position within the plan.
    pub number: u32,
    /// Equal share of the total (integer division, see below).
    pub amount: Money,
    /// Days after sale creation that this installment falls due.
    pub due_offset_days: i64,
}

// =============================================================================
// Generation
// =============================================================================

/// Generates `installment_count` entries numbered 1..=N.
///
/// Each entry carries `amount = total / installment_count` in integer
/// cents. The remainder of an uneven division is NOT redistributed, so
/// the installments may undersum the total; collection is driven by
/// amounts received, so nothing is lost. Due offsets are
/// `number * interval_days` (7 weekly, 30 monthly), measured from sale
/// creation time.
///
/// ## Example
/// ```rust
/// use ventas_core::money::Money;
/// use ventas_core::schedule::generate_schedule;
/// use ventas_core::types::Frequency;
///
/// let plan = generate_schedule(Money::from_cents(30000), 3, Frequency::Monthly).unwrap();
/// assert_eq!(plan.len(), 3);
/// assert_eq!(plan[0].amount.cents(), 10000);
/// assert_eq!(plan[2].due_offset_days, 90);
/// ```
pub fn generate_schedule(
    total: Money,
    installment_count: u32,
    frequency: Frequency,
) -> CoreResult<Vec<ScheduledInstallment>> {
    if installment_count == 0 {
        return Err(ValidationError::MustBePositive {
            field: "installment_count",
            value: 0,
        }
        .into());
    }
    if !total.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "total",
            value: total.cents(),
        }
        .into());
    }

    let amount = total.divide_evenly(installment_count as i64);
    let interval = frequency.interval_days();

    let schedule = (1..=installment_count)
        .map(|number| ScheduledInstallment {
            number,
            amount,
            due_offset_days: number as i64 * interval,
        })
        .collect();

    Ok(schedule)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_schedule() {
        // $300.00 over 3 monthly installments
        let plan = generate_schedule(Money::from_cents(30000), 3, Frequency::Monthly).unwrap();

        assert_eq!(plan.len(), 3);
        for (i, entry) in plan.iter().enumerate() {
            assert_eq!(entry.number, i as u32 + 1);
            assert_eq!(entry.amount.cents(), 10000);
        }
        assert_eq!(plan[0].due_offset_days, 30);
        assert_eq!(plan[1].due_offset_days, 60);
        assert_eq!(plan[2].due_offset_days, 90);
    }

    #[test]
    fn test_weekly_schedule() {
        let plan = generate_schedule(Money::from_cents(10000), 4, Frequency::Weekly).unwrap();

        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0].due_offset_days, 7);
        assert_eq!(plan[3].due_offset_days, 28);
        assert_eq!(plan[1].amount.cents(), 2500);
    }

    #[test]
    fn test_uneven_division_remainder_not_redistributed() {
        // $100.00 over 3 installments: 3333 cents each, 1 cent undersum
        let plan = generate_schedule(Money::from_cents(10000), 3, Frequency::Monthly).unwrap();

        let sum: i64 = plan.iter().map(|e| e.amount.cents()).sum();
        assert_eq!(plan[0].amount.cents(), 3333);
        assert_eq!(sum, 9999);
    }

    #[test]
    fn test_zero_installments_rejected() {
        let err = generate_schedule(Money::from_cents(10000), 0, Frequency::Weekly).unwrap_err();
        assert!(matches!(err, crate::error::CoreError::Validation(_)));
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let err = generate_schedule(Money::zero(), 2, Frequency::Weekly).unwrap_err();
        assert!(matches!(err, crate::error::CoreError::Validation(_)));
    }

    #[test]
    fn test_single_installment() {
        let plan = generate_schedule(Money::from_cents(5000), 1, Frequency::Monthly).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].amount.cents(), 5000);
        assert_eq!(plan[0].due_offset_days, 30);
    }
}
