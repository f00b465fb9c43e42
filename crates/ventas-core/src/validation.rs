//! # Validation Module
//!
//! Input validation for engine operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Layer 1: API boundary (external collaborator)              │
//! │  ├── Request shape, auth, role checks                       │
//! │           │                                                 │
//! │           ▼                                                 │
//! │  Layer 2: THIS MODULE - business input rules                │
//! │  ├── Positive quantities, non-negative prices               │
//! │  └── Non-empty line lists, plan sanity                      │
//! │           │                                                 │
//! │           ▼                                                 │
//! │  Layer 3: Database (SQLite)                                 │
//! │  ├── NOT NULL / CHECK(stock >= 0) / FK constraints          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{CreditPlan, PurchaseLineInput, SaleLineInput};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Sale Inputs
// =============================================================================

/// Validates the line items of a new sale.
///
/// ## Rules
/// - At least one line
/// - Quantity strictly positive per line
/// - Unit price non-negative per line (free promotional items are
///   legal; negative prices are not)
pub fn validate_sale_lines(lines: &[SaleLineInput]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Empty { field: "lines" });
    }

    for line in lines {
        if line.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity",
                value: line.quantity,
            });
        }
        if line.unit_price_cents < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "unit_price_cents",
                value: line.unit_price_cents,
            });
        }
    }

    Ok(())
}

/// Validates a requested credit plan.
pub fn validate_credit_plan(plan: &CreditPlan) -> ValidationResult<()> {
    if plan.installment_count == 0 {
        return Err(ValidationError::MustBePositive {
            field: "installment_count",
            value: 0,
        });
    }

    Ok(())
}

// =============================================================================
// Purchase Inputs
// =============================================================================

/// Validates the line items of a new purchase.
pub fn validate_purchase_lines(lines: &[PurchaseLineInput]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Empty { field: "lines" });
    }

    for line in lines {
        if line.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity",
                value: line.quantity,
            });
        }
        if line.unit_cost_cents < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "unit_cost_cents",
                value: line.unit_cost_cents,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Payment Inputs
// =============================================================================

/// Validates an incoming payment amount (collections and supplier
/// payments alike). Overpayment against a balance is a business rule
/// checked by the collection engine, not here.
pub fn validate_payment_amount(amount_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount_cents",
            value: amount_cents,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Frequency;

    fn line(quantity: i64, unit_price_cents: i64) -> SaleLineInput {
        SaleLineInput {
            product_id: "p1".to_string(),
            quantity,
            unit_price_cents,
        }
    }

    #[test]
    fn test_empty_lines_rejected() {
        assert!(validate_sale_lines(&[]).is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(validate_sale_lines(&[line(0, 100)]).is_err());
        assert!(validate_sale_lines(&[line(-2, 100)]).is_err());
    }

    #[test]
    fn test_negative_price_rejected_zero_allowed() {
        assert!(validate_sale_lines(&[line(1, -1)]).is_err());
        assert!(validate_sale_lines(&[line(1, 0)]).is_ok());
    }

    #[test]
    fn test_valid_lines_accepted() {
        assert!(validate_sale_lines(&[line(2, 5000), line(1, 100)]).is_ok());
    }

    #[test]
    fn test_credit_plan() {
        let plan = CreditPlan {
            installment_count: 0,
            frequency: Frequency::Weekly,
        };
        assert!(validate_credit_plan(&plan).is_err());

        let plan = CreditPlan {
            installment_count: 3,
            frequency: Frequency::Monthly,
        };
        assert!(validate_credit_plan(&plan).is_ok());
    }

    #[test]
    fn test_payment_amount() {
        assert!(validate_payment_amount(0).is_err());
        assert!(validate_payment_amount(-100).is_err());
        assert!(validate_payment_amount(1).is_ok());
    }
}
