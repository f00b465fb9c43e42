//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  In floating point:  0.1 + 0.2 = 0.30000000000000004  ❌    │
//! │                                                             │
//! │  Repeated partial-payment subtraction drifts the balance.   │
//! │                                                             │
//! │  OUR SOLUTION: integer cents                                │
//! │    30000 - 15000 - 15000 = 0, exactly, every time           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every monetary value in the system (sale totals, account balances,
//! installment amounts, purchase costs) flows through this type. The
//! database stores `*_cents` integer columns; only the presentation
//! layer converts to a two-place decimal string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: comparisons like `paid - total` stay well-defined
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use ventas_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use ventas_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(5000); // $50.00
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 10000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Splits this amount into `parts` equal shares, discarding the
    /// remainder.
    ///
    /// Used by the installment scheduler. The shares may undersum the
    /// original total when it does not divide evenly; the remainder is
    /// NOT redistributed (collection is driven by amounts actually
    /// received, so nothing is lost).
    ///
    /// ## Example
    /// ```rust
    /// use ventas_core::money::Money;
    ///
    /// let total = Money::from_cents(1000);
    /// assert_eq!(total.divide_evenly(3).cents(), 333);
    /// ```
    #[inline]
    pub const fn divide_evenly(&self, parts: i64) -> Self {
        Money(self.0 / parts)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug/log formatting. User-facing rendering happens at the boundary.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_balance_never_drifts() {
        // $300.00 collected as two $150.00 partial payments
        let total = Money::from_cents(30000);
        let mut paid = Money::zero();
        paid += Money::from_cents(15000);
        paid += Money::from_cents(15000);
        assert_eq!(total - paid, Money::zero());
    }

    /// Documents the intentional precision loss of even division:
    /// $10.00 / 3 = $3.33 per share, 1 cent is NOT redistributed.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten_dollars = Money::from_cents(1000);
        let share = ten_dollars.divide_evenly(3);
        assert_eq!(share.cents(), 333);

        let reconstructed = share.multiply_quantity(3);
        assert_eq!(reconstructed.cents(), 999);
        assert_eq!((ten_dollars - reconstructed).cents(), 1);
    }
}
