//! # Money Module
//!
//! Monetary values as integer cents.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale total = cab.price × qty + Σ accessory.price × qty                 │
//! │                                                                         │
//! │  With f64:   1999.99 × 3 = 5999.969999999999   ❌                       │
//! │  With cents: 199999 × 3  = 599997              ✅                       │
//! │                                                                         │
//! │  Totals must equal the sum of line subtotals exactly, so every price,  │
//! │  subtotal and total in the system is an i64 count of cents.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Arithmetic is checked: a product or sum outside `i64` yields `None`
//! instead of wrapping.
//!
//! ## Usage
//! ```rust
//! use cabshop_core::money::Money;
//!
//! let price = Money::from_cents(1_250_000); // $12,500.00
//! let subtotal = price.multiply_quantity(2);
//! assert_eq!(subtotal.map(|m| m.cents()), Some(2_500_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// A monetary value in the smallest currency unit.
///
/// Signed so that corrections and negative adjustments remain representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (dollars, pesos, ...).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the fractional portion, always 0-99.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity to get a line subtotal.
    /// `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use cabshop_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(4_500);
    /// assert_eq!(unit_price.multiply_quantity(3), Some(Money::from_cents(13_500)));
    /// assert_eq!(Money::from_cents(i64::MAX).multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds every value, or `None` as soon as the running sum overflows.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .try_fold(Money::zero(), |total, value| total.checked_add(value))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(a.multiply_quantity(3), Some(Money::from_cents(3000)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(20_000_000).multiply_quantity(500_000_000_000), None);
    }

    #[test]
    fn test_sum_of_subtotals() {
        let lines = [
            Money::from_cents(150_000).multiply_quantity(2).unwrap(),
            Money::from_cents(2_500).multiply_quantity(4).unwrap(),
            Money::from_cents(999),
        ];
        assert_eq!(
            Money::checked_sum(lines),
            Some(Money::from_cents(300_000 + 10_000 + 999))
        );
        assert_eq!(Money::checked_sum(Vec::<Money>::new()), Some(Money::zero()));
    }

    #[test]
    fn test_sum_overflow() {
        let half = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(Money::checked_sum([half, half]), None);
    }

    #[test]
    fn test_zero_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::from_cents(1).is_zero());
        assert!(Money::from_cents(-1).is_negative());
    }
}
