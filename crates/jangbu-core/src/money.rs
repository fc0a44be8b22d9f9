//! # Money Module
//!
//! Provides the `Money` type for monetary values.
//!
//! ## Why Integer Won?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A voucher balances only if debit == credit EXACTLY. A rounding         │
//! │  error of 1 won makes a correct voucher look unbalanced.               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer won (the currency has no minor unit)            │
//! │    1000 + (-1000) == 0, always                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use jangbu_core::money::Money;
//!
//! let unit_price = Money::from_won(1500);
//! let line = unit_price.multiply_quantity(4);
//! assert_eq!(line, Some(Money::from_won(6000)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;
use crate::MAX_AMOUNT;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole won.
///
/// Signed: voucher lines use the sign for the side of the entry
/// (positive = debit, negative = credit).
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  TransactionItem.unit_price × quantity ──► amount ──► tax_amount        │
/// │                                   │                                     │
/// │                                   └──► Transaction.total_amount         │
/// │                                                                         │
/// │  VoucherItem.amount (+ debit / - credit) ──► balance ──► Voucher.amount │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole won.
    ///
    /// ```rust
    /// use jangbu_core::money::Money;
    ///
    /// assert_eq!(Money::from_won(1000).won(), 1000);
    /// ```
    #[inline]
    pub const fn from_won(won: i64) -> Self {
        Money(won)
    }

    /// Returns the value in won.
    #[inline]
    pub const fn won(&self) -> i64 {
        self.0
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
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Absolute value, saturating at `i64::MAX`.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Whether `|self| <= MAX_AMOUNT`.
    #[inline]
    pub const fn is_within_limit(&self) -> bool {
        self.0 >= -MAX_AMOUNT && self.0 <= MAX_AMOUNT
    }

    /// Adds, returning `None` when the result would leave `±MAX_AMOUNT`.
    ///
    /// ```rust
    /// use jangbu_core::money::Money;
    /// use jangbu_core::MAX_AMOUNT;
    ///
    /// assert_eq!(Money::from_won(1).checked_add(Money::from_won(2)), Some(Money::from_won(3)));
    /// assert_eq!(Money::from_won(MAX_AMOUNT).checked_add(Money::from_won(1)), None);
    /// ```
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .filter(Money::is_within_limit)
    }

    /// Sums `amounts`, `None` as soon as a partial sum leaves the range.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Calculates tax at a basis-point rate, rounding half up.
    ///
    /// Integer math: `(amount * bps + 5000) / 10000`, widened to i128 so
    /// large amounts cannot overflow.
    ///
    /// ```rust
    /// use jangbu_core::money::Money;
    /// use jangbu_core::types::TaxRate;
    ///
    /// // 부가세 10% on ₩12,345 = ₩1,234.5 → ₩1,235
    /// let tax = Money::from_won(12_345).calculate_tax(TaxRate::from_bps(1000));
    /// assert_eq!(tax.won(), 1235);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(tax as i64)
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// `None` when the product would leave `±MAX_AMOUNT`.
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Option<Money> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .filter(Money::is_within_limit)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows won with thousands separators, e.g. `₩1,234,000` or `-₩900`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}₩{grouped}")
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_won(0).to_string(), "₩0");
        assert_eq!(Money::from_won(900).to_string(), "₩900");
        assert_eq!(Money::from_won(1000).to_string(), "₩1,000");
        assert_eq!(Money::from_won(1_234_567).to_string(), "₩1,234,567");
        assert_eq!(Money::from_won(-45_000).to_string(), "-₩45,000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_won(1000);
        let b = Money::from_won(300);

        assert_eq!((a + b).won(), 1300);
        assert_eq!((a - b).won(), 700);
        assert_eq!((-a).won(), -1000);
        assert_eq!(a.multiply_quantity(3), Some(Money::from_won(3000)));
    }

    #[test]
    fn test_checked_arithmetic_stops_at_the_limit() {
        let max = Money::from_won(MAX_AMOUNT);
        assert_eq!(max.checked_add(Money::from_won(-1)), Some(Money::from_won(MAX_AMOUNT - 1)));
        assert_eq!(max.checked_add(Money::from_won(1)), None);
        assert_eq!(Money::from_won(i64::MAX).checked_add(Money::from_won(1)), None);
        assert_eq!(Money::from_won(i64::MAX).multiply_quantity(2), None);
        assert_eq!(max.multiply_quantity(1), Some(max));
        assert_eq!(max.multiply_quantity(2), None);
    }

    #[test]
    fn test_checked_sum() {
        let amounts = [100, 250, -50].map(Money::from_won);
        assert_eq!(Money::checked_sum(amounts), Some(Money::from_won(300)));

        let huge = [i64::MAX, i64::MAX, 2].map(Money::from_won);
        assert_eq!(Money::checked_sum(huge), None);
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, -50].into_iter().map(Money::from_won).sum();
        assert_eq!(total.won(), 300);
    }

    #[test]
    fn test_vat_rounds_half_up() {
        let rate = TaxRate::from_bps(1000);
        assert_eq!(Money::from_won(10_000).calculate_tax(rate).won(), 1000);
        assert_eq!(Money::from_won(15).calculate_tax(rate).won(), 2);
        assert_eq!(Money::from_won(14).calculate_tax(rate).won(), 1);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_won(1).is_positive());
        assert!(Money::from_won(-1).is_negative());
        assert_eq!(Money::from_won(-550).abs().won(), 550);
        assert_eq!(Money::from_won(i64::MIN).abs().won(), i64::MAX);
    }
}
