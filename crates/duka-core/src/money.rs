//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    All prices, totals, tax amounts and payments are i64 cents.         │
//! │    Rounding happens exactly once, explicitly, per calculation.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Tax Directions
//! - `calculate_tax` adds tax on top of an exclusive subtotal
//! - `strip_tax` recovers the pre-tax component of an inclusive total
//!   (`total / (1 + rate)`, rounded half-up in integer math)
//!
//! Both directions are needed because the store can run in either tax mode,
//! but the persisted unit price of a sale item is always tax-exclusive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for change math and deltas
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
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

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates the tax on a tax-exclusive amount.
    ///
    /// ## Implementation
    /// Integer math in i128 to prevent overflow, rounded half-up:
    /// `(amount * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    /// use duka_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(8621);   // 86.21
    /// let rate = TaxRate::from_bps(1600);       // 16%
    ///
    /// assert_eq!(subtotal.calculate_tax(rate).cents(), 1379); // 13.79
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Recovers the pre-tax component of a tax-inclusive amount.
    ///
    /// `total / (1 + rate)` expressed as integer math with half-up rounding:
    /// `(total * 10000 + divisor/2) / divisor` where `divisor = 10000 + bps`.
    ///
    /// ## Round Trip
    /// For any subtotal S, `S.calculate_tax(r)` added back and stripped again
    /// recovers S to within one cent - the rounding point is the only place
    /// precision can move.
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    /// use duka_core::types::TaxRate;
    ///
    /// let total = Money::from_cents(10000);   // 100.00 inclusive
    /// let rate = TaxRate::from_bps(1600);     // 16%
    ///
    /// assert_eq!(total.strip_tax(rate).cents(), 8621); // 86.21 pre-tax
    /// ```
    pub fn strip_tax(&self, rate: TaxRate) -> Money {
        let divisor = 10000 + rate.bps() as i128;
        let ex_cents = (self.0 as i128 * 10000 + divisor / 2) / divisor;
        Money::from_cents(ex_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Receipt formatting (currency symbol,
/// localization) belongs to whatever shell consumes the core.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_tax_calculation_basic() {
        // 10.00 at 10% = 1.00
        let amount = Money::from_cents(1000);
        let rate = TaxRate::from_bps(1000);
        assert_eq!(amount.calculate_tax(rate).cents(), 100);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // 10.00 at 8.25% = 0.825 → 0.83 (half-up)
        let amount = Money::from_cents(1000);
        let rate = TaxRate::from_bps(825);
        assert_eq!(amount.calculate_tax(rate).cents(), 83);
    }

    #[test]
    fn test_strip_tax_sixteen_percent() {
        // 100.00 inclusive at 16% → 86.21 pre-tax, 13.79 tax
        let total = Money::from_cents(10000);
        let rate = TaxRate::from_bps(1600);
        let ex = total.strip_tax(rate);
        assert_eq!(ex.cents(), 8621);
        assert_eq!((total - ex).cents(), 1379);
    }

    #[test]
    fn test_strip_tax_zero_rate() {
        let total = Money::from_cents(4242);
        assert_eq!(total.strip_tax(TaxRate::zero()).cents(), 4242);
    }

    /// Round-trip property: exclusive subtotal → inclusive total → stripped
    /// back recovers the subtotal within one cent.
    #[test]
    fn test_tax_round_trip_within_one_cent() {
        let rates = [0u32, 500, 825, 1600, 2000];
        for bps in rates {
            let rate = TaxRate::from_bps(bps);
            for cents in [1i64, 99, 100, 8621, 12345, 999_999] {
                let subtotal = Money::from_cents(cents);
                let total = subtotal + subtotal.calculate_tax(rate);
                let recovered = total.strip_tax(rate);
                let drift = (recovered.cents() - cents).abs();
                assert!(
                    drift <= 1,
                    "round trip drifted {} cents at rate {} for {}",
                    drift,
                    bps,
                    cents
                );
            }
        }
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    }
}
