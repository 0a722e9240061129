//! # Money Module
//!
//! Provides the `Money` type for prices, discounted prices and cart totals.
//!
//! ## Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every amount is an integer count of minor units (paise for INR).       │
//! │                                                                         │
//! │    ₹999.00  →  Money(99900)                                             │
//! │    ₹499.50  →  Money(49950)                                             │
//! │                                                                         │
//! │  Discount math floors, both ways:                                       │
//! │    percent_off:   floor((price - discounted) * 100 / price)             │
//! │    apply_percent: floor(price * (100 - pct) / 100)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_major(999);
//! let discounted = Money::from_major(499);
//! assert_eq!(price.percent_off(discounted), Some(50));
//! assert_eq!(price.apply_percent_discount(50).minor(), 49950);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Minor units per major unit. Every supported currency uses two decimals.
const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units.
///
/// Serializes as a bare integer so documents stay readable:
/// `{"price": 99900}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(999).minor(), 99900);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns zero money value.
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

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let line = Money::from_major(499).multiply_quantity(3);
    /// assert_eq!(line, Money::from_major(1497));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Whole percentage saved by selling `self` at `discounted`.
    ///
    /// Floors the result, so ₹999 → ₹500 is 49%, not 50%.
    ///
    /// ## Returns
    /// `None` when the base price is not positive, or the discounted price
    /// is negative or above the base price.
    pub fn percent_off(&self, discounted: Money) -> Option<u32> {
        if !self.is_positive() || discounted.is_negative() || discounted > *self {
            return None;
        }
        // i128 keeps the multiplication safe for very large prices
        let saved = (self.0 - discounted.0) as i128 * 100;
        Some((saved / self.0 as i128) as u32)
    }

    /// Applies a whole-percent discount and floors the result to whole
    /// major units.
    ///
    /// Percentages above 100 are treated as 100.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// // ₹999 at 33% off = ₹669.33, listed as ₹669
    /// assert_eq!(Money::from_major(999).apply_percent_discount(33), Money::from_major(669));
    /// ```
    pub fn apply_percent_discount(&self, pct: u32) -> Money {
        let keep = 100 - pct.min(100) as i128;
        let per_major = MINOR_PER_MAJOR as i128;
        let major = (self.0 as i128 * keep).div_euclid(100 * per_major);
        Money((major * per_major) as i64)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Failure to read a decimal amount typed into a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid amount")]
pub struct ParseMoneyError {
    pub input: String,
}

/// Parses `"999"`, `"999.5"` or `"999.50"` into minor units.
impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoneyError {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) || frac.len() > 2 {
            return Err(err());
        }
        if digits.contains('.') && frac.is_empty() {
            return Err(err());
        }

        let major: i64 = whole.parse().map_err(|_| err())?;
        let minor: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| err())? * 10,
            _ => frac.parse().map_err(|_| err())?,
        };

        let value = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(minor))
            .ok_or_else(err)?;

        Ok(Money(if negative { -value } else { value }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount without a currency symbol: `999.00`.
///
/// ## Note
/// The app's `ConfigState::format_currency` adds the symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        let money = Money::from_minor(49950);
        assert_eq!(money.major(), 499);
        assert_eq!(money.minor_part(), 50);
        assert_eq!(Money::from_major(10).minor(), 1000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(99900).to_string(), "999.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_parse() {
        assert_eq!("999".parse::<Money>().unwrap(), Money::from_major(999));
        assert_eq!("999.5".parse::<Money>().unwrap(), Money::from_minor(99950));
        assert_eq!(" 12.05 ".parse::<Money>().unwrap(), Money::from_minor(1205));
        assert_eq!("-1.00".parse::<Money>().unwrap(), Money::from_minor(-100));

        assert!("".parse::<Money>().is_err());
        assert!("12.".parse::<Money>().is_err());
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
    }

    #[test]
    fn test_percent_off_floors() {
        let price = Money::from_major(999);
        assert_eq!(price.percent_off(Money::from_major(499)), Some(50));
        // 499 / 999 = 49.94..% saved
        assert_eq!(price.percent_off(Money::from_major(500)), Some(49));
        assert_eq!(price.percent_off(price), Some(0));
        assert_eq!(price.percent_off(Money::zero()), Some(100));
    }

    #[test]
    fn test_percent_off_rejects_bad_inputs() {
        let price = Money::from_major(100);
        assert_eq!(price.percent_off(Money::from_major(101)), None);
        assert_eq!(price.percent_off(Money::from_minor(-1)), None);
        assert_eq!(Money::zero().percent_off(Money::zero()), None);
    }

    #[test]
    fn test_apply_percent_discount_floors() {
        assert_eq!(
            Money::from_major(1000).apply_percent_discount(10),
            Money::from_major(900)
        );
        // ₹999 * 0.67 = ₹669.33 → ₹669
        assert_eq!(
            Money::from_major(999).apply_percent_discount(33),
            Money::from_major(669)
        );
        // ₹3.33 * 0.67 = ₹2.23 → ₹2
        assert_eq!(Money::from_minor(333).apply_percent_discount(33).minor(), 200);
        assert_eq!(Money::from_major(50).apply_percent_discount(150), Money::zero());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);
        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);
        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 2000);
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_minor(99900)).unwrap();
        assert_eq!(json, "99900");
        let back: Money = serde_json::from_str("49900").unwrap();
        assert_eq!(back, Money::from_minor(49900));
    }
}
