//! Money Value Object
//!
//! Exact fixed-point amount in the business currency (BRL). Arithmetic never
//! rounds; [`Money::display`] rounds to cents for presentation only.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Monetary amount
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create from an exact decimal amount
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create from cents
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// `self * percentage / 100`, unrounded
    pub fn percent(&self, percentage: Decimal) -> Money {
        Money(self.0 * percentage / dec!(100))
    }

    /// Rounded to cents, half away from zero
    pub fn rounded(&self) -> Decimal {
        self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// pt-BR currency text, e.g. `R$ 1.234,50`
    pub fn display(&self) -> String {
        let rounded = self.rounded();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        let text = format!("{:.2}", rounded.abs());
        let (units, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, digit) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }
        format!("{sign}R$ {grouped},{cents}")
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_is_exact() {
        let m = Money::new(dec!(33.33));
        assert_eq!(m.percent(dec!(15)).amount(), dec!(4.9995));
        assert_eq!(m.percent(dec!(15)).rounded(), dec!(5.00));
    }

    #[test]
    fn test_display_brl() {
        assert_eq!(Money::new(dec!(45)).display(), "R$ 45,00");
        assert_eq!(Money::new(dec!(1234.5)).display(), "R$ 1.234,50");
        assert_eq!(Money::new(dec!(1234567.891)).display(), "R$ 1.234.567,89");
        assert_eq!(Money::new(dec!(0.005)).display(), "R$ 0,01");
        assert_eq!(Money::new(dec!(-5)).display(), "-R$ 5,00");
    }

    #[test]
    fn test_sum_and_sub() {
        let total: Money = [Money::from_cents(3000), Money::from_cents(2000)].iter().sum();
        assert_eq!(total, Money::new(dec!(50)));
        assert_eq!((total - Money::new(dec!(5))).amount(), dec!(45));
    }

    #[test]
    fn test_reads_strings_and_integers() {
        let m: Money = serde_json::from_str("\"49.90\"").unwrap();
        assert_eq!(m.amount(), dec!(49.90));
        let m: Money = serde_json::from_str("30").unwrap();
        assert_eq!(m.amount(), dec!(30));
    }
}
