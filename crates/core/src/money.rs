//! Monetary amounts in minor currency units.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// An amount of money in paise (1/100 INR).
///
/// Serialized as the bare integer, the same way prices travel elsewhere in the
/// domain as "price in smallest currency unit".
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(paise: u64) -> Self {
        Self(paise)
    }

    /// Build from whole rupees plus paise, e.g. `from_major_minor(254, 70)`.
    pub const fn from_major_minor(rupees: u64, paise: u64) -> Self {
        Self(rupees * 100 + paise)
    }

    /// Convert a decimal rupee amount (as typed into a form) to paise,
    /// rounding to the nearest paisa.
    pub fn from_decimal(rupees: f64) -> DomainResult<Self> {
        if !rupees.is_finite() || rupees < 0.0 {
            return Err(DomainError::validation(format!(
                "amount must be a non-negative number, got {rupees}"
            )));
        }
        let paise = (rupees * 100.0).round();
        if paise > u64::MAX as f64 {
            return Err(DomainError::validation("amount is too large"));
        }
        Ok(Self(paise as u64))
    }

    pub fn minor(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiply by a quantity (e.g. unit price x ordered quantity).
    pub fn times(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INR {}.{:02}", self.0 / 100, self.0 % 100)
    }
}
