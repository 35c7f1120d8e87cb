//! Monetary amounts in decimal currency units.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// An amount in decimal currency units (e.g. `10.50`).
///
/// The hosting platform's checkout API speaks minor units (cents); conversion
/// happens only at that boundary via [`Money::to_minor_units`]. Serialized as a
/// JSON number, matching the stored documents.
///
/// Arithmetic is checked: results outside the decimal range are reported as
/// [`DomainError::InvariantViolation`] instead of panicking.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole currency units.
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Build from minor units (`1050` → `10.50`).
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Amount × quantity.
    pub fn times(&self, quantity: u32) -> DomainResult<Money> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Money)
            .ok_or_else(|| overflow(format!("{} × {quantity}", self.0)))
    }

    pub fn checked_add(&self, rhs: Money) -> DomainResult<Money> {
        self.0
            .checked_add(rhs.0)
            .map(Money)
            .ok_or_else(|| overflow(format!("{} + {}", self.0, rhs.0)))
    }

    pub fn checked_sub(&self, rhs: Money) -> DomainResult<Money> {
        self.0
            .checked_sub(rhs.0)
            .map(Money)
            .ok_or_else(|| overflow(format!("{} - {}", self.0, rhs.0)))
    }

    /// Sum of `amounts`, failing on the first overflow.
    pub fn try_sum<I>(amounts: I) -> DomainResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Convert to the platform's minor-unit convention: ×100, truncated toward zero.
    pub fn to_minor_units(&self) -> DomainResult<i64> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.trunc().to_i64())
            .ok_or_else(|| DomainError::invariant(format!("amount {} out of range", self.0)))
    }
}

fn overflow(expr: String) -> DomainError {
    DomainError::invariant(format!("amount overflow: {expr}"))
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}
