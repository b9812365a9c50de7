//! Value objects: equality by value, not identity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Signed amount of money in exact decimal arithmetic.
///
/// Used both for balances (any sign) and for transaction amounts (validated
/// strictly positive by the ledger). Arithmetic is checked: overflow, and any
/// result the decimal would have to round, is an invariant violation rather
/// than a wrap, a panic or a silently inexact value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn negated(self) -> Self {
        Self(-self.0)
    }

    pub fn checked_add(self, other: Money) -> DomainResult<Money> {
        let sum = self
            .0
            .checked_add(other.0)
            .ok_or_else(|| DomainError::invariant(format!("money overflow adding {other} to {self}")))?;
        // Past 28 significant digits `Decimal` drops fractional digits
        // instead of failing; an exact sum keeps every digit of both operands.
        let needed = self.0.normalize().scale().max(other.0.normalize().scale());
        if sum.scale() < needed {
            return Err(DomainError::invariant(format!(
                "adding {other} to {self} exceeds decimal precision"
            )));
        }
        Ok(Money(sum))
    }

    pub fn checked_sub(self, other: Money) -> DomainResult<Money> {
        self.checked_add(other.negated())
    }

    /// Whether the value needs no more than `scale` fractional digits.
    ///
    /// Trailing zeros do not count: `1.500` fits scale 1.
    pub fn fits_scale(&self, scale: u32) -> bool {
        self.0.normalize().scale() <= scale
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
