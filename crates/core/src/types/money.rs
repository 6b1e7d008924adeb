//! Integer money.
//!
//! Prices and totals are whole currency units (the shop sells in KRW, which
//! has no minor unit in practice). There is no fractional part.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// Currency symbol used by [`Money`]'s `Display` implementation.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₩";

/// An amount in whole currency units.
///
/// ```
/// use maru_core::Money;
///
/// let subtotal = Money::new(33_000).times(3);
/// assert_eq!(subtotal, Money::new(99_000));
/// assert_eq!(subtotal.to_string(), "₩99000");
/// assert_eq!(subtotal.display_with("$"), "$99000");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    /// The raw amount in currency units.
    #[must_use]
    pub const fn units(self) -> i64 {
        self.0
    }

    /// Price of `qty` items at this unit price, saturating at the bounds
    /// of `i64`. Use [`Money::checked_times`] where overflow must be refused.
    #[must_use]
    pub const fn times(self, qty: u32) -> Self {
        Self(self.0.saturating_mul(qty as i64))
    }

    /// Price of `qty` items, or `None` on overflow.
    #[must_use]
    pub const fn checked_times(self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }

    /// Sum of two amounts, or `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }

    /// Render with an explicit currency prefix, e.g. `"₩4000"`.
    #[must_use]
    pub fn display_with(self, symbol: &str) -> String {
        format!("{symbol}{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DEFAULT_CURRENCY_SYMBOL}{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_sum() {
        let lines = [Money::new(25_000).times(2), Money::new(49_999).times(1)];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total.units(), 99_999);
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let total: Money = core::iter::empty().sum();
        assert_eq!(total, Money::ZERO);
    }

    #[test]
    fn test_overflow_is_checked_or_saturated() {
        let huge = Money::new(i64::MAX / 2 + 1);
        assert_eq!(huge.checked_times(2), None);
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(huge.times(2).units(), i64::MAX);
        assert_eq!((huge + huge).units(), i64::MAX);
        assert_eq!(Money::new(33_000).checked_times(3), Some(Money::new(99_000)));
    }

    #[test]
    fn test_display_has_no_fraction() {
        assert_eq!(Money::new(103_999).to_string(), "₩103999");
        assert_eq!(Money::new(0).display_with("KRW "), "KRW 0");
    }
}
