//! Cart totals and the shipping tier.
//!
//! Totals are derived from the lines handed in, every time. Nothing here
//! caches, and placed orders never come back through this path: their
//! amounts are frozen at checkout.

use serde::{Deserialize, Serialize};

use maru_core::Money;

use crate::error::{CommerceError, Result};
use crate::models::{CartTotals, PricedLine};

/// Flat shipping fee, waived at or above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    pub free_threshold: Money,
    pub flat_fee: Money,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Money::new(100_000),
            flat_fee: Money::new(4_000),
        }
    }
}

impl ShippingPolicy {
    /// Shipping charged for `subtotal`. The threshold itself ships free.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.free_threshold {
            Money::ZERO
        } else {
            self.flat_fee
        }
    }

    /// Totals for a set of priced lines, or `None` if there are none.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Validation` if an amount does not fit in the
    /// money range.
    pub fn totals(&self, lines: &[PricedLine]) -> Result<Option<CartTotals>> {
        if lines.is_empty() {
            return Ok(None);
        }
        let subtotal = lines.iter().try_fold(Money::ZERO, |acc, line| {
            line.unit_price
                .checked_times(line.qty)
                .and_then(|amount| acc.checked_add(amount))
                .ok_or_else(too_large)
        })?;
        let shipping = self.shipping_for(subtotal);
        let total = subtotal.checked_add(shipping).ok_or_else(too_large)?;
        Ok(Some(CartTotals {
            subtotal,
            shipping,
            total,
        }))
    }
}

fn too_large() -> CommerceError {
    CommerceError::validation("subtotal", "exceeds the largest representable amount")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maru_core::ProductId;

    use super::*;

    fn line(price: i64, qty: u32) -> PricedLine {
        PricedLine {
            product_id: ProductId::new(1),
            product_name: "Linen shirt".to_owned(),
            size: "M".to_owned(),
            unit_price: Money::new(price),
            qty,
            available: 10,
            image: None,
        }
    }

    #[test]
    fn test_empty_cart_has_no_totals() {
        assert_eq!(ShippingPolicy::default().totals(&[]).unwrap(), None);
    }

    #[test]
    fn test_just_below_threshold_pays_shipping() {
        let totals = ShippingPolicy::default()
            .totals(&[line(99_999, 1)])
            .unwrap()
            .unwrap();
        assert_eq!(totals.subtotal, Money::new(99_999));
        assert_eq!(totals.shipping, Money::new(4_000));
        assert_eq!(totals.total, Money::new(103_999));
    }

    #[test]
    fn test_threshold_ships_free() {
        let totals = ShippingPolicy::default()
            .totals(&[line(40_000, 2), line(20_000, 1)])
            .unwrap()
            .unwrap();
        assert_eq!(totals.subtotal, Money::new(100_000));
        assert_eq!(totals.shipping, Money::ZERO);
        assert_eq!(totals.total, Money::new(100_000));
    }

    #[test]
    fn test_custom_policy() {
        let policy = ShippingPolicy {
            free_threshold: Money::new(50),
            flat_fee: Money::new(7),
        };
        let totals = policy.totals(&[line(10, 3)]).unwrap().unwrap();
        assert_eq!(totals.shipping, Money::new(7));
        assert_eq!(totals.total, Money::new(37));
    }

    #[test]
    fn test_zero_priced_line_still_has_totals() {
        let totals = ShippingPolicy::default()
            .totals(&[line(0, 1)])
            .unwrap()
            .unwrap();
        assert_eq!(totals.subtotal, Money::ZERO);
        assert_eq!(totals.total, Money::new(4_000));
    }

    #[test]
    fn test_overflowing_subtotal_is_refused() {
        let half = i64::MAX / 2 + 1;
        let err = ShippingPolicy::default()
            .totals(&[line(half, 2)])
            .unwrap_err();
        assert!(matches!(err, CommerceError::Validation { field: "subtotal", .. }));

        let err = ShippingPolicy::default()
            .totals(&[line(half, 1), line(half, 1)])
            .unwrap_err();
        assert!(matches!(err, CommerceError::Validation { .. }));
    }

    #[test]
    fn test_shipping_pushing_past_range_is_refused() {
        let policy = ShippingPolicy {
            free_threshold: Money::new(i64::MAX),
            flat_fee: Money::new(10),
        };
        assert!(policy.totals(&[line(i64::MAX - 5, 1)]).is_err());
    }
}
