//! Cart lines and the derived cart view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maru_core::{Money, ProductId, StockKey};

/// One product/size entry in a user's pending cart.
///
/// A cart holds at most one line per `(product_id, size)`; `qty` is always
/// positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub size: String,
    pub qty: u32,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    #[must_use]
    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.size.clone())
    }
}

/// A conditional cart-line write.
///
/// The store applies it only if the line still holds `expected_qty`
/// (`None` meaning "no line yet") and the stock counter still reads
/// `stock_seen`. Either mismatch is a lost race and must surface as
/// `RepositoryError::Conflict`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineWrite {
    pub key: StockKey,
    pub expected_qty: Option<u32>,
    pub new_qty: u32,
    pub stock_seen: u32,
}

/// Outcome of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CartChange {
    /// The line now holds `qty` units.
    Updated { qty: u32 },
    /// The change brought the line to zero or below, so it was removed.
    Removed,
}

/// A cart line joined with its product's current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub size: String,
    pub unit_price: Money,
    pub qty: u32,
    /// Stock for this size at the time the cart was read.
    pub available: u32,
    pub image: Option<String>,
}

impl PricedLine {
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.unit_price.times(self.qty)
    }

    #[must_use]
    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.size.clone())
    }
}

/// Derived amounts for a non-empty cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

/// What a buyer sees on the cart page.
///
/// `totals` is `None` when there is nothing purchasable in the cart, which
/// is different from a cart that costs zero.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<PricedLine>,
    /// Lines whose product or size no longer exists.
    pub unavailable: Vec<CartLine>,
    pub totals: Option<CartTotals>,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.unavailable.is_empty()
    }
}
