//! Size-level stock.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Available quantity of one size of a product.
///
/// Sizes are unique per product; the quantity can never go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub size: String,
    pub qty: u32,
}

/// Identifies one stock counter: a product and one of its sizes.
///
/// Cart lines are keyed the same way, so a cart holds at most one line per
/// `StockKey`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub product_id: ProductId,
    pub size: String,
}

impl StockKey {
    #[must_use]
    pub fn new(product_id: ProductId, size: impl Into<String>) -> Self {
        Self {
            product_id,
            size: size.into(),
        }
    }
}

impl fmt::Display for StockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product_id, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(StockKey::new(ProductId::new(3), "M").to_string(), "3/M");
    }
}
