//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maru_core::{Money, ProductId, Stock};

/// A catalog product with its per-size stock.
///
/// Everything except `stock` is fixed once the product is listed; stock
/// counters are owned by the stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: Vec<Stock>,
    pub category: String,
    pub images: Vec<String>,
    pub description: String,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Available quantity for `size`, if the product comes in that size.
    #[must_use]
    pub fn stock_for(&self, size: &str) -> Option<u32> {
        self.stock.iter().find(|s| s.size == size).map(|s| s.qty)
    }

    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Input for listing a new product (catalog seeding).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub stock: Vec<Stock>,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_new: bool,
}
