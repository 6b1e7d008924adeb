//! Integration test harness for the Maru shop.
//!
//! [`TestShop`] wires the commerce services over a fresh
//! [`MemoryStore`] and exposes the same services through the API router.
//!
//! ```rust,ignore
//! let t = TestShop::new();
//! let shirt = t.product("shirt", 33_000, &[("M", 2)]).await;
//! let buyer = t.buyer("kim@example.com").await;
//! t.shop.carts.apply_delta(buyer.id, &key(&shirt, "M"), 1).await?;
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::Router;

use maru_api::state::AppState;
use maru_commerce::models::{BuyerDetails, NewProduct, Product, User};
use maru_commerce::services::{ShippingPolicy, Shop};
use maru_commerce::store::{MemoryStore, Store};
use maru_core::{Email, Money, PhoneNumber, Stock, StockKey};

/// Credential used for every test account.
pub const TEST_CREDENTIAL: &str = "hunter22";

/// Services over an in-memory store.
pub struct TestShop {
    pub store: Arc<MemoryStore>,
    pub shop: Shop,
}

impl Default for TestShop {
    fn default() -> Self {
        Self::new()
    }
}

impl TestShop {
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        let shop = Shop::new(dyn_store, ShippingPolicy::default());
        Self { store, shop }
    }

    /// List a product with the given `(size, qty)` stock.
    pub async fn product(&self, name: &str, price: i64, sizes: &[(&str, u32)]) -> Product {
        self.shop
            .catalog
            .create(&NewProduct {
                name: name.to_owned(),
                price: Money::new(price),
                stock: sizes
                    .iter()
                    .map(|(size, qty)| Stock {
                        size: (*size).to_owned(),
                        qty: *qty,
                    })
                    .collect(),
                category: "tops".to_owned(),
                images: vec![format!("/images/{name}.jpg")],
                description: String::new(),
                is_new: true,
            })
            .await
            .unwrap()
    }

    /// Sign up a buyer with [`TEST_CREDENTIAL`].
    pub async fn buyer(&self, email: &str) -> User {
        self.shop
            .accounts
            .sign_up(
                Email::parse(email).unwrap(),
                "Kim Buyer",
                None,
                TEST_CREDENTIAL,
            )
            .await
            .unwrap()
    }

    /// The API router over the same services.
    #[must_use]
    pub fn app(&self) -> Router {
        maru_api::app(AppState::new(self.shop.clone(), "₩"))
    }
}

/// Stock key for one size of `product`.
#[must_use]
pub fn key(product: &Product, size: &str) -> StockKey {
    StockKey::new(product.id, size)
}

/// Valid checkout details for `email`.
#[must_use]
pub fn buyer_details(email: &str) -> BuyerDetails {
    BuyerDetails {
        name: "Kim Buyer".to_owned(),
        email: Email::parse(email).unwrap(),
        phone: PhoneNumber::parse("010-1234-5678").unwrap(),
        address1: "12 Seongsu-ro".to_owned(),
        address2: "3F".to_owned(),
        zipcode: "04780".to_owned(),
    }
}
