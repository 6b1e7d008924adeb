//! Fixtures for service tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use maru_core::{Email, Money, Stock};

use crate::models::{NewProduct, NewUser, Product, User};
use crate::store::{Catalog, MemoryStore, UserStore};

pub async fn product(store: &MemoryStore, name: &str, price: i64, sizes: &[(&str, u32)]) -> Product {
    store
        .create_product(&NewProduct {
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
            is_new: false,
        })
        .await
        .unwrap()
}

pub async fn user(store: &MemoryStore, email: &str) -> User {
    store
        .create_user(&NewUser {
            email: Email::parse(email).unwrap(),
            name: "Buyer".to_owned(),
            phone: None,
            credential_hash: "not-a-real-hash".to_owned(),
        })
        .await
        .unwrap()
}

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}
