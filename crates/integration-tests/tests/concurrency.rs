//! Simultaneous quantity changes against one stock counter.
//!
//! Within one process the keyed locks serialize calls, so the loser sees
//! the winner's line and fails `InsufficientStock`. Two service instances
//! with separate lock tables stand in for two processes; there the store's
//! conditional write decides and the loser fails `Conflict`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use maru_commerce::CommerceError;
use maru_commerce::models::CartChange;
use maru_commerce::services::{ShippingPolicy, Shop};
use maru_commerce::store::Store;
use maru_integration_tests::{TestShop, key};

fn lost_race(err: &CommerceError) -> bool {
    matches!(
        err,
        CommerceError::InsufficientStock { .. } | CommerceError::Conflict(_)
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_increments_on_last_unit_one_wins() {
    for _ in 0..50 {
        let t = TestShop::new();
        let shirt = t.product("shirt", 10_000, &[("M", 1)]).await;
        let user = t.buyer("kim@example.com").await.id;
        let m = key(&shirt, "M");

        let first = {
            let carts = t.shop.carts.clone();
            let m = m.clone();
            tokio::spawn(async move { carts.apply_delta(user, &m, 1).await })
        };
        let second = {
            let carts = t.shop.carts.clone();
            let m = m.clone();
            tokio::spawn(async move { carts.apply_delta(user, &m, 1).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one increment must succeed");
        for result in &results {
            match result {
                Ok(change) => assert_eq!(*change, CartChange::Updated { qty: 1 }),
                Err(err) => assert!(lost_race(err), "unexpected error: {err}"),
            }
        }

        let cart = t.shop.carts.view(user).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines.first().map(|l| l.qty), Some(1));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_separate_lock_tables_fall_back_to_store_conflict() {
    for _ in 0..50 {
        let t = TestShop::new();
        let other_process = {
            let store: Arc<dyn Store> = t.store.clone();
            Shop::new(store, ShippingPolicy::default())
        };
        let shirt = t.product("shirt", 10_000, &[("M", 1)]).await;
        let user = t.buyer("kim@example.com").await.id;
        let m = key(&shirt, "M");

        let first = {
            let carts = t.shop.carts.clone();
            let m = m.clone();
            tokio::spawn(async move { carts.apply_delta(user, &m, 1).await })
        };
        let second = {
            let carts = other_process.carts.clone();
            let m = m.clone();
            tokio::spawn(async move { carts.apply_delta(user, &m, 1).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(lost_race)
        );

        let cart = t.shop.carts.view(user).await.unwrap();
        assert_eq!(cart.lines.first().map(|l| l.qty), Some(1));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_buyers_never_overfill_their_own_lines() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 10_000, &[("M", 3)]).await;
    let m = key(&shirt, "M");

    let mut handles = Vec::new();
    for i in 0..8 {
        let user = t.buyer(&format!("buyer{i}@example.com")).await.id;
        for _ in 0..5 {
            let carts = t.shop.carts.clone();
            let m = m.clone();
            handles.push(tokio::spawn(async move {
                let _ = carts.apply_delta(user, &m, 1).await;
                user
            }));
        }
    }

    for handle in handles {
        let user = handle.await.unwrap();
        let cart = t.shop.carts.view(user).await.unwrap();
        for line in cart.lines {
            assert!(line.qty <= 3);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_settlements_never_oversell() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 10_000, &[("M", 1)]).await;
    let m = key(&shirt, "M");

    let mut orders = Vec::new();
    for i in 0..4 {
        let email = format!("buyer{i}@example.com");
        let buyer = t.buyer(&email).await;
        t.shop.carts.apply_delta(buyer.id, &m, 1).await.unwrap();
        let order = t
            .shop
            .orders
            .checkout(buyer.id, maru_integration_tests::buyer_details(&email))
            .await
            .unwrap();
        orders.push(order.id);
    }

    let handles: Vec<_> = orders
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            let service = t.shop.orders.clone();
            tokio::spawn(async move {
                service
                    .confirm_payment(
                        id,
                        maru_commerce::models::PaymentConfirmation {
                            payment_key: format!("pay-{i}"),
                            method: "card".to_owned(),
                        },
                    )
                    .await
            })
        })
        .collect();

    let mut settled = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => settled += 1,
            Err(err) => assert!(
                matches!(err, CommerceError::InsufficientStock { .. }),
                "unexpected error: {err}"
            ),
        }
    }
    assert_eq!(settled, 1);
    assert_eq!(t.shop.stock.available(&m).await.unwrap(), 0);
}
