//! Checkout snapshots, payment settlement and admin status edits.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use maru_commerce::CommerceError;
use maru_commerce::models::PaymentConfirmation;
use maru_core::{Money, OrderStatus};
use maru_integration_tests::{TestShop, buyer_details, key};

fn payment(key: &str) -> PaymentConfirmation {
    PaymentConfirmation {
        payment_key: key.to_owned(),
        method: "card".to_owned(),
    }
}

#[tokio::test]
async fn test_order_is_a_snapshot_of_the_cart() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 5)]).await;
    let cap = t.product("cap", 12_000, &[("F", 5)]).await;
    let buyer = t.buyer("kim@example.com").await;

    t.shop
        .carts
        .apply_delta(buyer.id, &key(&shirt, "M"), 2)
        .await
        .unwrap();
    t.shop
        .carts
        .apply_delta(buyer.id, &key(&cap, "F"), 1)
        .await
        .unwrap();

    let placed = t
        .shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap();
    assert_eq!(placed.status, OrderStatus::Confirming);
    assert_eq!(placed.order_name, "shirt and 1 more");
    assert_eq!(placed.subtotal, Money::new(78_000));
    assert_eq!(placed.shipping, Money::new(4_000));
    assert_eq!(placed.amount, Money::new(82_000));

    // Mutate everything the order was derived from.
    t.shop
        .carts
        .apply_delta(buyer.id, &key(&shirt, "M"), 3)
        .await
        .unwrap();
    t.shop
        .carts
        .apply_delta(buyer.id, &key(&cap, "F"), -1)
        .await
        .unwrap();
    t.store.set_price(shirt.id, Money::new(1_000)).await;

    let reread = t.shop.orders.get(placed.id).await.unwrap();
    assert_eq!(reread, placed);

    let live = t.shop.carts.totals(buyer.id).await.unwrap().unwrap();
    assert_eq!(live.subtotal, Money::new(5_000));
}

#[tokio::test]
async fn test_checkout_leaves_stock_and_cart_alone() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 2)]).await;
    let buyer = t.buyer("kim@example.com").await;
    let m = key(&shirt, "M");

    t.shop.carts.apply_delta(buyer.id, &m, 2).await.unwrap();
    t.shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap();

    assert_eq!(t.shop.stock.available(&m).await.unwrap(), 2);
    assert_eq!(t.shop.carts.view(buyer.id).await.unwrap().lines.len(), 1);
}

#[tokio::test]
async fn test_payment_takes_stock_and_clears_purchased_lines() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 2), ("L", 4)]).await;
    let buyer = t.buyer("kim@example.com").await;
    let m = key(&shirt, "M");
    let l = key(&shirt, "L");

    t.shop.carts.apply_delta(buyer.id, &m, 2).await.unwrap();
    let order = t
        .shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap();

    // Added after checkout, so not part of the order.
    t.shop.carts.apply_delta(buyer.id, &l, 1).await.unwrap();

    let settled = t
        .shop
        .orders
        .confirm_payment(order.id, payment("pay_123"))
        .await
        .unwrap();
    let settlement = settled.settlement.unwrap();
    assert_eq!(settlement.payment_key, "pay_123");
    assert_eq!(settlement.method, "card");

    assert_eq!(t.shop.stock.available(&m).await.unwrap(), 0);
    assert_eq!(t.shop.stock.available(&l).await.unwrap(), 4);

    let cart = t.shop.carts.view(buyer.id).await.unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].size, "L");

    let err = t
        .shop
        .orders
        .confirm_payment(order.id, payment("pay_124"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::Conflict(_)));
    assert_eq!(t.shop.stock.available(&l).await.unwrap(), 4);
}

#[tokio::test]
async fn test_settlement_is_all_or_nothing() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 3)]).await;
    let cap = t.product("cap", 12_000, &[("F", 1)]).await;
    let buyer = t.buyer("kim@example.com").await;
    let m = key(&shirt, "M");
    let f = key(&cap, "F");

    t.shop.carts.apply_delta(buyer.id, &m, 2).await.unwrap();
    t.shop.carts.apply_delta(buyer.id, &f, 1).await.unwrap();
    let order = t
        .shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap();

    // The last cap is written off before payment arrives.
    t.shop.stock.adjust(&f, -1).await.unwrap();

    let err = t
        .shop
        .orders
        .confirm_payment(order.id, payment("pay_1"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::InsufficientStock { .. }));

    assert_eq!(t.shop.stock.available(&m).await.unwrap(), 3);
    assert!(!t.shop.orders.get(order.id).await.unwrap().is_settled());
    assert_eq!(t.shop.carts.view(buyer.id).await.unwrap().lines.len(), 2);
}

#[tokio::test]
async fn test_settlement_with_vanished_product_fails_lookup() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 3)]).await;
    let cap = t.product("cap", 12_000, &[("F", 1)]).await;
    let buyer = t.buyer("kim@example.com").await;
    let m = key(&shirt, "M");

    t.shop.carts.apply_delta(buyer.id, &m, 2).await.unwrap();
    t.shop
        .carts
        .apply_delta(buyer.id, &key(&cap, "F"), 1)
        .await
        .unwrap();
    let order = t
        .shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap();

    t.store.remove_product(cap.id).await;

    let err = t
        .shop
        .orders
        .confirm_payment(order.id, payment("pay_1"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::StockLookupFailed(k) if k == key(&cap, "F")));

    assert_eq!(t.shop.stock.available(&m).await.unwrap(), 3);
    assert!(!t.shop.orders.get(order.id).await.unwrap().is_settled());
}

#[tokio::test]
async fn test_checkout_refusals() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 2)]).await;
    let buyer = t.buyer("kim@example.com").await;

    let err = t
        .shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::EmptyCart));

    t.shop
        .carts
        .apply_delta(buyer.id, &key(&shirt, "M"), 2)
        .await
        .unwrap();
    t.shop.stock.adjust(&key(&shirt, "M"), -1).await.unwrap();
    let err = t
        .shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::InsufficientStock {
            requested: 2,
            available: 1,
            ..
        }
    ));

    t.store.remove_product(shirt.id).await;
    let err = t
        .shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::StockLookupFailed(_)));
}

#[tokio::test]
async fn test_checkout_refuses_amounts_past_money_range() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 2)]).await;
    let buyer = t.buyer("kim@example.com").await;
    t.shop
        .carts
        .apply_delta(buyer.id, &key(&shirt, "M"), 2)
        .await
        .unwrap();
    t.store.set_price(shirt.id, Money::new(i64::MAX / 2 + 1)).await;

    let err = t
        .shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::Validation { .. }));
    assert!(t.shop.orders.orders_for_user(buyer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_status_moves_are_unconstrained() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 2)]).await;
    let buyer = t.buyer("kim@example.com").await;
    t.shop
        .carts
        .apply_delta(buyer.id, &key(&shirt, "M"), 1)
        .await
        .unwrap();
    let order = t
        .shop
        .orders
        .checkout(buyer.id, buyer_details("kim@example.com"))
        .await
        .unwrap();

    let shipped = t
        .shop
        .orders
        .update_order_status(order.id, OrderStatus::Shipped, Some(" 6892-1100-2231 "))
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(
        shipped.tracking_number.as_ref().map(|t| t.as_str()),
        Some("6892-1100-2231")
    );

    let back = t
        .shop
        .orders
        .update_order_status(order.id, OrderStatus::Confirming, Some("-"))
        .await
        .unwrap();
    assert_eq!(back.status, OrderStatus::Confirming);
    assert!(back.tracking_number.is_none());
    assert_eq!(back.lines, order.lines);
    assert_eq!(back.amount, order.amount);
}

#[tokio::test]
async fn test_order_history_newest_first() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 10_000, &[("M", 10)]).await;
    let buyer = t.buyer("kim@example.com").await;

    let mut placed = Vec::new();
    for _ in 0..3 {
        t.shop
            .carts
            .apply_delta(buyer.id, &key(&shirt, "M"), 1)
            .await
            .unwrap();
        placed.push(
            t.shop
                .orders
                .checkout(buyer.id, buyer_details("kim@example.com"))
                .await
                .unwrap()
                .id,
        );
    }

    let history: Vec<_> = t
        .shop
        .orders
        .orders_for_user(buyer.id)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    placed.reverse();
    assert_eq!(history, placed);
}
