//! Cart quantity changes against live stock, and the derived totals.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use maru_commerce::CommerceError;
use maru_commerce::models::CartChange;
use maru_core::{Money, StockKey};
use maru_integration_tests::{TestShop, key};

// =============================================================================
// Quantity Changes
// =============================================================================

#[tokio::test]
async fn test_increment_up_to_stock_then_refuse() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 2)]).await;
    let buyer = t.buyer("kim@example.com").await;
    let m = key(&shirt, "M");

    assert_eq!(
        t.shop.carts.apply_delta(buyer.id, &m, 1).await.unwrap(),
        CartChange::Updated { qty: 1 }
    );
    assert_eq!(
        t.shop.carts.apply_delta(buyer.id, &m, 1).await.unwrap(),
        CartChange::Updated { qty: 2 }
    );
    let err = t.shop.carts.apply_delta(buyer.id, &m, 1).await.unwrap_err();
    assert!(matches!(
        err,
        CommerceError::InsufficientStock {
            requested: 3,
            available: 2,
            ..
        }
    ));

    let cart = t.shop.carts.view(buyer.id).await.unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].qty, 2);
}

#[tokio::test]
async fn test_quantity_never_exceeds_stock_for_any_delta() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 10_000, &[("S", 3)]).await;
    let buyer = t.buyer("kim@example.com").await;
    let s = key(&shirt, "S");

    for delta in [5, 2, -1, 4, 1, 1, -10, 3, 1] {
        let _ = t.shop.carts.apply_delta(buyer.id, &s, delta).await;
        let cart = t.shop.carts.view(buyer.id).await.unwrap();
        for line in &cart.lines {
            assert!(line.qty > 0, "non-positive quantity persisted");
            assert!(line.qty <= 3, "quantity {} exceeds stock", line.qty);
        }
    }
}

#[tokio::test]
async fn test_decrement_to_zero_or_below_removes_line() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 10_000, &[("S", 5)]).await;
    let buyer = t.buyer("kim@example.com").await;
    let s = key(&shirt, "S");

    t.shop.carts.apply_delta(buyer.id, &s, 3).await.unwrap();
    assert_eq!(
        t.shop.carts.apply_delta(buyer.id, &s, -7).await.unwrap(),
        CartChange::Removed
    );
    assert!(t.shop.carts.view(buyer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sold_out_and_missing_size() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 10_000, &[("S", 0), ("M", 1)]).await;
    let buyer = t.buyer("kim@example.com").await;

    let err = t
        .shop
        .carts
        .apply_delta(buyer.id, &key(&shirt, "S"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::SoldOut(_)));

    let err = t
        .shop
        .carts
        .apply_delta(buyer.id, &key(&shirt, "XL"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::StockLookupFailed(_)));

    let ghost = StockKey::new(maru_core::ProductId::new(9_999), "M");
    let err = t.shop.carts.apply_delta(buyer.id, &ghost, 1).await.unwrap_err();
    assert!(matches!(err, CommerceError::StockLookupFailed(_)));
}

#[tokio::test]
async fn test_restock_lets_buyer_add_more() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 10_000, &[("M", 1)]).await;
    let buyer = t.buyer("kim@example.com").await;
    let m = key(&shirt, "M");

    t.shop.carts.apply_delta(buyer.id, &m, 1).await.unwrap();
    assert!(t.shop.carts.apply_delta(buyer.id, &m, 1).await.is_err());

    assert_eq!(t.shop.stock.adjust(&m, 4).await.unwrap(), 5);
    assert_eq!(
        t.shop.carts.apply_delta(buyer.id, &m, 1).await.unwrap(),
        CartChange::Updated { qty: 2 }
    );
}

// =============================================================================
// Totals
// =============================================================================

#[tokio::test]
async fn test_shipping_tier_just_below_threshold() {
    let t = TestShop::new();
    let item = t.product("odd", 99_999, &[("F", 1)]).await;
    let buyer = t.buyer("kim@example.com").await;
    t.shop
        .carts
        .apply_delta(buyer.id, &key(&item, "F"), 1)
        .await
        .unwrap();

    let totals = t.shop.carts.totals(buyer.id).await.unwrap().unwrap();
    assert_eq!(totals.subtotal, Money::new(99_999));
    assert_eq!(totals.shipping, Money::new(4_000));
    assert_eq!(totals.total, Money::new(103_999));
}

#[tokio::test]
async fn test_shipping_free_at_threshold() {
    let t = TestShop::new();
    let item = t.product("quarter", 25_000, &[("F", 10)]).await;
    let buyer = t.buyer("kim@example.com").await;
    t.shop
        .carts
        .apply_delta(buyer.id, &key(&item, "F"), 4)
        .await
        .unwrap();

    let totals = t.shop.carts.totals(buyer.id).await.unwrap().unwrap();
    assert_eq!(totals.subtotal, Money::new(100_000));
    assert_eq!(totals.shipping, Money::ZERO);
    assert_eq!(totals.total, Money::new(100_000));
}

#[tokio::test]
async fn test_subtotal_sums_lines_across_products() {
    let t = TestShop::new();
    let shirt = t.product("shirt", 33_000, &[("M", 5)]).await;
    let cap = t.product("cap", 12_500, &[("F", 5)]).await;
    let buyer = t.buyer("kim@example.com").await;

    t.shop
        .carts
        .apply_delta(buyer.id, &key(&shirt, "M"), 2)
        .await
        .unwrap();
    t.shop
        .carts
        .apply_delta(buyer.id, &key(&cap, "F"), 3)
        .await
        .unwrap();

    let cart = t.shop.carts.view(buyer.id).await.unwrap();
    let totals = cart.totals.unwrap();
    assert_eq!(totals.subtotal, Money::new(33_000 * 2 + 12_500 * 3));
    assert_eq!(totals.total, totals.subtotal + totals.shipping);
}

#[tokio::test]
async fn test_empty_cart_has_no_totals() {
    let t = TestShop::new();
    let buyer = t.buyer("kim@example.com").await;
    assert!(t.shop.carts.totals(buyer.id).await.unwrap().is_none());
}
