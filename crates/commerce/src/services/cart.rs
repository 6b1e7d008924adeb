//! Cart mutation and the cart view.
//!
//! [`CartService::apply_delta`] is the only path that changes a line's
//! quantity. For a given `(product_id, size)` it holds the key's lock across
//! the stock read and the conditional write, and the write itself is
//! rejected by the store if either the line or the stock counter moved.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use maru_core::{StockKey, UserId};

use super::{KeyedLocks, ShippingPolicy};
use crate::error::{CommerceError, Result};
use crate::models::{CartChange, CartLine, CartLineWrite, CartTotals, CartView, PricedLine};
use crate::store::Store;

/// Cart operations for one shop.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn Store>,
    locks: KeyedLocks,
    shipping: ShippingPolicy,
}

impl CartService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, locks: KeyedLocks, shipping: ShippingPolicy) -> Self {
        Self {
            store,
            locks,
            shipping,
        }
    }

    #[must_use]
    pub const fn shipping(&self) -> ShippingPolicy {
        self.shipping
    }

    /// Change the quantity of one cart line by `delta`.
    ///
    /// A result of zero or less removes the line. Otherwise the new
    /// quantity must fit within current stock.
    ///
    /// # Errors
    ///
    /// - `InvalidDelta` if `delta` is zero
    /// - `StockLookupFailed` if the product or size no longer exists
    /// - `SoldOut` if nothing is left of this size
    /// - `InsufficientStock` if the new quantity exceeds what is available
    /// - `Conflict` if a concurrent writer changed the line or the stock
    #[instrument(skip(self), fields(user = %user, key = %key))]
    pub async fn apply_delta(&self, user: UserId, key: &StockKey, delta: i64) -> Result<CartChange> {
        if delta == 0 {
            return Err(CommerceError::InvalidDelta);
        }
        let _guard = self.locks.lock(key).await;

        let available = self
            .store
            .read_stock(key)
            .await?
            .ok_or_else(|| CommerceError::StockLookupFailed(key.clone()))?;

        let line = self.store.cart_line(user, key).await?;
        let current = line.as_ref().map_or(0, |l| l.qty);
        let requested = i64::from(current).saturating_add(delta);

        if requested <= 0 {
            if line.is_some() {
                self.store.delete_cart_line(user, key).await?;
            }
            debug!("line removed");
            return Ok(CartChange::Removed);
        }

        if available == 0 {
            return Err(CommerceError::SoldOut(key.clone()));
        }

        let requested = match u32::try_from(requested) {
            Ok(qty) if qty <= available => qty,
            _ => {
                return Err(CommerceError::InsufficientStock {
                    key: key.clone(),
                    requested: u32::try_from(requested).unwrap_or(u32::MAX),
                    available,
                });
            }
        };

        let write = CartLineWrite {
            key: key.clone(),
            expected_qty: line.map(|l| l.qty),
            new_qty: requested,
            stock_seen: available,
        };
        self.store
            .write_cart_line(user, &write)
            .await
            .map_err(|e| {
                let err = CommerceError::from_repo(e, || format!("user {user}"));
                if matches!(err, CommerceError::Conflict(_)) {
                    warn!(%err, "cart write lost a race");
                }
                err
            })?;

        debug!(qty = requested, "line updated");
        Ok(CartChange::Updated { qty: requested })
    }

    /// Remove a line without any stock check. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if storage fails.
    #[instrument(skip(self), fields(user = %user, key = %key))]
    pub async fn remove_line(&self, user: UserId, key: &StockKey) -> Result<bool> {
        Ok(self.store.delete_cart_line(user, key).await?)
    }

    /// The cart priced at current catalog prices, with totals.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Validation` if the totals overflow the money
    /// range, `CommerceError::Repository` if storage fails.
    pub async fn view(&self, user: UserId) -> Result<CartView> {
        let (lines, unavailable) = price_cart(self.store.as_ref(), user).await?;
        let totals = self.shipping.totals(&lines)?;
        Ok(CartView {
            lines,
            unavailable,
            totals,
        })
    }

    /// Just the derived totals; `None` for an empty cart.
    ///
    /// # Errors
    ///
    /// Same as [`CartService::view`].
    pub async fn totals(&self, user: UserId) -> Result<Option<CartTotals>> {
        Ok(self.view(user).await?.totals)
    }
}

/// Join a user's cart with the catalog.
///
/// Returns priced lines and, separately, lines whose product or size no
/// longer exists.
pub(crate) async fn price_cart(
    store: &dyn Store,
    user: UserId,
) -> Result<(Vec<PricedLine>, Vec<CartLine>)> {
    let cart = store.read_cart(user).await?;
    if cart.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut ids: Vec<_> = cart.iter().map(|l| l.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let products: HashMap<_, _> = store
        .products(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut priced = Vec::with_capacity(cart.len());
    let mut unavailable = Vec::new();
    for line in cart {
        let Some(product) = products.get(&line.product_id) else {
            unavailable.push(line);
            continue;
        };
        let Some(available) = product.stock_for(&line.size) else {
            unavailable.push(line);
            continue;
        };
        priced.push(PricedLine {
            product_id: product.id,
            product_name: product.name.clone(),
            size: line.size,
            unit_price: product.price,
            qty: line.qty,
            available,
            image: product.first_image().map(str::to_owned),
        });
    }
    Ok((priced, unavailable))
}
