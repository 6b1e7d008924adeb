//! Checkout, payment settlement and admin status edits.
//!
//! Checkout freezes the priced cart into an order and leaves both stock and
//! cart untouched. Stock is taken only when payment is confirmed, in one
//! atomic store call that also clears the purchased lines from the cart.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use maru_core::{OrderId, OrderStatus, TrackingNumber, UserId};

use super::ShippingPolicy;
use super::cart::price_cart;
use crate::error::{CommerceError, Result};
use crate::models::{BuyerDetails, NewOrder, Order, OrderLine, PaymentConfirmation, PricedLine};
use crate::store::Store;

/// Order lifecycle operations.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    shipping: ShippingPolicy,
}

impl OrderService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, shipping: ShippingPolicy) -> Self {
        Self { store, shipping }
    }

    /// Snapshot the user's cart into a new order in status `Confirming`.
    ///
    /// # Errors
    ///
    /// - `Validation` if a buyer field is blank or the amounts overflow
    /// - `EmptyCart` if there is nothing to buy
    /// - `StockLookupFailed` if a line's product or size no longer exists
    /// - `InsufficientStock` if a line now exceeds current stock
    /// - `NotFound` if the user does not exist
    #[instrument(skip(self, buyer), fields(user = %user))]
    pub async fn checkout(&self, user: UserId, buyer: BuyerDetails) -> Result<Order> {
        validate_buyer(&buyer)?;

        let (lines, unavailable) = price_cart(self.store.as_ref(), user).await?;
        if let Some(gone) = unavailable.first() {
            return Err(CommerceError::StockLookupFailed(gone.key()));
        }
        if let Some(short) = lines.iter().find(|l| l.qty > l.available) {
            return Err(CommerceError::InsufficientStock {
                key: short.key(),
                requested: short.qty,
                available: short.available,
            });
        }
        let totals = self
            .shipping
            .totals(&lines)?
            .ok_or(CommerceError::EmptyCart)?;

        let new_order = NewOrder {
            user_id: user,
            order_number: order_number(),
            order_name: order_name(&lines),
            buyer,
            lines: lines.iter().map(OrderLine::from).collect(),
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            amount: totals.total,
        };
        let order = self
            .store
            .create_order(&new_order)
            .await
            .map_err(|e| CommerceError::from_repo(e, || format!("user {user}")))?;

        info!(order = %order.order_number, amount = %order.amount, "order placed");
        Ok(order)
    }

    /// Record a confirmed payment and take the order's quantities out of
    /// stock. All lines settle or none do.
    ///
    /// # Errors
    ///
    /// - `Validation` if the payment key is blank
    /// - `NotFound` if the order does not exist
    /// - `InsufficientStock` if any line exceeds current stock (nothing applied)
    /// - `StockLookupFailed` if a line's product or size no longer exists
    ///   (nothing applied)
    /// - `Conflict` if the order was already settled
    #[instrument(skip(self, payment), fields(order = %order))]
    pub async fn confirm_payment(
        &self,
        order: OrderId,
        payment: PaymentConfirmation,
    ) -> Result<Order> {
        if payment.payment_key.trim().is_empty() {
            return Err(CommerceError::validation("payment_key", "must not be blank"));
        }

        let settled = self
            .store
            .settle_order(order, &payment)
            .await
            .map_err(|e| CommerceError::from_repo(e, || format!("order {order}")))?;

        info!(
            order_number = %settled.order_number,
            lines = settled.lines.len(),
            "payment settled, stock taken"
        );
        Ok(settled)
    }

    /// Set an order's status and tracking number.
    ///
    /// Any status may move to any other. Blank or `"-"` tracking input clears
    /// the tracking number.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order = %order))]
    pub async fn update_order_status(
        &self,
        order: OrderId,
        status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<Order> {
        let tracking = tracking_number.and_then(TrackingNumber::parse);

        let (previous, updated) = self
            .store
            .update_order_status(order, status, tracking.as_ref())
            .await
            .map_err(|e| CommerceError::from_repo(e, || format!("order {order}")))?;

        let transition = previous.transition(status);
        if transition.is_backwards() {
            warn!(from = %previous, to = %status, "order status moved backwards");
        } else {
            info!(from = %previous, to = %status, "order status updated");
        }
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the order does not exist.
    pub async fn get(&self, order: OrderId) -> Result<Order> {
        self.store
            .get_order(order)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("order {order}")))
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` if storage fails.
    pub async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>> {
        Ok(self.store.orders_for_user(user).await?)
    }
}

fn validate_buyer(buyer: &BuyerDetails) -> Result<()> {
    for (field, value) in [
        ("name", &buyer.name),
        ("address1", &buyer.address1),
        ("zipcode", &buyer.zipcode),
    ] {
        if value.trim().is_empty() {
            return Err(CommerceError::validation(field, "must not be blank"));
        }
    }
    Ok(())
}

/// `YYYYMMDD-` followed by 12 hex digits from a random UUID.
fn order_number() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
    format!("{}-{suffix}", Utc::now().format("%Y%m%d"))
}

/// The first product's name, plus a count of the remaining lines.
fn order_name(lines: &[PricedLine]) -> String {
    match lines {
        [] => String::new(),
        [only] => only.product_name.clone(),
        [first, rest @ ..] => format!("{} and {} more", first.product_name, rest.len()),
    }
}
