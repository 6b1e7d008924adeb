//! Placed orders.
//!
//! An order is a value snapshot of the cart at checkout. Lines and amounts
//! never change after creation; only `status`, `tracking_number` and the
//! settlement record do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maru_core::{
    Email, Money, OrderId, OrderStatus, PhoneNumber, ProductId, StockKey, TrackingNumber, UserId,
};

use super::cart::PricedLine;

/// A cart line frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub size: String,
    /// Unit price at purchase.
    pub unit_price: Money,
    pub qty: u32,
    pub image: Option<String>,
}

impl OrderLine {
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.unit_price.times(self.qty)
    }

    #[must_use]
    pub fn key(&self) -> StockKey {
        StockKey::new(self.product_id, self.size.clone())
    }
}

impl From<&PricedLine> for OrderLine {
    fn from(line: &PricedLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            size: line.size.clone(),
            unit_price: line.unit_price,
            qty: line.qty,
            image: line.image.clone(),
        }
    }
}

/// Contact and delivery fields entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerDetails {
    pub name: String,
    pub email: Email,
    pub phone: PhoneNumber,
    pub address1: String,
    pub address2: String,
    pub zipcode: String,
}

/// Everything needed to persist a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub order_number: String,
    pub order_name: String,
    pub buyer: BuyerDetails,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub amount: Money,
}

/// Payment provider confirmation for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub payment_key: String,
    pub method: String,
}

/// Recorded once payment is confirmed and stock has been taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub payment_key: String,
    pub method: String,
    pub succeeded_at: DateTime<Utc>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub order_name: String,
    /// Cleared if the buyer's account is deleted; the snapshot survives.
    pub user_id: Option<UserId>,
    pub buyer: BuyerDetails,
    pub lines: Vec<OrderLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub amount: Money,
    pub status: OrderStatus,
    pub tracking_number: Option<TrackingNumber>,
    pub settlement: Option<Settlement>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }
}
