//! In-process store.
//!
//! All state sits behind one async mutex, so every trait method, including
//! the multi-step settlement, is trivially atomic. Used by tests and local
//! experiments; not meant for production traffic.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use maru_core::{Money, OrderId, OrderStatus, ProductId, StockKey, TrackingNumber, UserId};

use super::{Catalog, CartStore, OrderStore, StockLedger, UserStore};
use crate::db::RepositoryError;
use crate::models::{
    CartLine, CartLineWrite, NewOrder, NewProduct, NewUser, Order, PaymentConfirmation, Product,
    Settlement, User, UserUpdate,
};

#[derive(Default)]
struct State {
    next_id: i64,
    products: BTreeMap<ProductId, Product>,
    users: BTreeMap<UserId, StoredUser>,
    carts: HashMap<UserId, Vec<CartLine>>,
    orders: BTreeMap<OrderId, Order>,
}

struct StoredUser {
    user: User,
    credential_hash: String,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn stock_mut(&mut self, key: &StockKey) -> Option<&mut u32> {
        self.products
            .get_mut(&key.product_id)?
            .stock
            .iter_mut()
            .find(|s| s.size == key.size)
            .map(|s| &mut s.qty)
    }

    fn stock(&self, key: &StockKey) -> Option<u32> {
        self.products.get(&key.product_id)?.stock_for(&key.size)
    }
}

/// In-memory implementation of every storage trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored credential hash for a user, for assertions in tests.
    pub async fn credential_hash(&self, id: UserId) -> Option<String> {
        let state = self.state.lock().await;
        state.users.get(&id).map(|u| u.credential_hash.clone())
    }

    /// Drop a product and its stock. Cart lines referencing it stay behind.
    pub async fn remove_product(&self, id: ProductId) {
        self.state.lock().await.products.remove(&id);
    }

    /// Reprice a product in place.
    pub async fn set_price(&self, id: ProductId, price: Money) {
        if let Some(product) = self.state.lock().await.products.get_mut(&id) {
            product.price = price;
        }
    }
}

#[async_trait]
impl StockLedger for MemoryStore {
    async fn read_stock(&self, key: &StockKey) -> Result<Option<u32>, RepositoryError> {
        Ok(self.state.lock().await.stock(key))
    }

    async fn write_stock(
        &self,
        key: &StockKey,
        expected: u32,
        new_qty: u32,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let qty = state.stock_mut(key).ok_or(RepositoryError::NotFound)?;
        if *qty != expected {
            return Err(RepositoryError::Conflict(format!(
                "stock for {key} changed from {expected} to {qty}"
            )));
        }
        *qty = new_qty;
        Ok(())
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.products.values().rev().cloned().collect())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut state = self.state.lock().await;
        let id = ProductId::new(state.next_id());
        let created = Product {
            id,
            name: product.name.clone(),
            price: product.price,
            stock: product.stock.clone(),
            category: product.category.clone(),
            images: product.images.clone(),
            description: product.description.clone(),
            is_new: product.is_new,
            created_at: Utc::now(),
        };
        state.products.insert(id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn read_cart(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.carts.get(&user).cloned().unwrap_or_default())
    }

    async fn cart_line(
        &self,
        user: UserId,
        key: &StockKey,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .carts
            .get(&user)
            .and_then(|lines| lines.iter().find(|l| l.key() == *key))
            .cloned())
    }

    async fn write_cart_line(
        &self,
        user: UserId,
        write: &CartLineWrite,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;

        if !state.users.contains_key(&user) {
            return Err(RepositoryError::NotFound);
        }
        if state.stock(&write.key) != Some(write.stock_seen) {
            return Err(RepositoryError::Conflict(format!(
                "stock for {} changed",
                write.key
            )));
        }

        let lines = state.carts.entry(user).or_default();
        let existing = lines.iter_mut().find(|l| l.key() == write.key);
        match (existing, write.expected_qty) {
            (Some(line), Some(expected)) if line.qty == expected => {
                line.qty = write.new_qty;
                Ok(())
            }
            (None, None) => {
                lines.push(CartLine {
                    product_id: write.key.product_id,
                    size: write.key.size.clone(),
                    qty: write.new_qty,
                    added_at: Utc::now(),
                });
                Ok(())
            }
            _ => Err(RepositoryError::Conflict(format!(
                "cart line {} changed",
                write.key
            ))),
        }
    }

    async fn delete_cart_line(
        &self,
        user: UserId,
        key: &StockKey,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        let Some(lines) = state.carts.get_mut(&user) else {
            return Ok(false);
        };
        let before = lines.len();
        lines.retain(|l| l.key() != *key);
        Ok(lines.len() != before)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&order.user_id) {
            return Err(RepositoryError::NotFound);
        }
        if state
            .orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(RepositoryError::Conflict(
                "order number already exists".to_owned(),
            ));
        }
        let id = OrderId::new(state.next_id());
        let created = Order {
            id,
            order_number: order.order_number.clone(),
            order_name: order.order_name.clone(),
            user_id: Some(order.user_id),
            buyer: order.buyer.clone(),
            lines: order.lines.clone(),
            subtotal: order.subtotal,
            shipping: order.shipping,
            amount: order.amount,
            status: OrderStatus::Confirming,
            tracking_number: None,
            settlement: None,
            created_at: Utc::now(),
        };
        state.orders.insert(id, created.clone());
        Ok(created)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.state.lock().await.orders.get(&id).cloned())
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .rev()
            .filter(|o| o.user_id == Some(user))
            .cloned()
            .collect())
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        tracking_number: Option<&TrackingNumber>,
    ) -> Result<(OrderStatus, Order), RepositoryError> {
        let mut state = self.state.lock().await;
        let order = state.orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        let previous = order.status;
        order.status = status;
        order.tracking_number = tracking_number.cloned();
        Ok((previous, order.clone()))
    }

    async fn settle_order(
        &self,
        id: OrderId,
        payment: &PaymentConfirmation,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.state.lock().await;
        let order = state.orders.get(&id).ok_or(RepositoryError::NotFound)?;
        if order.is_settled() {
            return Err(RepositoryError::Conflict(format!(
                "order {} is already settled",
                order.order_number
            )));
        }
        let buyer = order.user_id;
        let lines = order.lines.clone();

        // Check every line before touching any counter.
        for line in &lines {
            let key = line.key();
            let available = state
                .stock(&key)
                .ok_or_else(|| RepositoryError::StockMissing(key.clone()))?;
            if available < line.qty {
                return Err(RepositoryError::OutOfStock {
                    key,
                    requested: line.qty,
                    available,
                });
            }
        }
        for line in &lines {
            if let Some(qty) = state.stock_mut(&line.key()) {
                *qty -= line.qty;
            }
        }

        if let Some(user) = buyer
            && let Some(cart) = state.carts.get_mut(&user)
        {
            let purchased: HashSet<StockKey> = lines.iter().map(|l| l.key()).collect();
            cart.retain(|l| !purchased.contains(&l.key()));
        }

        let order = state.orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        order.settlement = Some(Settlement {
            payment_key: payment.payment_key.clone(),
            method: payment.method.clone(),
            succeeded_at: Utc::now(),
        });
        Ok(order.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.user.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let now = Utc::now();
        let id = UserId::new(state.next_id());
        let created = User {
            id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            address1: String::new(),
            address2: String::new(),
            zipcode: String::new(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                credential_hash: user.credential_hash.clone(),
            },
        );
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).map(|u| u.user.clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.users.values().rev().map(|u| u.user.clone()).collect())
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError> {
        let mut state = self.state.lock().await;
        let stored = state.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        let profile = &update.profile;
        stored.user.name.clone_from(&profile.name);
        stored.user.is_admin = profile.is_admin;
        stored.user.phone.clone_from(&profile.phone);
        stored.user.address1.clone_from(&profile.address1);
        stored.user.address2.clone_from(&profile.address2);
        stored.user.zipcode.clone_from(&profile.zipcode);
        stored.user.updated_at = Utc::now();
        if let Some(hash) = &update.credential_hash {
            stored.credential_hash.clone_from(hash);
        }
        Ok(stored.user.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.carts.remove(&id);
        for order in state.orders.values_mut() {
            if order.user_id == Some(id) {
                order.user_id = None;
            }
        }
        Ok(true)
    }
}
