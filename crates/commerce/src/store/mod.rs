//! Storage boundary.
//!
//! The services never touch a database directly. They depend on these
//! traits, which [`crate::db::PgStore`] implements on `PostgreSQL` and
//! [`MemoryStore`] implements in process.
//!
//! Conditional writes (`write_stock`, `write_cart_line`, `settle_order`)
//! must be atomic in the implementation: either the whole write applies
//! against the state the caller observed, or nothing changes and the call
//! returns `RepositoryError::Conflict` (or `OutOfStock` for settlement).

mod memory;

use async_trait::async_trait;

use maru_core::{OrderId, OrderStatus, ProductId, StockKey, TrackingNumber, UserId};

pub use memory::MemoryStore;

use crate::db::RepositoryError;
use crate::models::{
    CartLine, CartLineWrite, NewOrder, NewProduct, NewUser, Order, PaymentConfirmation, Product,
    User, UserUpdate,
};

/// Authoritative per-size stock counters.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Current quantity for `key`, or `None` if the product/size does not exist.
    async fn read_stock(&self, key: &StockKey) -> Result<Option<u32>, RepositoryError>;

    /// Set the counter to `new_qty` if it still reads `expected`.
    ///
    /// Fails with `Conflict` if the counter changed, `NotFound` if it is gone.
    async fn write_stock(
        &self,
        key: &StockKey,
        expected: u32,
        new_qty: u32,
    ) -> Result<(), RepositoryError>;
}

/// Read access to the product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products for `ids`; unknown ids are skipped.
    async fn products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// All products, newest first.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError>;
}

/// Per-user cart persistence, one line per `(product_id, size)`.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// All lines in the user's cart, oldest first.
    async fn read_cart(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError>;

    async fn cart_line(
        &self,
        user: UserId,
        key: &StockKey,
    ) -> Result<Option<CartLine>, RepositoryError>;

    /// Apply a conditional write; see [`CartLineWrite`].
    async fn write_cart_line(
        &self,
        user: UserId,
        write: &CartLineWrite,
    ) -> Result<(), RepositoryError>;

    /// Remove a line. Returns whether a line was present.
    async fn delete_cart_line(&self, user: UserId, key: &StockKey)
    -> Result<bool, RepositoryError>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an immutable snapshot in status `Confirming`.
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RepositoryError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// A user's orders, newest first.
    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Overwrite status and tracking. Returns the previous status with the
    /// updated order.
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        tracking_number: Option<&TrackingNumber>,
    ) -> Result<(OrderStatus, Order), RepositoryError>;

    /// Record payment, take every line's quantity out of stock, and drop the
    /// purchased lines from the buyer's cart, all in one atomic step.
    ///
    /// Fails with `OutOfStock` (nothing applied) if any counter would go
    /// below zero, `StockMissing` (nothing applied) if a line's stock row is
    /// gone, `Conflict` if the order is already settled.
    async fn settle_order(
        &self,
        id: OrderId,
        payment: &PaymentConfirmation,
    ) -> Result<Order, RepositoryError>;
}

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// All accounts, newest first.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// Fails with `NotFound` if the account does not exist.
    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError>;

    /// Returns whether an account was deleted.
    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError>;
}

/// Everything the services need from storage.
pub trait Store: StockLedger + Catalog + CartStore + OrderStore + UserStore {}

impl<T> Store for T where T: StockLedger + Catalog + CartStore + OrderStore + UserStore {}
