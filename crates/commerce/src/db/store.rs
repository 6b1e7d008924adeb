//! Storage trait implementations for [`PgStore`].

use async_trait::async_trait;

use maru_core::{OrderId, OrderStatus, ProductId, StockKey, TrackingNumber, UserId};

use super::{
    CartRepository, OrderRepository, PgStore, ProductRepository, RepositoryError, UserRepository,
};
use crate::models::{
    CartLine, CartLineWrite, NewOrder, NewProduct, NewUser, Order, PaymentConfirmation, Product,
    User, UserUpdate,
};
use crate::store::{Catalog, CartStore, OrderStore, StockLedger, UserStore};

#[async_trait]
impl StockLedger for PgStore {
    async fn read_stock(&self, key: &StockKey) -> Result<Option<u32>, RepositoryError> {
        ProductRepository::new(self.pool()).read_stock(key).await
    }

    async fn write_stock(
        &self,
        key: &StockKey,
        expected: u32,
        new_qty: u32,
    ) -> Result<(), RepositoryError> {
        ProductRepository::new(self.pool())
            .write_stock(key, expected, new_qty)
            .await
    }
}

#[async_trait]
impl Catalog for PgStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(self.pool()).get(id).await
    }

    async fn products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(self.pool()).get_many(ids).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(self.pool()).list().await
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        ProductRepository::new(self.pool()).create(product).await
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn read_cart(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        CartRepository::new(self.pool()).list(user).await
    }

    async fn cart_line(
        &self,
        user: UserId,
        key: &StockKey,
    ) -> Result<Option<CartLine>, RepositoryError> {
        CartRepository::new(self.pool()).get(user, key).await
    }

    async fn write_cart_line(
        &self,
        user: UserId,
        write: &CartLineWrite,
    ) -> Result<(), RepositoryError> {
        CartRepository::new(self.pool()).write(user, write).await
    }

    async fn delete_cart_line(
        &self,
        user: UserId,
        key: &StockKey,
    ) -> Result<bool, RepositoryError> {
        CartRepository::new(self.pool()).delete(user, key).await
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        OrderRepository::new(self.pool()).create(order).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(self.pool()).get(id).await
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository::new(self.pool()).list_for_user(user).await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        tracking_number: Option<&TrackingNumber>,
    ) -> Result<(OrderStatus, Order), RepositoryError> {
        OrderRepository::new(self.pool())
            .update_status(id, status, tracking_number)
            .await
    }

    async fn settle_order(
        &self,
        id: OrderId,
        payment: &PaymentConfirmation,
    ) -> Result<Order, RepositoryError> {
        OrderRepository::new(self.pool()).settle(id, payment).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        UserRepository::new(self.pool()).create(user).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(self.pool()).get(id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        UserRepository::new(self.pool()).list().await
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError> {
        UserRepository::new(self.pool()).update(id, update).await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        UserRepository::new(self.pool()).delete(id).await
    }
}
