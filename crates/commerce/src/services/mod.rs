//! Business services.
//!
//! Each service holds an `Arc<dyn Store>` and is cheap to clone. [`Shop`]
//! wires the full set against one store so the stock lock table is shared.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod locks;
pub mod orders;
pub mod stock;
pub mod totals;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

pub use accounts::AccountService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use locks::KeyedLocks;
pub use orders::OrderService;
pub use stock::StockService;
pub use totals::ShippingPolicy;

use crate::store::Store;

/// All services over one store.
#[derive(Clone)]
pub struct Shop {
    pub catalog: CatalogService,
    pub stock: StockService,
    pub carts: CartService,
    pub orders: OrderService,
    pub accounts: AccountService,
}

impl Shop {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, shipping: ShippingPolicy) -> Self {
        let locks = KeyedLocks::new();
        Self {
            catalog: CatalogService::new(Arc::clone(&store)),
            stock: StockService::new(Arc::clone(&store), locks.clone()),
            carts: CartService::new(Arc::clone(&store), locks, shipping),
            orders: OrderService::new(Arc::clone(&store), shipping),
            accounts: AccountService::new(store),
        }
    }
}
