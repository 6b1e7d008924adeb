//! Domain models for the shop.
//!
//! These are validated domain objects, separate from database row types.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartChange, CartLine, CartLineWrite, CartTotals, CartView, PricedLine};
pub use order::{BuyerDetails, NewOrder, Order, OrderLine, PaymentConfirmation, Settlement};
pub use product::{NewProduct, Product};
pub use user::{NewUser, ProfileUpdate, User, UserUpdate, UserWithOrders};
