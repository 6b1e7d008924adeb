//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET    /products                             - Product listing, newest first
//! GET    /products/{id}                        - Product with per-size stock
//!
//! # Accounts
//! POST   /users                                - Sign up
//!
//! # Cart (caller identity is established upstream)
//! GET    /users/{user_id}/cart                 - Priced cart with totals
//! POST   /users/{user_id}/cart/lines           - Apply a quantity delta
//! DELETE /users/{user_id}/cart/lines/{product_id}/{size} - Remove a line
//!
//! # Orders
//! POST   /users/{user_id}/checkout             - Snapshot the cart into an order
//! GET    /users/{user_id}/orders               - Order history
//! GET    /orders/{id}                          - Order detail
//! POST   /orders/{id}/payment                  - Confirm payment, take stock
//!
//! # Admin (authorization is enforced upstream)
//! PUT    /admin/orders/{id}/status             - Set status and tracking number
//! GET    /admin/users                          - Accounts with their orders
//! PUT    /admin/users/{id}                     - Edit profile, role, credential
//! DELETE /admin/users/{id}                     - Delete an account
//! POST   /admin/stock                          - Restock or write off
//! ```

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/products", get(catalog::index))
        .route("/products/{id}", get(catalog::show))
        // Accounts
        .route("/users", post(admin::sign_up))
        // Cart
        .route("/users/{user_id}/cart", get(cart::show))
        .route("/users/{user_id}/cart/lines", post(cart::apply_delta))
        .route(
            "/users/{user_id}/cart/lines/{product_id}/{size}",
            delete(cart::remove_line),
        )
        // Orders
        .route("/users/{user_id}/checkout", post(orders::checkout))
        .route("/users/{user_id}/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/payment", post(orders::confirm_payment))
        // Admin
        .route("/admin/orders/{id}/status", put(admin::update_order_status))
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/admin/stock", post(admin::adjust_stock))
}
