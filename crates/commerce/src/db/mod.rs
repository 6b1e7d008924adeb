//! `PostgreSQL` persistence.
//!
//! # Schema: `shop`
//!
//! - `product` - Catalog entries (price in whole currency units)
//! - `stock` - One counter per `(product_id, size)`, never negative
//! - `app_user` - Accounts with an argon2 credential hash
//! - `cart_line` - Pending purchases, one row per `(user_id, product_id, size)`
//! - `customer_order` - Immutable order snapshots (lines as JSONB)
//!
//! # Migrations
//!
//! Migrations live in `crates/commerce/migrations/` and run via:
//! ```bash
//! cargo run -p maru-cli -- migrate
//! ```

pub mod carts;
pub mod orders;
pub mod products;
mod store;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use maru_core::StockKey;

pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation or a lost conditional write.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Settlement would take a stock counter below zero.
    #[error("out of stock for {key}: requested {requested}, available {available}")]
    OutOfStock {
        key: StockKey,
        requested: u32,
        available: u32,
    },

    /// A stock row an order line points at no longer exists.
    #[error("no stock row for {0}")]
    StockMissing(StockKey),
}

/// Map a unique violation to `Conflict`, everything else to `Database`.
pub(crate) fn unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Convert a stored `INTEGER` quantity.
pub(crate) fn qty_from_db(qty: i32) -> Result<u32, RepositoryError> {
    u32::try_from(qty)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative quantity in database: {qty}")))
}

/// Convert a quantity for binding to an `INTEGER` column.
pub(crate) fn qty_to_db(qty: u32) -> Result<i32, RepositoryError> {
    i32::try_from(qty)
        .map_err(|_| RepositoryError::Conflict(format!("quantity {qty} exceeds column range")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// The `PostgreSQL` implementation of [`crate::store::Store`].
///
/// Owns a pool handle and hands out short-lived repositories per call.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}
