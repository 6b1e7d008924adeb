//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use std::sync::Arc;

use maru_commerce::config::ShopConfig;
use maru_commerce::db::{self, PgStore};
use maru_commerce::services::Shop;

/// Load configuration, connect, and assemble the shop services.
///
/// # Errors
///
/// Returns an error if configuration is missing or the database is unreachable.
pub async fn connect() -> Result<Shop, Box<dyn std::error::Error>> {
    let config = ShopConfig::from_env()?;

    tracing::info!("Connecting to shop database...");
    let pool = db::create_pool(&config.database_url).await?;

    Ok(Shop::new(Arc::new(PgStore::new(pool)), config.shipping))
}
