//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use maru_commerce::services::Shop;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    shop: Shop,
    currency_symbol: String,
    pool: Option<PgPool>,
}

impl AppState {
    /// State over an arbitrary store, with no database to check for readiness.
    #[must_use]
    pub fn new(shop: Shop, currency_symbol: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                shop,
                currency_symbol: currency_symbol.into(),
                pool: None,
            }),
        }
    }

    /// State backed by `PostgreSQL`; readiness checks the pool.
    #[must_use]
    pub fn with_pool(shop: Shop, currency_symbol: impl Into<String>, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                shop,
                currency_symbol: currency_symbol.into(),
                pool: Some(pool),
            }),
        }
    }

    #[must_use]
    pub fn shop(&self) -> &Shop {
        &self.inner.shop
    }

    #[must_use]
    pub fn currency_symbol(&self) -> &str {
        &self.inner.currency_symbol
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
