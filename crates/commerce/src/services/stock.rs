//! Stock ledger view and admin adjustments.

use std::sync::Arc;

use tracing::{info, instrument};

use maru_core::StockKey;

use super::KeyedLocks;
use crate::error::{CommerceError, Result};
use crate::store::Store;

/// Read access to stock counters, plus admin restocks and write-offs.
#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn Store>,
    locks: KeyedLocks,
}

impl StockService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, locks: KeyedLocks) -> Self {
        Self { store, locks }
    }

    /// Current quantity for `key`.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::StockLookupFailed` if the product or size is gone.
    pub async fn available(&self, key: &StockKey) -> Result<u32> {
        self.store
            .read_stock(key)
            .await?
            .ok_or_else(|| CommerceError::StockLookupFailed(key.clone()))
    }

    /// Add (positive) or write off (negative) units, returning the new count.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InsufficientStock` if the counter would go
    /// below zero, `CommerceError::Validation` if it would pass the counter's
    /// maximum, `CommerceError::Conflict` if another writer changed it
    /// between the read and the write.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn adjust(&self, key: &StockKey, delta: i64) -> Result<u32> {
        if delta == 0 {
            return Err(CommerceError::InvalidDelta);
        }
        let _guard = self.locks.lock(key).await;

        let current = self.available(key).await?;
        let target = i64::from(current).saturating_add(delta);
        if target < 0 {
            return Err(CommerceError::InsufficientStock {
                key: key.clone(),
                requested: u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX),
                available: current,
            });
        }
        let new_qty = u32::try_from(target)
            .map_err(|_| CommerceError::validation("delta", "stock would exceed the maximum"))?;

        self.store.write_stock(key, current, new_qty).await?;
        info!(from = current, to = new_qty, "stock adjusted");
        Ok(new_qty)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maru_core::ProductId;

    use super::super::test_support;
    use super::*;

    #[tokio::test]
    async fn test_available_reads_counter() {
        let store = test_support::store();
        let shirt = test_support::product(&store, "shirt", 30_000, &[("M", 2)]).await;
        let stock = StockService::new(store, KeyedLocks::new());

        let key = StockKey::new(shirt.id, "M");
        assert_eq!(stock.available(&key).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_size_fails_lookup() {
        let store = test_support::store();
        let shirt = test_support::product(&store, "shirt", 30_000, &[("M", 2)]).await;
        let stock = StockService::new(store, KeyedLocks::new());

        let err = stock
            .available(&StockKey::new(shirt.id, "XL"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::StockLookupFailed(_)));

        let err = stock
            .available(&StockKey::new(ProductId::new(999), "M"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::StockLookupFailed(_)));
    }

    #[tokio::test]
    async fn test_adjust_restocks_and_writes_off() {
        let store = test_support::store();
        let shirt = test_support::product(&store, "shirt", 30_000, &[("M", 2)]).await;
        let stock = StockService::new(store, KeyedLocks::new());
        let key = StockKey::new(shirt.id, "M");

        assert_eq!(stock.adjust(&key, 5).await.unwrap(), 7);
        assert_eq!(stock.adjust(&key, -7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adjust_never_goes_negative() {
        let store = test_support::store();
        let shirt = test_support::product(&store, "shirt", 30_000, &[("M", 2)]).await;
        let stock = StockService::new(store, KeyedLocks::new());
        let key = StockKey::new(shirt.id, "M");

        let err = stock.adjust(&key, -3).await.unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(stock.available(&key).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_adjust_past_counter_range_rejected() {
        let store = test_support::store();
        let shirt = test_support::product(&store, "shirt", 30_000, &[("M", 2)]).await;
        let stock = StockService::new(store, KeyedLocks::new());
        let key = StockKey::new(shirt.id, "M");

        let err = stock.adjust(&key, i64::MAX).await.unwrap_err();
        assert!(matches!(err, CommerceError::Validation { field: "delta", .. }));
        assert_eq!(stock.available(&key).await.unwrap(), 2);

        assert!(stock.adjust(&key, i64::MIN).await.is_err());
        assert_eq!(stock.available(&key).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_zero_adjustment_rejected() {
        let store = test_support::store();
        let shirt = test_support::product(&store, "shirt", 30_000, &[("M", 2)]).await;
        let stock = StockService::new(store, KeyedLocks::new());

        let err = stock.adjust(&StockKey::new(shirt.id, "M"), 0).await.unwrap_err();
        assert!(matches!(err, CommerceError::InvalidDelta));
    }
}
