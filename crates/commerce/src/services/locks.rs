//! Per-stock-key async locks.
//!
//! One mutex per `(product_id, size)`, created on demand. The table keeps
//! only weak references: a key's mutex lives exactly as long as someone holds
//! or waits on it, so a held lock can never be dropped from under its holder
//! and handed out fresh to a second caller. Holding the guard serializes
//! read-check-write sequences for that key inside this process only; the
//! store's conditional writes still decide across processes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};

use maru_core::StockKey;

/// Table size at which dead entries are swept before inserting.
const SWEEP_AT: usize = 1_024;

/// Keyed lock table.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<SyncMutex<HashMap<StockKey, Weak<Mutex<()>>>>>,
}

impl KeyedLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &StockKey) -> OwnedMutexGuard<()> {
        self.mutex_for(key).lock_owned().await
    }

    fn mutex_for(&self, key: &StockKey) -> Arc<Mutex<()>> {
        let mut table = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(live) = table.get(key).and_then(Weak::upgrade) {
            return live;
        }
        if table.len() >= SWEEP_AT {
            table.retain(|_, weak| weak.strong_count() > 0);
        }
        let fresh = Arc::new(Mutex::new(()));
        table.insert(key.clone(), Arc::downgrade(&fresh));
        fresh
    }

    #[cfg(test)]
    fn live_entries(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use maru_core::ProductId;

    use super::*;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let key = StockKey::new(ProductId::new(1), "M");

        let guard = locks.lock(&key).await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock(&key)).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(50), locks.lock(&key)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let medium = StockKey::new(ProductId::new(1), "M");
        let large = StockKey::new(ProductId::new(1), "L");

        let _guard = locks.lock(&medium).await;
        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock(&large)).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn test_held_lock_survives_table_churn() {
        let locks = KeyedLocks::new();
        let key = StockKey::new(ProductId::new(1), "M");
        let guard = locks.lock(&key).await;

        // Enough other keys to force several sweeps while `key` is held.
        let churn = i64::try_from(3 * SWEEP_AT).unwrap();
        for id in 2..churn {
            drop(locks.lock(&StockKey::new(ProductId::new(id), "M")).await);
        }

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock(&key)).await;
        assert!(blocked.is_err());
        drop(guard);
        assert!(
            tokio::time::timeout(Duration::from_millis(50), locks.lock(&key))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_released_keys_are_not_kept_alive() {
        let locks = KeyedLocks::new();
        let key = StockKey::new(ProductId::new(1), "M");

        let guard = locks.lock(&key).await;
        assert_eq!(locks.live_entries(), 1);
        drop(guard);
        assert_eq!(locks.live_entries(), 0);
    }
}
