use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Async lock scoped to a string key (e.g. a remote object key).
///
/// Holders of different keys never wait on each other; holders of the same
/// key are serialized.
#[derive(Debug, Clone, Default)]
pub struct KeyedMutex {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`. Released when the guard is dropped.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the DashMap shard is not held across the await.
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        mutex.lock_owned().await
    }

    /// Drops entries nobody is holding or waiting on.
    pub fn cleanup(&self) {
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyedMutex::new();
        let _a = locks.lock("backups/a.txt").await;
        let b = tokio::time::timeout(Duration::from_millis(200), locks.lock("backups/b.txt")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_same_key_waits_for_release() {
        let locks = KeyedMutex::new();
        let guard = locks.lock("backups/a.txt").await;
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.lock("backups/a.txt")).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired =
            tokio::time::timeout(Duration::from_millis(200), locks.lock("backups/a.txt")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_held_locks() {
        let locks = KeyedMutex::new();
        let held = locks.lock("held").await;
        drop(locks.lock("released").await);
        assert_eq!(locks.len(), 2);

        locks.cleanup();
        assert_eq!(locks.len(), 1);

        drop(held);
        locks.cleanup();
        assert!(locks.is_empty());
    }
}
