//! Per-asset mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A set of async mutexes keyed by asset id.
///
/// Locking one id never blocks another. Entries are created on demand and
/// removed when the last holder or waiter lets go, so the map only holds ids
/// with in-flight operations.
#[derive(Debug, Default)]
pub struct IdLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive hold on one id. Released on drop.
#[derive(Debug)]
pub struct IdGuard<'a> {
    locks: &'a IdLocks,
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl IdLocks {
    /// Create an empty lock set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    pub async fn lock(&self, id: &str) -> IdGuard<'_> {
        let mutex = Arc::clone(self.locks.entry(id.to_owned()).or_default().value());
        let guard = mutex.lock_owned().await;
        IdGuard {
            locks: self,
            id: id.to_owned(),
            guard: Some(guard),
        }
    }

    /// Number of ids with a live entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no id is currently locked or awaited.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl IdGuard<'_> {
    /// The id this guard holds.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for IdGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The map's own reference is the only one left when nobody holds or
        // awaits the mutex.
        self.locks
            .locks
            .remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn entry_removed_after_release() {
        let locks = IdLocks::new();
        {
            let guard = locks.lock("a").await;
            assert_eq!(guard.id(), "a");
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn distinct_ids_do_not_block() {
        let locks = IdLocks::new();
        let _a = locks.lock("a").await;
        let b = tokio::time::timeout(Duration::from_secs(1), locks.lock("b")).await;
        assert!(b.is_ok(), "locking a different id should not wait");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_id_is_exclusive() {
        let locks = Arc::new(IdLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..16 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("shared").await;
                let now = inside.fetch_add(1, Ordering::SeqCst);
                assert_eq!(now, 0, "two holders inside the critical section");
                tokio::task::yield_now().await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(locks.is_empty());
    }
}
