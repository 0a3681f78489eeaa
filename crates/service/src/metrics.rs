use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking asset service outcomes.
///
/// All counters use relaxed ordering. For a point-in-time view, call
/// [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    /// Assets created.
    pub created: AtomicU64,
    /// Assets deleted.
    pub deleted: AtomicU64,
    /// Get or delete requests for unknown ids.
    pub not_found: AtomicU64,
    /// Uploads rejected for size or content type.
    pub rejected: AtomicU64,
    /// Blobs removed to undo a failed create.
    pub rollbacks: AtomicU64,
    /// Operations that ended in an internal inconsistency.
    pub inconsistencies: AtomicU64,
}

impl ServiceMetrics {
    /// Increment the created counter.
    pub fn increment_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the deleted counter.
    pub fn increment_deleted(&self) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the not-found counter.
    pub fn increment_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the rejected counter.
    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the rollback counter.
    pub fn increment_rollbacks(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the inconsistency counter.
    pub fn increment_inconsistencies(&self) {
        self.inconsistencies.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
            inconsistencies: self.inconsistencies.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`ServiceMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Assets created.
    pub created: u64,
    /// Assets deleted.
    pub deleted: u64,
    /// Get or delete requests for unknown ids.
    pub not_found: u64,
    /// Uploads rejected for size or content type.
    pub rejected: u64,
    /// Blobs removed to undo a failed create.
    pub rollbacks: u64,
    /// Operations that ended in an internal inconsistency.
    pub inconsistencies: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_increments() {
        let metrics = ServiceMetrics::default();
        metrics.increment_created();
        metrics.increment_created();
        metrics.increment_deleted();
        metrics.increment_rollbacks();

        let snap = metrics.snapshot();
        assert_eq!(snap.created, 2);
        assert_eq!(snap.deleted, 1);
        assert_eq!(snap.rollbacks, 1);
        assert_eq!(snap.not_found, 0);
        assert_eq!(snap.inconsistencies, 0);
    }
}
