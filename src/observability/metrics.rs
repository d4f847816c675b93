//! Metrics registry
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters of one CAS and its index repositories.
///
/// All counters use Relaxed atomics; exact cross-counter consistency is not
/// required.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Feature structures created
    fs_created: AtomicU64,
    /// Successful leaf index insertions
    index_adds: AtomicU64,
    /// Successful leaf index removals
    index_removes: AtomicU64,
    /// Inserts dropped by a SET index because an equal key was present
    set_duplicates_rejected: AtomicU64,
    /// Copy-on-write copies of a live index collection
    cow_copies: AtomicU64,
    /// Cursors created
    cursors_created: AtomicU64,
    /// Documents serialized
    documents_serialized: AtomicU64,
    /// Documents deserialized
    documents_deserialized: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment feature structures created
    pub fn increment_fs_created(&self) {
        self.fs_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment index insertions
    pub fn increment_index_adds(&self) {
        self.index_adds.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment index removals
    pub fn increment_index_removes(&self) {
        self.index_removes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment SET duplicates rejected
    pub fn increment_set_duplicates(&self) {
        self.set_duplicates_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment copy-on-write copies
    pub fn increment_cow_copies(&self) {
        self.cow_copies.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment cursors created
    pub fn increment_cursors(&self) {
        self.cursors_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment documents serialized
    pub fn increment_serialized(&self) {
        self.documents_serialized.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment documents deserialized
    pub fn increment_deserialized(&self) {
        self.documents_deserialized.fetch_add(1, Ordering::Relaxed);
    }

    /// Get copy-on-write copies
    pub fn cow_copies(&self) -> u64 {
        self.cow_copies.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fs_created: self.fs_created.load(Ordering::Relaxed),
            index_adds: self.index_adds.load(Ordering::Relaxed),
            index_removes: self.index_removes.load(Ordering::Relaxed),
            set_duplicates_rejected: self.set_duplicates_rejected.load(Ordering::Relaxed),
            cow_copies: self.cow_copies.load(Ordering::Relaxed),
            cursors_created: self.cursors_created.load(Ordering::Relaxed),
            documents_serialized: self.documents_serialized.load(Ordering::Relaxed),
            documents_deserialized: self.documents_deserialized.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub fs_created: u64,
    pub index_adds: u64,
    pub index_removes: u64,
    pub set_duplicates_rejected: u64,
    pub cow_copies: u64,
    pub cursors_created: u64,
    pub documents_serialized: u64,
    pub documents_deserialized: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_fs_created();
        registry.increment_fs_created();
        registry.increment_index_adds();
        registry.increment_index_removes();
        registry.increment_set_duplicates();
        registry.increment_cow_copies();
        registry.increment_cursors();
        registry.increment_serialized();
        registry.increment_deserialized();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.fs_created, 2);
        assert_eq!(snapshot.index_adds, 1);
        assert_eq!(snapshot.index_removes, 1);
        assert_eq!(snapshot.set_duplicates_rejected, 1);
        assert_eq!(snapshot.cow_copies, 1);
        assert_eq!(snapshot.cursors_created, 1);
        assert_eq!(snapshot.documents_serialized, 1);
        assert_eq!(snapshot.documents_deserialized, 1);
    }

    #[test]
    fn test_concurrent_increments() {
        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        registry.increment_cow_copies();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.cow_copies(), 4000);
    }
}
