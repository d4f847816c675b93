//! Copy-on-write versioned collection
//!
//! The live collection is an `Arc<Vec<T>>` plus a version counter. A
//! snapshot is a clone of that `Arc`, so taking one is O(1). A mutation
//! copies the vector only if some snapshot still shares it; otherwise it
//! edits in place. Consecutive mutations with no snapshot taken in between
//! therefore coalesce into one copy. Old versions are freed when the last
//! snapshot holding them is dropped.
//!
//! The lock only guards swapping the `Arc` and the version; readers never
//! hold it while iterating.

use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
struct Versioned<T> {
    items: Arc<Vec<T>>,
    version: u64,
}

/// Handle to a live collection. Cloning the handle shares the collection.
#[derive(Debug)]
pub struct CowVec<T> {
    live: Arc<RwLock<Versioned<T>>>,
}

impl<T> Clone for CowVec<T> {
    fn clone(&self) -> Self {
        Self {
            live: Arc::clone(&self.live),
        }
    }
}

/// An immutable version of a collection.
#[derive(Debug)]
pub struct Snapshot<T> {
    items: Arc<Vec<T>>,
    version: u64,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            version: self.version,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

impl<T: Clone> CowVec<T> {
    pub fn new() -> Self {
        Self {
            live: Arc::new(RwLock::new(Versioned {
                items: Arc::new(Vec::new()),
                version: 0,
            })),
        }
    }

    /// Current version, shared with any later mutation until it happens.
    pub fn snapshot(&self) -> Snapshot<T> {
        let live = self.live.read().unwrap_or_else(PoisonError::into_inner);
        Snapshot {
            items: Arc::clone(&live.items),
            version: live.version,
        }
    }

    /// Current version number.
    pub fn version(&self) -> u64 {
        self.live.read().unwrap_or_else(PoisonError::into_inner).version
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.live.read().unwrap_or_else(PoisonError::into_inner).items.len()
    }

    /// Applies `f` to the live items and bumps the version.
    ///
    /// Returns `f`'s result and whether the items had to be copied away
    /// from an outstanding snapshot.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> (R, bool) {
        let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);
        let copied = Arc::strong_count(&live.items) > 1;
        let result = f(Arc::make_mut(&mut live.items));
        live.version += 1;
        (result, copied)
    }
}

impl<T: Clone> Default for CowVec<T> {
    fn default() -> Self {
        Self::new()
    }
}
