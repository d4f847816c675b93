//! Copy-on-Write Iterator Engine
//!
//! Bidirectional cursors over index snapshots.
//!
//! # Invariants
//!
//! - A cursor observes the version it last (re)positioned on, never a mix
//! - `move_to_next`/`move_to_previous` never block and never copy
//! - `get` on an invalid cursor is `NoSuchElement`, never a panic
//! - Aggregate merge order is (key, linear type order, tie-break)
//! - A subiterator yields only elements covered by its bound

mod aggregate;
mod cursor;
mod errors;
mod subiterator;

pub use aggregate::AggregateCursor;
pub use cursor::LeafCursor;
pub use errors::{IteratorError, IteratorResult};
pub use subiterator::Subiterator;

use crate::index::{IndexEntry, IndexKey};
use crate::store::{FsId, Store};

/// Operations shared by all cursors.
pub trait FsIterator {
    /// True when positioned on an element.
    fn is_valid(&self) -> bool;

    /// The current element.
    fn get(&self) -> IteratorResult<FsId>;

    /// Re-reads the live index and moves to its first element.
    fn move_to_first(&mut self);

    /// Re-reads the live index and moves to its last element.
    fn move_to_last(&mut self);

    /// Steps forward; a no-op once past the last element.
    fn move_to_next(&mut self);

    /// Steps backward; a no-op once before the first element.
    fn move_to_previous(&mut self);

    /// Re-reads the live index and moves to the left-most element not less
    /// than `template`.
    fn move_to(&mut self, store: &Store, template: FsId) -> IteratorResult<()>;

    /// True if the index changed since this cursor's snapshot was taken.
    fn is_stale(&self) -> bool;

    /// An independent cursor at the same position on the same snapshot.
    fn copy(&self) -> Self
    where
        Self: Sized + Clone,
    {
        self.clone()
    }

    /// Yields ids forward from the current position, advancing the cursor.
    fn ids(&mut self) -> Ids<'_, Self>
    where
        Self: Sized,
    {
        Ids { cursor: self }
    }
}

/// `Iterator` adapter returned by [`FsIterator::ids`].
pub struct Ids<'a, C: FsIterator> {
    cursor: &'a mut C,
}

impl<C: FsIterator> Iterator for Ids<'_, C> {
    type Item = FsId;

    fn next(&mut self) -> Option<FsId> {
        let id = self.cursor.get().ok()?;
        self.cursor.move_to_next();
        Some(id)
    }
}

/// A cursor over either a single-type or an aggregate index.
#[derive(Debug, Clone)]
pub enum FsCursor {
    Leaf(LeafCursor),
    Aggregate(AggregateCursor),
}

impl FsCursor {
    /// Current entry and the type rank of the member holding it.
    pub(crate) fn current_ranked(&self) -> Option<(&IndexEntry, u32)> {
        match self {
            FsCursor::Leaf(c) => c.current_entry().map(|entry| (entry, c.type_rank())),
            FsCursor::Aggregate(c) => c.current_ranked(),
        }
    }

    pub(crate) fn move_past(&mut self, key: &IndexKey, rank: u32) {
        match self {
            FsCursor::Leaf(c) => c.move_past(key, rank),
            FsCursor::Aggregate(c) => c.move_past(key, rank),
        }
    }
}

impl FsIterator for FsCursor {
    fn is_valid(&self) -> bool {
        match self {
            FsCursor::Leaf(c) => c.is_valid(),
            FsCursor::Aggregate(c) => c.is_valid(),
        }
    }

    fn get(&self) -> IteratorResult<FsId> {
        match self {
            FsCursor::Leaf(c) => c.get(),
            FsCursor::Aggregate(c) => c.get(),
        }
    }

    fn move_to_first(&mut self) {
        match self {
            FsCursor::Leaf(c) => c.move_to_first(),
            FsCursor::Aggregate(c) => c.move_to_first(),
        }
    }

    fn move_to_last(&mut self) {
        match self {
            FsCursor::Leaf(c) => c.move_to_last(),
            FsCursor::Aggregate(c) => c.move_to_last(),
        }
    }

    fn move_to_next(&mut self) {
        match self {
            FsCursor::Leaf(c) => c.move_to_next(),
            FsCursor::Aggregate(c) => c.move_to_next(),
        }
    }

    fn move_to_previous(&mut self) {
        match self {
            FsCursor::Leaf(c) => c.move_to_previous(),
            FsCursor::Aggregate(c) => c.move_to_previous(),
        }
    }

    fn move_to(&mut self, store: &Store, template: FsId) -> IteratorResult<()> {
        match self {
            FsCursor::Leaf(c) => c.move_to(store, template),
            FsCursor::Aggregate(c) => c.move_to(store, template),
        }
    }

    fn is_stale(&self) -> bool {
        match self {
            FsCursor::Leaf(c) => c.is_stale(),
            FsCursor::Aggregate(c) => c.is_stale(),
        }
    }
}
