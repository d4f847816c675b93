//! Leaf cursors
//!
//! A leaf cursor walks one snapshot of a leaf index. The snapshot is taken
//! when the cursor is created and replaced only when the cursor is
//! repositioned (`move_to_first`, `move_to_last`, `move_to`); stepping with
//! `move_to_next`/`move_to_previous` never changes it. Mutations of the
//! index in the meantime are invisible to the cursor, which can report them
//! through `is_stale`.
//!
//! Positions are an element index into the snapshot or one of the two
//! off-the-end states. Because snapshots are random-access, reversing
//! direction at an element or at either end always lands on the adjacent
//! element.

use std::sync::Arc;

use super::errors::{IteratorError, IteratorResult};
use super::FsIterator;
use crate::index::{Comparator, CowVec, IndexEntry, IndexKey, IndexKind, Snapshot};
use crate::store::{FsId, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    BeforeFirst,
    At(usize),
    AfterLast,
}

/// Cursor over a single-type index.
#[derive(Debug, Clone)]
pub struct LeafCursor {
    live: CowVec<IndexEntry>,
    snapshot: Snapshot<IndexEntry>,
    position: Position,
    kind: IndexKind,
    comparator: Arc<Comparator>,
    type_rank: u32,
}

impl LeafCursor {
    /// A cursor on the first element of the current version.
    pub(crate) fn new(live: CowVec<IndexEntry>, kind: IndexKind, comparator: Arc<Comparator>, type_rank: u32) -> Self {
        let snapshot = live.snapshot();
        let mut cursor = Self {
            live,
            snapshot,
            position: Position::BeforeFirst,
            kind,
            comparator,
            type_rank,
        };
        cursor.seek_first();
        cursor
    }

    /// Version of the snapshot this cursor reads.
    pub fn snapshot_version(&self) -> u64 {
        self.snapshot.version()
    }

    pub(crate) fn type_rank(&self) -> u32 {
        self.type_rank
    }

    /// Number of elements in the snapshot.
    pub fn snapshot_len(&self) -> usize {
        self.snapshot.items().len()
    }

    pub(crate) fn current_entry(&self) -> Option<&IndexEntry> {
        match self.position {
            Position::At(i) => self.snapshot.items().get(i),
            _ => None,
        }
    }

    fn refresh(&mut self) {
        self.snapshot = self.live.snapshot();
    }

    fn at_or_after_last(&self, index: usize) -> Position {
        if index < self.snapshot_len() {
            Position::At(index)
        } else {
            Position::AfterLast
        }
    }

    /// First element of the snapshot, without refreshing it.
    pub(crate) fn seek_first(&mut self) {
        self.position = self.at_or_after_last(0);
    }

    /// Last element of the snapshot, without refreshing it.
    pub(crate) fn seek_last(&mut self) {
        self.position = match self.snapshot_len() {
            0 => Position::BeforeFirst,
            n => Position::At(n - 1),
        };
    }

    /// First element whose key is greater than (`strict`) or at least
    /// `key`, within the current snapshot.
    pub(crate) fn seek_after(&mut self, key: &IndexKey, strict: bool) {
        let items = self.snapshot.items();
        let index = if strict {
            items.partition_point(|e| &e.key <= key)
        } else {
            items.partition_point(|e| &e.key < key)
        };
        self.position = self.at_or_after_last(index);
    }

    /// Last element whose key is at most (`inclusive`) or less than `key`,
    /// within the current snapshot.
    pub(crate) fn seek_before(&mut self, key: &IndexKey, inclusive: bool) {
        let items = self.snapshot.items();
        let bound = if inclusive {
            items.partition_point(|e| &e.key <= key)
        } else {
            items.partition_point(|e| &e.key < key)
        };
        self.position = match bound {
            0 => Position::BeforeFirst,
            n => Position::At(n - 1),
        };
    }

    /// Left-most element whose key is not less than `key`, on a fresh
    /// snapshot.
    pub fn move_to_key(&mut self, key: &IndexKey) {
        self.refresh();
        self.seek_after(key, false);
    }

    /// First element ordered after (`key`, `rank`) in merge order, on a
    /// fresh snapshot. Equal keys of this member count as after only when
    /// its type ranks later.
    pub(crate) fn move_past(&mut self, key: &IndexKey, rank: u32) {
        self.refresh();
        self.seek_after(key, self.type_rank <= rank);
    }
}

impl FsIterator for LeafCursor {
    fn is_valid(&self) -> bool {
        matches!(self.position, Position::At(_))
    }

    fn get(&self) -> IteratorResult<FsId> {
        self.current_entry().map(|e| e.id).ok_or(IteratorError::NoSuchElement)
    }

    fn move_to_first(&mut self) {
        self.refresh();
        self.seek_first();
    }

    fn move_to_last(&mut self) {
        self.refresh();
        self.seek_last();
    }

    fn move_to_next(&mut self) {
        self.position = match self.position {
            Position::BeforeFirst => self.at_or_after_last(0),
            Position::At(i) => self.at_or_after_last(i + 1),
            Position::AfterLast => Position::AfterLast,
        };
    }

    fn move_to_previous(&mut self) {
        self.position = match self.position {
            Position::BeforeFirst => Position::BeforeFirst,
            Position::At(0) => Position::BeforeFirst,
            Position::At(i) => Position::At(i - 1),
            Position::AfterLast => match self.snapshot_len() {
                0 => Position::BeforeFirst,
                n => Position::At(n - 1),
            },
        };
    }

    /// SORTED/SET: left-most element with a key equal to the template's,
    /// else the insertion point. BAG: the template itself if it is a
    /// member, else invalid.
    fn move_to(&mut self, store: &Store, template: FsId) -> IteratorResult<()> {
        match self.kind {
            IndexKind::Bag => {
                self.refresh();
                self.position = self
                    .snapshot
                    .items()
                    .iter()
                    .position(|e| e.id == template)
                    .map_or(Position::AfterLast, Position::At);
            }
            IndexKind::Sorted | IndexKind::Set => {
                let key = self.comparator.extract(store, template)?;
                self.move_to_key(&key);
            }
        }
        Ok(())
    }

    fn is_stale(&self) -> bool {
        self.live.version() != self.snapshot.version()
    }
}
