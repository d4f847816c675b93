//! Single-type leaf indexes
//!
//! A leaf holds the members of one index family whose type is exactly one
//! concrete type. Entries are kept sorted in a copy-on-write vector:
//!
//! - SORTED: by (key, id)
//! - SET: by (key, id), at most one entry per key
//! - BAG: by insertion sequence
//!
//! Removal goes through the writer-side member map, which remembers the
//! exact entry that was inserted. A feature structure whose key features
//! were changed after indexing is therefore still found and removed.

use std::collections::HashMap;
use std::sync::Arc;

use super::comparator::Comparator;
use super::cow::CowVec;
use super::definition::IndexKind;
use super::errors::IndexResult;
use super::key::IndexKey;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::store::{FsId, Store};
use crate::typesystem::TypeId;

/// One element of a leaf collection.
///
/// Field order gives the derived ordering: key, then the tie-break (id
/// for SORTED/SET, insertion sequence for BAG), then id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexEntry {
    pub key: IndexKey,
    pub tie: u64,
    pub id: FsId,
}

/// Outcome of an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Added,
    /// Already a member of this leaf
    AlreadyPresent,
    /// SET index already holds an element with an equal key
    DuplicateKey,
}

#[derive(Debug)]
pub(crate) struct LeafIndex {
    type_id: TypeId,
    type_rank: u32,
    kind: IndexKind,
    comparator: Arc<Comparator>,
    entries: CowVec<IndexEntry>,
    members: HashMap<FsId, IndexEntry>,
    next_seq: u64,
    metrics: Arc<MetricsRegistry>,
    index_name: Arc<str>,
}

impl LeafIndex {
    pub(crate) fn new(
        index_name: Arc<str>,
        type_id: TypeId,
        type_rank: u32,
        kind: IndexKind,
        comparator: Arc<Comparator>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            type_id,
            type_rank,
            kind,
            comparator,
            entries: CowVec::new(),
            members: HashMap::new(),
            next_seq: 0,
            metrics,
            index_name,
        }
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn type_rank(&self) -> u32 {
        self.type_rank
    }

    pub(crate) fn kind(&self) -> IndexKind {
        self.kind
    }

    pub(crate) fn comparator(&self) -> &Arc<Comparator> {
        &self.comparator
    }

    pub(crate) fn entries(&self) -> &CowVec<IndexEntry> {
        &self.entries
    }

    /// O(1)
    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    /// True if this exact feature structure is a member.
    pub(crate) fn contains_id(&self, fs: FsId) -> bool {
        self.members.contains_key(&fs)
    }

    pub(crate) fn insert(&mut self, store: &Store, fs: FsId) -> IndexResult<Insertion> {
        if self.members.contains_key(&fs) {
            return Ok(Insertion::AlreadyPresent);
        }
        let entry = match self.kind {
            IndexKind::Bag => {
                self.next_seq += 1;
                IndexEntry {
                    key: IndexKey::empty(),
                    tie: self.next_seq,
                    id: fs,
                }
            }
            IndexKind::Sorted | IndexKind::Set => IndexEntry {
                key: self.comparator.extract(store, fs)?,
                tie: u64::from(fs.raw()),
                id: fs,
            },
        };

        // A rejected duplicate must not touch the live version
        if self.kind == IndexKind::Set && self.find_key(&entry.key).is_some() {
            self.metrics.increment_set_duplicates();
            return Ok(Insertion::DuplicateKey);
        }

        let (_, copied) = self.entries.mutate(|items| {
            let pos = items.partition_point(|e| e < &entry);
            items.insert(pos, entry.clone());
        });
        self.note_copy(copied);
        self.members.insert(fs, entry);
        self.metrics.increment_index_adds();
        Ok(Insertion::Added)
    }

    /// Removes `fs` by identity. Returns false if it was not a member.
    pub(crate) fn remove(&mut self, fs: FsId) -> bool {
        let entry = match self.members.remove(&fs) {
            Some(entry) => entry,
            None => return false,
        };
        let (_, copied) = self.entries.mutate(|items| {
            if let Ok(pos) = items.binary_search(&entry) {
                items.remove(pos);
            }
        });
        self.note_copy(copied);
        self.metrics.increment_index_removes();
        true
    }

    /// Left-most member whose key equals `key` (SORTED/SET).
    pub(crate) fn find_key(&self, key: &IndexKey) -> Option<FsId> {
        let snapshot = self.entries.snapshot();
        let items = snapshot.items();
        let pos = items.partition_point(|e| &e.key < key);
        items.get(pos).filter(|e| &e.key == key).map(|e| e.id)
    }

    fn note_copy(&self, copied: bool) {
        if copied {
            self.metrics.increment_cow_copies();
            log_event(
                Event::SnapshotCopied,
                &[
                    ("index", &*self.index_name),
                    ("size", self.members.len().to_string().as_str()),
                ],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::key::{KeyComponent, KeyValue, SortOrder};
    use crate::index::KeySpec;
    use crate::typesystem::{TypeSystem, TypeSystemBuilder};

    fn setup(kind: IndexKind) -> (Arc<TypeSystem>, Store, LeafIndex) {
        let ts = Arc::new(TypeSystemBuilder::new().commit().unwrap());
        let store = Store::new(ts.clone());
        let b = ts.builtins();
        let comparator = Comparator::new(
            &ts,
            "test",
            b.annotation,
            vec![KeySpec::ascending(b.begin), KeySpec::descending(b.end)],
        )
        .unwrap();
        let leaf = LeafIndex::new(
            Arc::from("test"),
            b.annotation,
            0,
            kind,
            Arc::new(comparator),
            Arc::new(MetricsRegistry::new()),
        );
        (ts, store, leaf)
    }

    fn annotation(ts: &TypeSystem, store: &mut Store, begin: i32, end: i32) -> FsId {
        let fs = store.create(ts.builtins().annotation).unwrap();
        store.set_int(fs, ts.builtins().begin, begin).unwrap();
        store.set_int(fs, ts.builtins().end, end).unwrap();
        fs
    }

    fn ids(leaf: &LeafIndex) -> Vec<FsId> {
        leaf.entries().snapshot().items().iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_sorted_keeps_duplicates_in_id_order() {
        let (ts, mut store, mut leaf) = setup(IndexKind::Sorted);
        let a = annotation(&ts, &mut store, 4, 6);
        let b = annotation(&ts, &mut store, 0, 2);
        let c = annotation(&ts, &mut store, 4, 6);
        for fs in [c, a, b] {
            assert_eq!(leaf.insert(&store, fs).unwrap(), Insertion::Added);
        }
        assert_eq!(ids(&leaf), vec![b, a, c]);
        assert_eq!(leaf.insert(&store, a).unwrap(), Insertion::AlreadyPresent);
        assert_eq!(leaf.len(), 3);
    }

    #[test]
    fn test_set_first_insert_wins() {
        let (ts, mut store, mut leaf) = setup(IndexKind::Set);
        let first_created = annotation(&ts, &mut store, 1, 1);
        let second = annotation(&ts, &mut store, 1, 1);
        assert_eq!(leaf.insert(&store, second).unwrap(), Insertion::Added);
        assert_eq!(leaf.insert(&store, first_created).unwrap(), Insertion::DuplicateKey);
        assert_eq!(ids(&leaf), vec![second]);
        assert!(!leaf.contains_id(first_created));
    }

    #[test]
    fn test_set_duplicate_leaves_snapshot_current() {
        let (ts, mut store, mut leaf) = setup(IndexKind::Set);
        let a = annotation(&ts, &mut store, 5, 5);
        let dup = annotation(&ts, &mut store, 5, 5);
        leaf.insert(&store, a).unwrap();

        let snapshot = leaf.entries().snapshot();
        let version = leaf.entries().version();
        assert_eq!(leaf.insert(&store, dup).unwrap(), Insertion::DuplicateKey);

        assert_eq!(leaf.entries().version(), version);
        assert_eq!(snapshot.version(), version);
        assert_eq!(leaf.metrics.cow_copies(), 0);
        assert_eq!(leaf.metrics.snapshot().set_duplicates_rejected, 1);
    }

    #[test]
    fn test_bag_insertion_order() {
        let (ts, mut store, mut leaf) = setup(IndexKind::Bag);
        let a = annotation(&ts, &mut store, 9, 9);
        let b = annotation(&ts, &mut store, 0, 0);
        leaf.insert(&store, b).unwrap();
        leaf.insert(&store, a).unwrap();
        assert_eq!(ids(&leaf), vec![b, a]);
        assert!(leaf.remove(b));
        assert_eq!(ids(&leaf), vec![a]);
    }

    #[test]
    fn test_remove_after_key_mutation() {
        let (ts, mut store, mut leaf) = setup(IndexKind::Sorted);
        let a = annotation(&ts, &mut store, 1, 2);
        let b = annotation(&ts, &mut store, 3, 4);
        leaf.insert(&store, a).unwrap();
        leaf.insert(&store, b).unwrap();

        // Key changed behind the index's back
        store.set_int(a, ts.builtins().begin, 100).unwrap();
        assert!(leaf.remove(a));
        assert_eq!(ids(&leaf), vec![b]);
        assert!(!leaf.remove(a));
    }

    #[test]
    fn test_find_key_left_most() {
        let (ts, mut store, mut leaf) = setup(IndexKind::Sorted);
        let a = annotation(&ts, &mut store, 2, 2);
        let b = annotation(&ts, &mut store, 2, 2);
        leaf.insert(&store, b).unwrap();
        leaf.insert(&store, a).unwrap();
        let key = IndexKey(vec![
            KeyComponent {
                value: KeyValue::Int(2),
                order: SortOrder::Ascending,
            },
            KeyComponent {
                value: KeyValue::Int(2),
                order: SortOrder::Descending,
            },
        ]);
        assert_eq!(leaf.find_key(&key), Some(a));
    }
}
