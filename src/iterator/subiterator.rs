//! Bounded annotation cursors
//!
//! A subiterator walks the annotations covered by a bounding annotation,
//! in index order. It starts on the first element ordered after the bound
//! (equal span and type order at or before the bound's type count as
//! before it, so the bound itself is never returned) and stops moving
//! forward at the first element that begins after the bound's end. With
//! `strict`, elements that begin inside the bound but end after it are
//! skipped.
//!
//! Spans are read from the entry keys, which lead with `begin` ascending
//! and `end` descending, so stepping needs no store access.

use std::cmp::Ordering;

use super::errors::{IteratorError, IteratorResult};
use super::{FsCursor, FsIterator};
use crate::index::{IndexKey, KeyValue};
use crate::store::{FsId, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeFirst,
    At,
    AfterLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    /// At or before the bound in merge order
    Before,
    Inside,
    /// Begins inside, ends after (strict only)
    Overhang,
    /// Begins after the bound's end
    Past,
}

/// Cursor over the annotations covered by a bound.
#[derive(Debug, Clone)]
pub struct Subiterator {
    inner: FsCursor,
    bound_key: IndexKey,
    bound_rank: u32,
    bound_end: i64,
    strict: bool,
    state: State,
}

/// `(begin, end)` of an annotation-ordered key.
pub(crate) fn span_of(key: &IndexKey) -> Option<(i64, i64)> {
    match key.components() {
        [begin, end, ..] => match (&begin.value, &end.value) {
            (KeyValue::Int(b), KeyValue::Int(e)) => Some((*b, *e)),
            _ => None,
        },
        _ => None,
    }
}

impl Subiterator {
    /// A subiterator on its first covered element. `bound_key` and
    /// `bound_rank` locate the bound in the index's merge order.
    pub(crate) fn new(inner: FsCursor, bound_key: IndexKey, bound_rank: u32, strict: bool) -> Self {
        let bound_end = span_of(&bound_key).map_or(i64::MIN, |(_, end)| end);
        let mut cursor = Self {
            inner,
            bound_key,
            bound_rank,
            bound_end,
            strict,
            state: State::BeforeFirst,
        };
        cursor.move_to_first();
        cursor
    }

    fn relation(&self) -> Option<Relation> {
        let (entry, rank) = self.inner.current_ranked()?;
        let order = entry.key.cmp(&self.bound_key).then(rank.cmp(&self.bound_rank));
        if order != Ordering::Greater {
            return Some(Relation::Before);
        }
        let (begin, end) = span_of(&entry.key)?;
        Some(if begin > self.bound_end {
            Relation::Past
        } else if self.strict && end > self.bound_end {
            Relation::Overhang
        } else {
            Relation::Inside
        })
    }

    /// Moves the inner cursor forward onto the next covered element.
    fn settle_forward(&mut self) {
        loop {
            match self.relation() {
                Some(Relation::Inside) => {
                    self.state = State::At;
                    return;
                }
                Some(Relation::Before) | Some(Relation::Overhang) => self.inner.move_to_next(),
                Some(Relation::Past) | None => {
                    self.state = State::AfterLast;
                    return;
                }
            }
        }
    }

    /// Moves the inner cursor backward onto the previous covered element.
    fn settle_backward(&mut self) {
        loop {
            match self.relation() {
                Some(Relation::Inside) => {
                    self.state = State::At;
                    return;
                }
                Some(Relation::Overhang) | Some(Relation::Past) => self.inner.move_to_previous(),
                Some(Relation::Before) | None => {
                    self.state = State::BeforeFirst;
                    return;
                }
            }
        }
    }
}

impl FsIterator for Subiterator {
    fn is_valid(&self) -> bool {
        self.state == State::At
    }

    fn get(&self) -> IteratorResult<FsId> {
        match self.state {
            State::At => self.inner.get(),
            _ => Err(IteratorError::NoSuchElement),
        }
    }

    fn move_to_first(&mut self) {
        self.inner.move_past(&self.bound_key, self.bound_rank);
        self.settle_forward();
    }

    fn move_to_last(&mut self) {
        self.move_to_first();
        if !self.is_valid() {
            self.state = State::BeforeFirst;
            return;
        }
        while self.is_valid() {
            self.move_to_next();
        }
        self.move_to_previous();
    }

    fn move_to_next(&mut self) {
        if self.state != State::AfterLast {
            self.inner.move_to_next();
            self.settle_forward();
        }
    }

    fn move_to_previous(&mut self) {
        if self.state != State::BeforeFirst {
            self.inner.move_to_previous();
            self.settle_backward();
        }
    }

    /// Left-most covered element not less than `template`; the first
    /// covered element if `template` orders at or before the bound.
    fn move_to(&mut self, store: &Store, template: FsId) -> IteratorResult<()> {
        self.inner.move_to(store, template)?;
        if self.relation() == Some(Relation::Before) {
            self.move_to_first();
        } else {
            self.settle_forward();
        }
        Ok(())
    }

    fn is_stale(&self) -> bool {
        self.inner.is_stale()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::index::IndexRepository;
    use crate::observability::MetricsRegistry;
    use crate::typesystem::builtin::TYPE_NAME_ANNOTATION;
    use crate::typesystem::{TypeId, TypeSystem, TypeSystemBuilder};

    struct Fixture {
        ts: Arc<TypeSystem>,
        store: Store,
        repo: IndexRepository,
        token: TypeId,
        sentence: TypeId,
    }

    fn fixture() -> Fixture {
        let mut b = TypeSystemBuilder::new();
        b.add_type("org.example.Token", TYPE_NAME_ANNOTATION).unwrap();
        b.add_type("org.example.Sentence", TYPE_NAME_ANNOTATION).unwrap();
        let ts = Arc::new(b.commit().unwrap());
        let metrics = Arc::new(MetricsRegistry::new());
        Fixture {
            store: Store::with_metrics(ts.clone(), metrics.clone()),
            repo: IndexRepository::new(ts.clone(), metrics).unwrap(),
            token: ts.require_type("org.example.Token").unwrap(),
            sentence: ts.require_type("org.example.Sentence").unwrap(),
            ts,
        }
    }

    impl Fixture {
        fn add(&mut self, t: TypeId, begin: i32, end: i32) -> FsId {
            let fs = self.store.create(t).unwrap();
            self.store.set_int(fs, self.ts.builtins().begin, begin).unwrap();
            self.store.set_int(fs, self.ts.builtins().end, end).unwrap();
            self.repo.add(&self.store, fs).unwrap();
            fs
        }

        fn sub(&self, bound: FsId, strict: bool) -> Subiterator {
            self.repo
                .annotation_index()
                .unwrap()
                .subiterator(&self.store, bound, strict)
                .unwrap()
        }
    }

    #[test]
    fn test_span_of_annotation_key() {
        let mut f = fixture();
        let t = f.add(f.token, 3, 7);
        let key = f.repo.annotation_index().unwrap().definition().comparator().extract(&f.store, t).unwrap();
        assert_eq!(span_of(&key), Some((3, 7)));
        assert_eq!(span_of(&IndexKey::empty()), None);
    }

    #[test]
    fn test_overhang_skipped_only_when_strict() {
        let mut f = fixture();
        let s = f.add(f.sentence, 0, 10);
        let inside = f.add(f.token, 2, 4);
        let overhang = f.add(f.token, 8, 12);

        assert_eq!(f.sub(s, true).ids().collect::<Vec<_>>(), vec![inside]);
        assert_eq!(f.sub(s, false).ids().collect::<Vec<_>>(), vec![inside, overhang]);
    }

    #[test]
    fn test_backward_stops_at_start() {
        let mut f = fixture();
        let s = f.add(f.sentence, 0, 10);
        let t1 = f.add(f.token, 0, 3);
        let t2 = f.add(f.token, 4, 6);

        let mut cursor = f.sub(s, true);
        cursor.move_to_last();
        assert_eq!(cursor.get().unwrap(), t2);
        cursor.move_to_previous();
        assert_eq!(cursor.get().unwrap(), t1);
        cursor.move_to_previous();
        assert!(!cursor.is_valid());
        // The bound sits just before the start and is not reachable
        cursor.move_to_previous();
        cursor.move_to_next();
        assert_eq!(cursor.get().unwrap(), t1);
    }

    #[test]
    fn test_empty_range() {
        let mut f = fixture();
        let s = f.add(f.sentence, 0, 2);
        f.add(f.token, 5, 6);

        let mut cursor = f.sub(s, true);
        assert!(!cursor.is_valid());
        assert_eq!(cursor.get(), Err(IteratorError::NoSuchElement));
        cursor.move_to_last();
        assert!(!cursor.is_valid());
    }
}
