//! Index Invariant Tests
//!
//! - SORTED iteration is ordered and reversible
//! - SET indexes keep one element per key
//! - Aggregate size is the sum of the per-type sizes
//! - move_to lands on the first equal or greater element
//! - A subiterator yields the annotations its bound covers

use std::sync::Arc;

use aerocas::cas::{Cas, INITIAL_VIEW};
use aerocas::index::{IndexDescription, IndexKind, KeySpecDescription, SortOrder};
use aerocas::iterator::FsIterator;
use aerocas::store::FsId;
use aerocas::typesystem::builtin::{TYPE_NAME_ANNOTATION, TYPE_NAME_STRING};
use aerocas::typesystem::{TypeId, TypeSystem, TypeSystemBuilder};

// =============================================================================
// Helper Functions
// =============================================================================

fn type_system() -> Arc<TypeSystem> {
    let mut b = TypeSystemBuilder::new();
    let token = b.add_type("org.example.Token", TYPE_NAME_ANNOTATION).unwrap();
    b.add_feature(token, "posTag", TYPE_NAME_STRING).unwrap();
    b.add_type("org.example.Word", "org.example.Token").unwrap();
    b.add_type("org.example.Punct", "org.example.Token").unwrap();
    Arc::new(b.commit().unwrap())
}

fn key(feature: &str, order: SortOrder) -> KeySpecDescription {
    KeySpecDescription {
        feature: feature.to_string(),
        order,
    }
}

fn cas_with(indexes: Vec<IndexDescription>) -> Cas {
    Cas::with_indexes(type_system(), indexes).unwrap()
}

fn token(cas: &mut Cas, type_name: &str, begin: i32, end: i32, pos: &str) -> FsId {
    let t = cas.type_system().require_type(type_name).unwrap();
    let fs = cas.create_annotation(INITIAL_VIEW, t, begin, end).unwrap();
    let pos_tag = cas.type_system().feature_by_short_name(t, "posTag").unwrap();
    cas.store_mut().set_string(fs, pos_tag, Some(pos)).unwrap();
    cas.add_to_indexes(INITIAL_VIEW, fs).unwrap();
    fs
}

fn span(cas: &Cas, fs: FsId) -> (i32, i32) {
    let b = cas.type_system().builtins();
    (cas.store().get_int(fs, b.begin).unwrap(), cas.store().get_int(fs, b.end).unwrap())
}

fn type_id(cas: &Cas, name: &str) -> TypeId {
    cas.type_system().require_type(name).unwrap()
}

// =============================================================================
// SORTED
// =============================================================================

/// Tokens at (0,5), (0,3), (6,9) iterate with end descending breaking the tie.
#[test]
fn test_begin_asc_end_desc() {
    let mut cas = cas_with(vec![IndexDescription {
        name: "Spans".to_string(),
        type_name: TYPE_NAME_ANNOTATION.to_string(),
        kind: IndexKind::Sorted,
        keys: vec![key("begin", SortOrder::Ascending), key("end", SortOrder::Descending)],
    }]);
    token(&mut cas, "org.example.Token", 0, 3, "DT");
    token(&mut cas, "org.example.Token", 6, 9, "NN");
    token(&mut cas, "org.example.Token", 0, 5, "VB");

    let view = cas.initial_view().unwrap();
    let ids: Vec<FsId> = view.indexes().index("Spans").unwrap().iterator().ids().collect();
    let spans: Vec<(i32, i32)> = ids.iter().map(|fs| span(&cas, *fs)).collect();
    assert_eq!(spans, vec![(0, 5), (0, 3), (6, 9)]);
}

/// Backward traversal is the exact reverse of forward traversal.
#[test]
fn test_backward_is_reverse_of_forward() {
    let mut cas = cas_with(Vec::new());
    for (i, t) in ["org.example.Word", "org.example.Punct", "org.example.Token"].iter().enumerate() {
        let i = i as i32;
        token(&mut cas, t, 3 - i, 5, "X");
        token(&mut cas, t, i, i + 1, "X");
    }

    let index = cas.initial_view().unwrap().indexes().annotation_index().unwrap();
    let mut cursor = index.iterator();
    let forward: Vec<FsId> = cursor.ids().collect();
    assert_eq!(forward.len(), 6);

    let spans: Vec<(i32, i32)> = forward.iter().map(|fs| span(&cas, *fs)).collect();
    for pair in spans.windows(2) {
        assert!(pair[0].0 < pair[1].0 || (pair[0].0 == pair[1].0 && pair[0].1 >= pair[1].1));
    }

    cursor.move_to_last();
    let mut backward = Vec::new();
    while cursor.is_valid() {
        backward.push(cursor.get().unwrap());
        cursor.move_to_previous();
    }
    backward.reverse();
    assert_eq!(forward, backward);
}

// =============================================================================
// SET
// =============================================================================

/// Equal keys collapse to the first inserted element.
#[test]
fn test_set_dedup() {
    let mut cas = cas_with(vec![IndexDescription {
        name: "ByPos".to_string(),
        type_name: "org.example.Token".to_string(),
        kind: IndexKind::Set,
        keys: vec![key("posTag", SortOrder::Ascending)],
    }]);
    let first = token(&mut cas, "org.example.Token", 0, 1, "NN");
    for i in 1..5 {
        token(&mut cas, "org.example.Token", i, i + 1, "NN");
    }
    token(&mut cas, "org.example.Token", 9, 10, "VB");

    let t = type_id(&cas, "org.example.Token");
    let view = cas.initial_view().unwrap();
    let leaf = view.indexes().leaf_index("ByPos", t).unwrap();
    assert_eq!(leaf.size(), 2);
    assert_eq!(leaf.iterator().get().unwrap(), first);

    // All six are still view members
    assert_eq!(view.indexes().member_count(), 6);
}

/// move_to finds an equal key, else the least greater one.
#[test]
fn test_set_move_to() {
    let mut cas = cas_with(vec![IndexDescription {
        name: "ByPos".to_string(),
        type_name: "org.example.Token".to_string(),
        kind: IndexKind::Set,
        keys: vec![key("posTag", SortOrder::Ascending)],
    }]);
    let dt = token(&mut cas, "org.example.Token", 0, 1, "DT");
    let vb = token(&mut cas, "org.example.Token", 2, 3, "VB");

    let t = type_id(&cas, "org.example.Token");
    let pos_tag = cas.type_system().feature_by_short_name(t, "posTag").unwrap();
    let template = cas.create_fs(INITIAL_VIEW, t).unwrap();
    cas.store_mut().set_string(template, pos_tag, Some("DT")).unwrap();

    let view = cas.initial_view().unwrap();
    let mut cursor = view.indexes().leaf_index("ByPos", t).unwrap().iterator();
    cursor.move_to(cas.store(), template).unwrap();
    assert_eq!(cursor.get().unwrap(), dt);

    cas.store_mut().set_string(template, pos_tag, Some("NN")).unwrap();
    let view = cas.initial_view().unwrap();
    let mut cursor = view.indexes().leaf_index("ByPos", t).unwrap().iterator();
    cursor.move_to(cas.store(), template).unwrap();
    assert_eq!(cursor.get().unwrap(), vb);

    cas.store_mut().set_string(template, pos_tag, Some("ZZ")).unwrap();
    let view = cas.initial_view().unwrap();
    let mut cursor = view.indexes().leaf_index("ByPos", t).unwrap().iterator();
    cursor.move_to(cas.store(), template).unwrap();
    assert!(!cursor.is_valid());
}

// =============================================================================
// Aggregates
// =============================================================================

#[test]
fn test_aggregate_size_is_sum() {
    let mut cas = cas_with(Vec::new());
    token(&mut cas, "org.example.Token", 0, 1, "X");
    token(&mut cas, "org.example.Word", 1, 2, "X");
    token(&mut cas, "org.example.Word", 2, 3, "X");
    token(&mut cas, "org.example.Punct", 3, 4, "X");

    let (tok, word, punct) = (
        type_id(&cas, "org.example.Token"),
        type_id(&cas, "org.example.Word"),
        type_id(&cas, "org.example.Punct"),
    );
    let indexes = cas.initial_view().unwrap().indexes();
    let leaf = |t| indexes.leaf_index("AnnotationIndex", t).unwrap().size();
    let aggregate = indexes.index_for_type("AnnotationIndex", tok).unwrap();

    assert!(aggregate.is_aggregate());
    assert_eq!(aggregate.size(), leaf(tok) + leaf(word) + leaf(punct));
    assert_eq!(aggregate.size(), 4);
    assert_eq!(aggregate.iterator().ids().count(), 4);
}

#[test]
fn test_unknown_index() {
    let cas = cas_with(Vec::new());
    let err = cas.initial_view().unwrap().indexes().index("Nope").unwrap_err();
    assert_eq!(err.code(), "CAS_INDEX_UNKNOWN");
}

/// Removing by identity leaves equal-keyed elements in place.
#[test]
fn test_remove_by_identity() {
    let mut cas = cas_with(Vec::new());
    let a = token(&mut cas, "org.example.Token", 0, 2, "X");
    let b = token(&mut cas, "org.example.Token", 0, 2, "X");

    assert!(cas.remove_from_indexes(INITIAL_VIEW, a).unwrap());
    assert!(!cas.remove_from_indexes(INITIAL_VIEW, a).unwrap());
    let index = cas.initial_view().unwrap().indexes().annotation_index().unwrap();
    let ids: Vec<FsId> = index.iterator().ids().collect();
    assert_eq!(ids, vec![b]);
}

// =============================================================================
// Subiterator
// =============================================================================

/// A Token (0,10) bound yields the annotations inside it in index order.
/// Equal spans count only when their type ranks after the bound's type.
#[test]
fn test_subiterator_yields_covered_in_index_order() {
    let mut cas = cas_with(Vec::new());
    let wider = token(&mut cas, "org.example.Word", 0, 12, "X");
    let bound = token(&mut cas, "org.example.Token", 0, 10, "S");
    let twin = token(&mut cas, "org.example.Token", 0, 10, "S");
    let same_span = token(&mut cas, "org.example.Word", 0, 10, "X");
    let w1 = token(&mut cas, "org.example.Word", 0, 3, "DT");
    let p = token(&mut cas, "org.example.Punct", 3, 4, ",");
    let w2 = token(&mut cas, "org.example.Word", 5, 10, "NN");
    let outside = token(&mut cas, "org.example.Word", 11, 14, "VB");

    let index = cas.initial_view().unwrap().indexes().annotation_index().unwrap();
    let mut sub = index.subiterator(cas.store(), bound, true).unwrap();
    let forward: Vec<FsId> = sub.ids().collect();
    assert_eq!(forward, vec![same_span, w1, p, w2]);
    for excluded in [wider, bound, twin, outside] {
        assert!(!forward.contains(&excluded));
    }

    sub.move_to_last();
    let mut backward = Vec::new();
    while sub.is_valid() {
        backward.push(sub.get().unwrap());
        sub.move_to_previous();
    }
    backward.reverse();
    assert_eq!(backward, forward);
}

#[test]
fn test_subiterator_strict_skips_overhang() {
    let mut cas = cas_with(Vec::new());
    let bound = token(&mut cas, "org.example.Token", 0, 10, "S");
    let inside = token(&mut cas, "org.example.Word", 5, 10, "NN");
    let overhang = token(&mut cas, "org.example.Word", 8, 12, "VB");
    let later = token(&mut cas, "org.example.Word", 9, 9, "DT");

    let index = cas.initial_view().unwrap().indexes().annotation_index().unwrap();
    let strict: Vec<FsId> = index.subiterator(cas.store(), bound, true).unwrap().ids().collect();
    let loose: Vec<FsId> = index.subiterator(cas.store(), bound, false).unwrap().ids().collect();
    assert_eq!(strict, vec![inside, later]);
    assert_eq!(loose, vec![inside, overhang, later]);

    // Stepping back over a skipped element lands on the one before it
    let mut sub = index.subiterator(cas.store(), bound, true).unwrap();
    sub.move_to_last();
    assert_eq!(sub.get().unwrap(), later);
    sub.move_to_previous();
    assert_eq!(sub.get().unwrap(), inside);
}

/// A subiterator reads its snapshot until repositioned, like any cursor.
#[test]
fn test_subiterator_snapshot_until_repositioned() {
    let mut cas = cas_with(Vec::new());
    let bound = token(&mut cas, "org.example.Token", 0, 10, "S");
    let w = token(&mut cas, "org.example.Word", 4, 6, "NN");

    let mut sub = {
        let index = cas.initial_view().unwrap().indexes().annotation_index().unwrap();
        index.subiterator(cas.store(), bound, true).unwrap()
    };
    let added = token(&mut cas, "org.example.Word", 1, 2, "DT");

    assert!(sub.is_stale());
    assert_eq!(sub.get().unwrap(), w);
    sub.move_to_next();
    assert!(!sub.is_valid());

    sub.move_to_first();
    assert!(!sub.is_stale());
    assert_eq!(sub.ids().collect::<Vec<_>>(), vec![added, w]);
}
