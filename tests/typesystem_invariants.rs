//! Type System Invariant Tests
//!
//! - Subsumption is reflexive and transitive
//! - Final types reject subtypes and new features
//! - Feature structures expose every inherited feature with its default

use std::sync::Arc;

use aerocas::store::{Store, Value};
use aerocas::typesystem::builtin::{
    TYPE_NAME_ANNOTATION, TYPE_NAME_INTEGER, TYPE_NAME_INTEGER_ARRAY, TYPE_NAME_STRING, TYPE_NAME_TOP,
};
use aerocas::typesystem::{TypeOrderPolicy, TypeSystem, TypeSystemBuilder, TypeSystemDescription};

// =============================================================================
// Helper Functions
// =============================================================================

fn linguistic_types() -> TypeSystem {
    let mut b = TypeSystemBuilder::new();
    let token = b.add_type("org.example.Token", TYPE_NAME_ANNOTATION).unwrap();
    b.add_feature(token, "posTag", TYPE_NAME_STRING).unwrap();
    b.add_feature(token, "length", TYPE_NAME_INTEGER).unwrap();
    let word = b.add_type("org.example.Word", "org.example.Token").unwrap();
    b.add_feature(word, "lemma", TYPE_NAME_STRING).unwrap();
    b.add_type("org.example.Sentence", TYPE_NAME_ANNOTATION).unwrap();
    b.add_string_subtype("org.example.Gender", vec!["m".into(), "f".into()]).unwrap();
    b.commit().unwrap()
}

// =============================================================================
// Subsumption
// =============================================================================

/// Every type subsumes itself.
#[test]
fn test_subsumption_reflexive() {
    let ts = linguistic_types();
    for def in ts.types() {
        assert!(ts.is_subtype(def.id(), def.id()), "{}", def.name());
    }
}

/// sub <= mid and mid <= sup implies sub <= sup, for every triple.
#[test]
fn test_subsumption_transitive() {
    let ts = linguistic_types();
    let ids: Vec<_> = ts.types().map(|d| d.id()).collect();
    for &a in &ids {
        for &b in &ids {
            if !ts.is_subtype(a, b) {
                continue;
            }
            for &c in &ids {
                if ts.is_subtype(b, c) {
                    assert!(ts.is_subtype(a, c));
                }
            }
        }
    }
}

/// TOP subsumes everything.
#[test]
fn test_single_root() {
    let ts = linguistic_types();
    let top = ts.require_type(TYPE_NAME_TOP).unwrap();
    assert!(ts.types().all(|d| ts.subsumes(top, d.id())));
}

// =============================================================================
// Final Types
// =============================================================================

#[test]
fn test_array_and_string_subtypes_are_final() {
    let mut b = TypeSystemBuilder::new();
    b.add_string_subtype("org.example.Gender", vec!["m".into()]).unwrap();

    let err = b.add_type("org.example.Sub", "org.example.Gender").unwrap_err();
    assert_eq!(err.code(), "CAS_TS_FINAL_TYPE");
    let err = b.add_type("org.example.Ints", TYPE_NAME_INTEGER_ARRAY).unwrap_err();
    assert_eq!(err.code(), "CAS_TS_FINAL_TYPE");

    let ints = b.type_id(TYPE_NAME_INTEGER_ARRAY).unwrap();
    let err = b.add_feature(ints, "extra", TYPE_NAME_INTEGER).unwrap_err();
    assert_eq!(err.code(), "CAS_TS_FINAL_TYPE");
}

#[test]
fn test_feature_redeclared_in_subtype_is_rejected() {
    let mut b = TypeSystemBuilder::new();
    let token = b.add_type("org.example.Token", TYPE_NAME_ANNOTATION).unwrap();
    let word = b.add_type("org.example.Word", "org.example.Token").unwrap();
    b.add_feature(token, "posTag", TYPE_NAME_STRING).unwrap();

    let err = b.add_feature(word, "posTag", TYPE_NAME_INTEGER).unwrap_err();
    assert_eq!(err.code(), "CAS_TS_DUPLICATE_FEATURE");
}

// =============================================================================
// Feature Structures
// =============================================================================

/// A fresh FS has its own type and default values for inherited features.
#[test]
fn test_created_fs_has_defaults() {
    let ts = Arc::new(linguistic_types());
    let mut store = Store::new(ts.clone());
    let word = ts.require_type("org.example.Word").unwrap();
    let fs = store.create(word).unwrap();

    assert_eq!(store.type_of(fs).unwrap(), word);
    for &f in ts.features_of(word) {
        let value = store.get(fs, f).unwrap();
        let kind = ts.primitive_kind(ts.feature_def(f).range());
        assert_eq!(*value, Value::default_for(kind), "{}", ts.feature_def(f).name());
    }
    let begin = ts.builtins().begin;
    assert_eq!(store.get_int(fs, begin).unwrap(), 0);
}

// =============================================================================
// Descriptors and Type Order
// =============================================================================

#[test]
fn test_descriptor_roundtrip_preserves_features() {
    let ts = linguistic_types();
    let json = ts.describe().to_json().unwrap();
    let rebuilt = TypeSystemDescription::from_json(&json)
        .unwrap()
        .build(TypeOrderPolicy::default())
        .unwrap();

    for name in ["org.example.Token", "org.example.Word", "org.example.Sentence", "org.example.Gender"] {
        let a = ts.require_type(name).unwrap();
        let b = rebuilt.require_type(name).unwrap();
        assert_eq!(ts.features_of(a).len(), rebuilt.features_of(b).len(), "{}", name);
    }
    let gender = rebuilt.require_type("org.example.Gender").unwrap();
    assert_eq!(rebuilt.allowed_values(gender).unwrap(), ["m".to_string(), "f".to_string()]);
}

#[test]
fn test_type_order_policies() {
    let mut pre = TypeSystemBuilder::new();
    pre.add_type("org.example.Token", TYPE_NAME_ANNOTATION).unwrap();
    let pre = pre.commit().unwrap();

    let mut post = TypeSystemBuilder::new();
    post.set_type_order_policy(TypeOrderPolicy::SubtypesFirst);
    post.add_type("org.example.Token", TYPE_NAME_ANNOTATION).unwrap();
    let post = post.commit().unwrap();

    let (ann, tok) = (pre.builtins().annotation, pre.require_type("org.example.Token").unwrap());
    assert!(pre.type_order().less_than(ann, tok));
    let (ann, tok) = (post.builtins().annotation, post.require_type("org.example.Token").unwrap());
    assert!(post.type_order().less_than(tok, ann));
}
