//! Codec Round-Trip Tests
//!
//! Deserializing a serialized CAS gives back the same graph: types,
//! feature values, reference topology and view membership. Feature
//! structures are compared structurally since ids are reassigned on read.

use std::sync::Arc;

use aerocas::cas::{Cas, INITIAL_VIEW};
use aerocas::codec::{
    deserialize_from_str, serialize_to_string, serialize_to_value, ArrayRangeEncoding, CasDeserializer,
    CodecOptions, FsLayout, TypeSystemMode,
};
use aerocas::store::{FsId, Value};
use aerocas::typesystem::builtin::{
    TYPE_NAME_ANNOTATION, TYPE_NAME_BYTE, TYPE_NAME_DOUBLE, TYPE_NAME_INTEGER, TYPE_NAME_STRING,
};
use aerocas::typesystem::{TypeSystem, TypeSystemBuilder};

// =============================================================================
// Helper Functions
// =============================================================================

const TRANSLATION: &str = "translation";

fn type_system() -> Arc<TypeSystem> {
    let mut b = TypeSystemBuilder::new();
    b.add_string_subtype("org.example.Gender", vec!["m".into(), "f".into(), "n".into()])
        .unwrap();
    let token = b.add_type("org.example.Token", TYPE_NAME_ANNOTATION).unwrap();
    b.add_feature(token, "posTag", TYPE_NAME_STRING).unwrap();
    b.add_feature(token, "gender", "org.example.Gender").unwrap();
    b.add_feature(token, "score", TYPE_NAME_DOUBLE).unwrap();
    b.add_feature(token, "head", "org.example.Token").unwrap();
    b.add_feature(token, "children", "org.example.Token[]").unwrap();
    b.add_feature(token, "offsets", "uima.cas.Integer[]").unwrap();
    b.add_feature(token, "raw", "uima.cas.Byte[]").unwrap();
    Arc::new(b.commit().unwrap())
}

/// Two views, a reference cycle, typed and primitive arrays, special floats.
fn sample() -> Cas {
    let ts = type_system();
    let token = ts.require_type("org.example.Token").unwrap();
    let feature = |name: &str| ts.feature_by_short_name(token, name).unwrap();

    let mut cas = Cas::new(ts.clone()).unwrap();
    cas.set_document_text(INITIAL_VIEW, "Der Hund bellt").unwrap();
    cas.set_document_language(INITIAL_VIEW, "de").unwrap();

    let der = cas.create_annotation(INITIAL_VIEW, token, 0, 3).unwrap();
    let hund = cas.create_annotation(INITIAL_VIEW, token, 4, 8).unwrap();
    let bellt = cas.create_annotation(INITIAL_VIEW, token, 9, 14).unwrap();
    {
        let store = cas.store_mut();
        store.set_string(der, feature("posTag"), Some("ART")).unwrap();
        store.set_string(hund, feature("posTag"), Some("NN")).unwrap();
        store.set_string(hund, feature("gender"), Some("m")).unwrap();
        store.set_double(hund, feature("score"), f64::NAN).unwrap();
        store.set_double(bellt, feature("score"), f64::NEG_INFINITY).unwrap();
        store.set_double(der, feature("score"), 0.25).unwrap();

        // der -> hund -> der
        store.set_ref(der, feature("head"), Some(hund)).unwrap();
        store.set_ref(hund, feature("head"), Some(der)).unwrap();

        let children = store.create_array(token, 2).unwrap();
        store.array_set(children, 0, Value::from(der)).unwrap();
        store.array_set(children, 1, Value::from(bellt)).unwrap();
        store.set_ref(hund, feature("children"), Some(children)).unwrap();

        let integer = ts.require_type(TYPE_NAME_INTEGER).unwrap();
        let offsets = store.create_array(integer, 3).unwrap();
        for (i, v) in [4, 8, -1].into_iter().enumerate() {
            store.array_set(offsets, i, Value::Integer(v)).unwrap();
        }
        store.set_ref(bellt, feature("offsets"), Some(offsets)).unwrap();

        let byte = ts.require_type(TYPE_NAME_BYTE).unwrap();
        let raw = store.create_array(byte, 3).unwrap();
        for (i, v) in [0i8, 1, -1].into_iter().enumerate() {
            store.array_set(raw, i, Value::Byte(v)).unwrap();
        }
        store.set_ref(der, feature("raw"), Some(raw)).unwrap();
    }
    for fs in [der, hund, bellt] {
        cas.add_to_indexes(INITIAL_VIEW, fs).unwrap();
    }

    cas.create_view(TRANSLATION).unwrap();
    cas.set_document_text(TRANSLATION, "The dog barks").unwrap();
    let dog = cas.create_annotation(TRANSLATION, token, 4, 7).unwrap();
    cas.store_mut().set_string(dog, feature("posTag"), Some("NN")).unwrap();
    cas.add_to_indexes(TRANSLATION, dog).unwrap();
    cas
}

fn render(cas: &Cas, value: &Value, depth: usize) -> String {
    match value {
        Value::Ref(Some(target)) if depth > 0 => describe(cas, *target, depth - 1),
        Value::Ref(Some(_)) => "ref".to_string(),
        other => format!("{:?}", other),
    }
}

/// Type name plus every slot, following references a few levels deep.
fn describe(cas: &Cas, fs: FsId, depth: usize) -> String {
    let ts = cas.type_system();
    let store = cas.store();
    let t = store.type_of(fs).unwrap();
    let def = ts.type_def(t);

    let mut out = format!("{}(", def.name());
    if def.is_array() {
        for value in store.array_values(fs).unwrap() {
            out.push_str(&render(cas, &value, depth));
            out.push(',');
        }
    } else {
        for &f in ts.features_of(t) {
            let value = store.get(fs, f).unwrap();
            out.push_str(&format!("{}={},", ts.feature_def(f).name(), render(cas, value, depth)));
        }
    }
    out.push(')');
    out
}

/// Per view, in name order: the sorted descriptions of its members.
fn shape(cas: &Cas) -> Vec<(String, Vec<String>)> {
    cas.views()
        .map(|view| {
            let mut members: Vec<String> = view.indexes().members().map(|fs| describe(cas, fs, 3)).collect();
            members.sort();
            (view.name().to_string(), members)
        })
        .collect()
}

fn assert_roundtrip(options: &CodecOptions) {
    let original = sample();
    let json = serialize_to_string(&original, options).unwrap();
    let restored = deserialize_from_str(&json).unwrap();
    assert_eq!(shape(&original), shape(&restored), "options: {:?}", options);
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_roundtrip_default_options() {
    assert_roundtrip(&CodecOptions::default());
}

#[test]
fn test_roundtrip_map_layout() {
    assert_roundtrip(&CodecOptions::default().with_layout(FsLayout::Map));
}

#[test]
fn test_roundtrip_element_type_ranges() {
    assert_roundtrip(&CodecOptions {
        array_range_encoding: ArrayRangeEncoding::ElementType,
        ..CodecOptions::default()
    });
}

#[test]
fn test_roundtrip_embedded_arrays() {
    assert_roundtrip(&CodecOptions {
        embed_owned_arrays: true,
        pretty: true,
        ..CodecOptions::default()
    });
}

/// Without %TYPES the reader needs the type system from the caller.
#[test]
fn test_roundtrip_external_type_system() {
    let original = sample();
    let options = CodecOptions {
        type_system: TypeSystemMode::None,
        ..CodecOptions::default()
    };
    let json = serialize_to_string(&original, &options).unwrap();

    let restored = CasDeserializer::new()
        .with_type_system(original.type_system().clone())
        .read_str(&json)
        .unwrap();
    assert_eq!(shape(&original), shape(&restored));

    let err = deserialize_from_str(&json).unwrap_err();
    assert_eq!(err.code(), "CAS_CODEC_UNKNOWN_TYPE");
}

#[test]
fn test_views_and_document_annotations_restored() {
    let original = sample();
    let json = serialize_to_string(&original, &CodecOptions::default()).unwrap();
    let restored = deserialize_from_str(&json).unwrap();

    assert_eq!(restored.document_text(INITIAL_VIEW).unwrap(), Some("Der Hund bellt"));
    assert_eq!(restored.document_text(TRANSLATION).unwrap(), Some("The dog barks"));
    assert_eq!(restored.document_language(INITIAL_VIEW).unwrap(), Some("de"));
    assert_eq!(restored.view(TRANSLATION).unwrap().sofa_num(), 2);
    assert!(restored.view(TRANSLATION).unwrap().document_annotation().is_some());
    assert_eq!(restored.metrics().snapshot().documents_deserialized, 1);
}

// =============================================================================
// Determinism and Failures
// =============================================================================

#[test]
fn test_serialization_is_deterministic() {
    let cas = sample();
    let options = CodecOptions::default();
    assert_eq!(
        serialize_to_string(&cas, &options).unwrap(),
        serialize_to_string(&cas, &options).unwrap()
    );
}

#[test]
fn test_unresolved_reference_aborts() {
    let cas = sample();
    let mut doc = serialize_to_value(&cas, &CodecOptions::default()).unwrap();
    let structures = doc["%FEATURE_STRUCTURES"].as_array_mut().unwrap();
    let token = structures
        .iter_mut()
        .find(|fs| fs["%TYPE"] == "org.example.Token" && fs.get("@head").is_some())
        .unwrap();
    token["@head"] = serde_json::json!(9999);

    let err = deserialize_from_str(&doc.to_string()).unwrap_err();
    assert_eq!(err.code(), "CAS_CODEC_UNRESOLVED_REFERENCE");
}

#[test]
fn test_malformed_document() {
    let err = deserialize_from_str("[1, 2, 3]").unwrap_err();
    assert!(matches!(err.code(), "CAS_CODEC_JSON" | "CAS_CODEC_MALFORMED"));
}
