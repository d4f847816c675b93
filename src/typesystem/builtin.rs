//! Built-in types
//!
//! The primitive scalars, their array forms, the singly-linked list families,
//! and the sofa/annotation types are registered in every type system before
//! any user declaration and cannot be redefined.

use super::builder::TypeSystemBuilder;
use super::types::{ArrayElement, FeatureId, PrimitiveKind, TypeId, TypeKind};

pub const TYPE_NAME_TOP: &str = "uima.cas.TOP";

pub const TYPE_NAME_BOOLEAN: &str = "uima.cas.Boolean";
pub const TYPE_NAME_BYTE: &str = "uima.cas.Byte";
pub const TYPE_NAME_SHORT: &str = "uima.cas.Short";
pub const TYPE_NAME_INTEGER: &str = "uima.cas.Integer";
pub const TYPE_NAME_LONG: &str = "uima.cas.Long";
pub const TYPE_NAME_FLOAT: &str = "uima.cas.Float";
pub const TYPE_NAME_DOUBLE: &str = "uima.cas.Double";
pub const TYPE_NAME_STRING: &str = "uima.cas.String";

pub const TYPE_NAME_ARRAY_BASE: &str = "uima.cas.ArrayBase";
pub const TYPE_NAME_BOOLEAN_ARRAY: &str = "uima.cas.BooleanArray";
pub const TYPE_NAME_BYTE_ARRAY: &str = "uima.cas.ByteArray";
pub const TYPE_NAME_SHORT_ARRAY: &str = "uima.cas.ShortArray";
pub const TYPE_NAME_INTEGER_ARRAY: &str = "uima.cas.IntegerArray";
pub const TYPE_NAME_LONG_ARRAY: &str = "uima.cas.LongArray";
pub const TYPE_NAME_FLOAT_ARRAY: &str = "uima.cas.FloatArray";
pub const TYPE_NAME_DOUBLE_ARRAY: &str = "uima.cas.DoubleArray";
pub const TYPE_NAME_STRING_ARRAY: &str = "uima.cas.StringArray";
pub const TYPE_NAME_FS_ARRAY: &str = "uima.cas.FSArray";

pub const TYPE_NAME_LIST_BASE: &str = "uima.cas.ListBase";
pub const TYPE_NAME_FS_LIST: &str = "uima.cas.FSList";
pub const TYPE_NAME_EMPTY_FS_LIST: &str = "uima.cas.EmptyFSList";
pub const TYPE_NAME_NON_EMPTY_FS_LIST: &str = "uima.cas.NonEmptyFSList";
pub const TYPE_NAME_INTEGER_LIST: &str = "uima.cas.IntegerList";
pub const TYPE_NAME_EMPTY_INTEGER_LIST: &str = "uima.cas.EmptyIntegerList";
pub const TYPE_NAME_NON_EMPTY_INTEGER_LIST: &str = "uima.cas.NonEmptyIntegerList";
pub const TYPE_NAME_FLOAT_LIST: &str = "uima.cas.FloatList";
pub const TYPE_NAME_EMPTY_FLOAT_LIST: &str = "uima.cas.EmptyFloatList";
pub const TYPE_NAME_NON_EMPTY_FLOAT_LIST: &str = "uima.cas.NonEmptyFloatList";
pub const TYPE_NAME_STRING_LIST: &str = "uima.cas.StringList";
pub const TYPE_NAME_EMPTY_STRING_LIST: &str = "uima.cas.EmptyStringList";
pub const TYPE_NAME_NON_EMPTY_STRING_LIST: &str = "uima.cas.NonEmptyStringList";

pub const TYPE_NAME_SOFA: &str = "uima.cas.Sofa";
pub const TYPE_NAME_ANNOTATION_BASE: &str = "uima.cas.AnnotationBase";
pub const TYPE_NAME_ANNOTATION: &str = "uima.tcas.Annotation";
pub const TYPE_NAME_DOCUMENT_ANNOTATION: &str = "uima.tcas.DocumentAnnotation";

pub const FEATURE_BASE_NAME_HEAD: &str = "head";
pub const FEATURE_BASE_NAME_TAIL: &str = "tail";
pub const FEATURE_BASE_NAME_SOFANUM: &str = "sofaNum";
pub const FEATURE_BASE_NAME_SOFAID: &str = "sofaID";
pub const FEATURE_BASE_NAME_SOFAMIME: &str = "mimeType";
pub const FEATURE_BASE_NAME_SOFAARRAY: &str = "sofaArray";
pub const FEATURE_BASE_NAME_SOFASTRING: &str = "sofaString";
pub const FEATURE_BASE_NAME_SOFAURI: &str = "sofaURI";
pub const FEATURE_BASE_NAME_SOFA: &str = "sofa";
pub const FEATURE_BASE_NAME_BEGIN: &str = "begin";
pub const FEATURE_BASE_NAME_END: &str = "end";
pub const FEATURE_BASE_NAME_LANGUAGE: &str = "language";

/// Suffix marking an array-of-X range name, e.g. `my.Token[]`.
pub const ARRAY_TYPE_SUFFIX: &str = "[]";

/// Registers every built-in type and feature on a fresh builder.
pub(crate) fn register(builder: &mut TypeSystemBuilder) {
    let top = builder.push_builtin(TYPE_NAME_TOP, None, TypeKind::Top, true, false);

    let primitive_names = [
        TYPE_NAME_BOOLEAN,
        TYPE_NAME_BYTE,
        TYPE_NAME_SHORT,
        TYPE_NAME_INTEGER,
        TYPE_NAME_LONG,
        TYPE_NAME_FLOAT,
        TYPE_NAME_DOUBLE,
        TYPE_NAME_STRING,
    ];
    for (name, kind) in primitive_names.iter().zip(PrimitiveKind::ALL) {
        // String stays open so enumerated string subtypes can hang off it
        let is_final = kind != PrimitiveKind::String;
        builder.push_builtin(name, Some(top), TypeKind::Primitive(kind), false, is_final);
    }

    let array_base = builder.push_builtin(TYPE_NAME_ARRAY_BASE, Some(top), TypeKind::Abstract, false, true);
    let array_names = [
        TYPE_NAME_BOOLEAN_ARRAY,
        TYPE_NAME_BYTE_ARRAY,
        TYPE_NAME_SHORT_ARRAY,
        TYPE_NAME_INTEGER_ARRAY,
        TYPE_NAME_LONG_ARRAY,
        TYPE_NAME_FLOAT_ARRAY,
        TYPE_NAME_DOUBLE_ARRAY,
        TYPE_NAME_STRING_ARRAY,
    ];
    for (name, kind) in array_names.iter().zip(PrimitiveKind::ALL) {
        builder.push_builtin(
            name,
            Some(array_base),
            TypeKind::Array(ArrayElement::Primitive(kind)),
            false,
            true,
        );
    }
    builder.push_builtin(
        TYPE_NAME_FS_ARRAY,
        Some(array_base),
        TypeKind::Array(ArrayElement::Fs(top)),
        false,
        true,
    );

    let list_base = builder.push_builtin(TYPE_NAME_LIST_BASE, Some(top), TypeKind::Abstract, false, true);
    let families = [
        (TYPE_NAME_FS_LIST, TYPE_NAME_EMPTY_FS_LIST, TYPE_NAME_NON_EMPTY_FS_LIST, TYPE_NAME_TOP),
        (
            TYPE_NAME_INTEGER_LIST,
            TYPE_NAME_EMPTY_INTEGER_LIST,
            TYPE_NAME_NON_EMPTY_INTEGER_LIST,
            TYPE_NAME_INTEGER,
        ),
        (
            TYPE_NAME_FLOAT_LIST,
            TYPE_NAME_EMPTY_FLOAT_LIST,
            TYPE_NAME_NON_EMPTY_FLOAT_LIST,
            TYPE_NAME_FLOAT,
        ),
        (
            TYPE_NAME_STRING_LIST,
            TYPE_NAME_EMPTY_STRING_LIST,
            TYPE_NAME_NON_EMPTY_STRING_LIST,
            TYPE_NAME_STRING,
        ),
    ];
    for (list, empty, non_empty, head_range) in families {
        let list_id = builder.push_builtin(list, Some(list_base), TypeKind::Abstract, false, true);
        builder.push_builtin(empty, Some(list_id), TypeKind::Regular, true, true);
        let cell = builder.push_builtin(non_empty, Some(list_id), TypeKind::Regular, true, true);
        builder.push_builtin_feature(cell, FEATURE_BASE_NAME_HEAD, head_range, true);
        builder.push_builtin_feature(cell, FEATURE_BASE_NAME_TAIL, list, true);
    }

    let sofa = builder.push_builtin(TYPE_NAME_SOFA, Some(top), TypeKind::Regular, false, true);
    builder.push_builtin_feature(sofa, FEATURE_BASE_NAME_SOFANUM, TYPE_NAME_INTEGER, false);
    builder.push_builtin_feature(sofa, FEATURE_BASE_NAME_SOFAID, TYPE_NAME_STRING, false);
    builder.push_builtin_feature(sofa, FEATURE_BASE_NAME_SOFAMIME, TYPE_NAME_STRING, false);
    builder.push_builtin_feature(sofa, FEATURE_BASE_NAME_SOFAARRAY, TYPE_NAME_TOP, true);
    builder.push_builtin_feature(sofa, FEATURE_BASE_NAME_SOFASTRING, TYPE_NAME_STRING, false);
    builder.push_builtin_feature(sofa, FEATURE_BASE_NAME_SOFAURI, TYPE_NAME_STRING, false);

    let annotation_base =
        builder.push_builtin(TYPE_NAME_ANNOTATION_BASE, Some(top), TypeKind::Regular, true, false);
    builder.push_builtin_feature(annotation_base, FEATURE_BASE_NAME_SOFA, TYPE_NAME_SOFA, true);

    let annotation = builder.push_builtin(
        TYPE_NAME_ANNOTATION,
        Some(annotation_base),
        TypeKind::Regular,
        true,
        false,
    );
    builder.push_builtin_feature(annotation, FEATURE_BASE_NAME_BEGIN, TYPE_NAME_INTEGER, false);
    builder.push_builtin_feature(annotation, FEATURE_BASE_NAME_END, TYPE_NAME_INTEGER, false);

    let document = builder.push_builtin(
        TYPE_NAME_DOCUMENT_ANNOTATION,
        Some(annotation),
        TypeKind::Regular,
        true,
        false,
    );
    builder.push_builtin_feature(document, FEATURE_BASE_NAME_LANGUAGE, TYPE_NAME_STRING, false);
}

/// Handles of the built-in types and features most code needs.
#[derive(Debug, Clone)]
pub struct BuiltinTypes {
    pub top: TypeId,
    pub string: TypeId,
    pub fs_array: TypeId,
    pub sofa: TypeId,
    pub annotation_base: TypeId,
    pub annotation: TypeId,
    pub document_annotation: TypeId,
    pub sofa_num: FeatureId,
    pub sofa_id: FeatureId,
    pub sofa_mime: FeatureId,
    pub sofa_array: FeatureId,
    pub sofa_string: FeatureId,
    pub sofa_uri: FeatureId,
    pub sofa_ref: FeatureId,
    pub begin: FeatureId,
    pub end: FeatureId,
    pub language: FeatureId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_starts_at_top() {
        let mut builder = TypeSystemBuilder::new();
        assert!(builder.type_id(TYPE_NAME_TOP).is_some());
        assert_eq!(builder.type_id(TYPE_NAME_TOP).map(|t| t.index()), Some(0));
        assert!(builder.type_id(TYPE_NAME_DOCUMENT_ANNOTATION).is_some());
        // registering twice is never done; the builder constructor does it once
        assert!(builder.add_type(TYPE_NAME_ANNOTATION, TYPE_NAME_TOP).is_err());
    }
}
