//! Codec options
//!
//! Options only shape the written document. Any document written under any
//! combination of options is readable without knowing the options used.

use serde::{Deserialize, Serialize};

/// Shape of the `%FEATURE_STRUCTURES` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsLayout {
    /// A list of objects, each carrying its own `%ID`.
    #[default]
    Array,
    /// An object keyed by id.
    Map,
}

/// Spelling of array-valued feature ranges in `%TYPES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayRangeEncoding {
    /// `"%RANGE": "X[]"`
    #[default]
    Suffix,
    /// `"%RANGE": "uima.cas.FSArray", "%ELEMENT_TYPE": "X"`
    ElementType,
}

/// Whether the type system travels with the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSystemMode {
    /// Write every user-declared type in `%TYPES`.
    #[default]
    Full,
    /// Omit `%TYPES`; readers supply the type system.
    None,
}

/// Serializer options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecOptions {
    #[serde(default)]
    pub fs_layout: FsLayout,

    #[serde(default)]
    pub array_range_encoding: ArrayRangeEncoding,

    #[serde(default)]
    pub type_system: TypeSystemMode,

    /// Write primitive arrays referenced by exactly one feature inline at the
    /// referring feature instead of as separate feature structures.
    #[serde(default)]
    pub embed_owned_arrays: bool,

    /// Pretty-print the JSON output.
    #[serde(default)]
    pub pretty: bool,

    /// External type system descriptor named in `%TYPE_SYSTEM_REF`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_system_ref: Option<String>,
}

impl CodecOptions {
    /// Builder-style pretty printing toggle
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Builder-style layout selection
    pub fn with_layout(mut self, layout: FsLayout) -> Self {
        self.fs_layout = layout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let options: CodecOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, CodecOptions::default());
        assert_eq!(options.fs_layout, FsLayout::Array);
        assert_eq!(options.array_range_encoding, ArrayRangeEncoding::Suffix);
        assert_eq!(options.type_system, TypeSystemMode::Full);
    }

    #[test]
    fn test_snake_case_values() {
        let options: CodecOptions = serde_json::from_str(
            r#"{"fs_layout": "map", "array_range_encoding": "element_type", "type_system": "none"}"#,
        )
        .unwrap();
        assert_eq!(options.fs_layout, FsLayout::Map);
        assert_eq!(options.array_range_encoding, ArrayRangeEncoding::ElementType);
        assert_eq!(options.type_system, TypeSystemMode::None);

        assert!(serde_json::from_str::<CodecOptions>(r#"{"fs_layout": "tree"}"#).is_err());
    }
}
