//! Wire document model
//!
//! Objects keep their key order in both directions so type declarations,
//! views and feature structures are read back in the order written.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::names;

/// A JSON object as an ordered list of entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Object<V = Value>(pub Vec<(String, V)>);

impl<V> Default for Object<V> {
    fn default() -> Self {
        Object(Vec::new())
    }
}

impl<V> Object<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: V) {
        self.0.push((key.into(), value));
    }

    /// First entry named `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Serialize> Serialize for Object<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Object<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObjectVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for ObjectVisitor<V> {
            type Value = Object<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Object<V>, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, V>()? {
                    entries.push(entry);
                }
                Ok(Object(entries))
            }
        }

        deserializer.deserialize_map(ObjectVisitor(PhantomData))
    }
}

/// One entry of `%VIEWS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireView {
    #[serde(rename = "%SOFA")]
    pub sofa: u64,
    #[serde(rename = "%INDEX", default)]
    pub index: Vec<u64>,
}

/// The `%FEATURE_STRUCTURES` section in either layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FsSection {
    Array(Vec<Object>),
    Map(Object<Object>),
}

impl Default for FsSection {
    fn default() -> Self {
        FsSection::Array(Vec::new())
    }
}

impl FsSection {
    /// Entries as `(id, object)`; map layout entries take their id from the
    /// key and are ordered by id.
    pub fn into_entries(self) -> Result<Vec<(Option<u64>, Object)>, String> {
        match self {
            FsSection::Array(list) => Ok(list.into_iter().map(|o| (None, o)).collect()),
            FsSection::Map(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, object) in map.0 {
                    let id = key
                        .parse::<u64>()
                        .map_err(|_| format!("feature structure key '{}' is not an id", key))?;
                    entries.push((Some(id), object));
                }
                entries.sort_by_key(|(id, _)| *id);
                Ok(entries)
            }
        }
    }
}

/// A whole JSON CAS document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireDocument {
    #[serde(rename = "%TYPE_SYSTEM_REF", default, skip_serializing_if = "Option::is_none")]
    pub type_system_ref: Option<String>,

    #[serde(rename = "%TYPES", default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Object<Object>>,

    #[serde(rename = "%VIEWS", default)]
    pub views: Object<WireView>,

    #[serde(rename = "%FEATURE_STRUCTURES", default)]
    pub feature_structures: FsSection,
}

/// Splits a feature key into its short name and whether it is `@`-prefixed.
pub fn feature_key(key: &str) -> (&str, bool) {
    match key.strip_prefix(names::REF_PREFIX) {
        Some(short) => (short, true),
        None => (key, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_keeps_key_order() {
        let object: Object = serde_json::from_str(r#"{"b": 1, "a": 2, "c": 3}"#).unwrap();
        let keys: Vec<&str> = object.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(serde_json::to_string(&object).unwrap(), r#"{"b":1,"a":2,"c":3}"#);
    }

    #[test]
    fn test_fs_section_layouts() {
        let array: FsSection = serde_json::from_value(json!([{"%ID": 1, "%TYPE": "uima.cas.TOP"}])).unwrap();
        assert!(matches!(array, FsSection::Array(ref l) if l.len() == 1));

        let map: FsSection = serde_json::from_value(json!({
            "10": {"%TYPE": "uima.cas.TOP"},
            "2": {"%TYPE": "uima.cas.TOP"}
        }))
        .unwrap();
        let ids: Vec<Option<u64>> = map.into_entries().unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![Some(2), Some(10)]);
    }

    #[test]
    fn test_map_layout_rejects_non_numeric_keys() {
        let map: FsSection = serde_json::from_value(json!({"x": {}})).unwrap();
        assert!(map.into_entries().is_err());
    }

    #[test]
    fn test_document_defaults() {
        let doc: WireDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.types.is_none());
        assert!(doc.views.is_empty());
        assert_eq!(doc.feature_structures, FsSection::Array(Vec::new()));
    }

    #[test]
    fn test_feature_key() {
        assert_eq!(feature_key("@sofa"), ("sofa", true));
        assert_eq!(feature_key("begin"), ("begin", false));
    }
}
