//! Type system descriptors
//!
//! A descriptor is the declarative, serializable form of a type system: the
//! user types with their features, enumerated string values and type
//! priority lists. Descriptors are the startup source of committed type
//! systems; they are read from JSON files on disk.
//!
//! Format:
//! ```json
//! {
//!   "types": [
//!     {
//!       "name": "org.example.Token",
//!       "supertype": "uima.tcas.Annotation",
//!       "features": [
//!         { "name": "posTag", "range": "uima.cas.String" },
//!         { "name": "parts", "range": "uima.cas.FSArray", "element_type": "org.example.Token" }
//!       ]
//!     }
//!   ],
//!   "type_priorities": [["org.example.Sentence", "org.example.Token"]]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::builder::TypeSystemBuilder;
use super::builtin::TYPE_NAME_STRING;
use super::errors::{TypeSystemError, TypeSystemResult};
use super::system::TypeSystem;
use super::type_order::TypeOrderPolicy;

/// Declarative type system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSystemDescription {
    /// Declared types, in any order
    #[serde(default)]
    pub types: Vec<TypeDescription>,
    /// Priority lists; earlier entries precede later ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_priorities: Vec<Vec<String>>,
}

/// One declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescription {
    /// Qualified type name
    pub name: String,
    /// Qualified supertype name
    pub supertype: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared features
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<FeatureDescription>,
    /// Allowed values, for enumerated string subtypes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

/// One declared feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDescription {
    /// Short feature name
    pub name: String,
    /// Qualified range type name, `X[]` for arrays of X
    pub range: String,
    /// Element type when `range` is `uima.cas.FSArray`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    /// Whether the value may be shared
    #[serde(default)]
    pub multiple_references_allowed: bool,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TypeDescription {
    /// Create a type description with no features
    pub fn new(name: impl Into<String>, supertype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertype: supertype.into(),
            description: None,
            features: Vec::new(),
            allowed_values: Vec::new(),
        }
    }

    /// Builder-style feature addition
    pub fn with_feature(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.features.push(FeatureDescription {
            name: name.into(),
            range: range.into(),
            element_type: None,
            multiple_references_allowed: false,
            description: None,
        });
        self
    }
}

impl TypeSystemDescription {
    /// Parses a descriptor from JSON.
    pub fn from_json(json: &str) -> TypeSystemResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TypeSystemError::descriptor("<in-memory>", format!("Invalid JSON: {}", e)))
    }

    /// Serializes the descriptor to pretty-printed JSON.
    pub fn to_json(&self) -> TypeSystemResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TypeSystemError::descriptor("<in-memory>", format!("Failed to serialize: {}", e)))
    }

    /// Reads a descriptor file.
    pub fn load(path: &Path) -> TypeSystemResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TypeSystemError::descriptor(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            TypeSystemError::descriptor(path.display().to_string(), format!("Invalid JSON: {}", e))
        })
    }

    /// Declares every type, feature and priority list on `builder`.
    ///
    /// Types may be listed before their supertypes. A built-in type may be
    /// listed to add features to it; its supertype must then match.
    pub fn apply(&self, builder: &mut TypeSystemBuilder) -> TypeSystemResult<()> {
        let mut remaining: Vec<&TypeDescription> = Vec::new();
        for desc in &self.types {
            match builder.type_id(&desc.name) {
                Some(existing) if builder.is_builtin(existing) => {
                    let expected = builder.supertype_name(existing);
                    if expected != Some(desc.supertype.as_str()) {
                        return Err(TypeSystemError::BuiltinRedefinition(desc.name.clone()));
                    }
                }
                _ => remaining.push(desc),
            }
        }

        // Declare in passes so supertypes listed later still resolve
        while !remaining.is_empty() {
            let before = remaining.len();
            let mut deferred = Vec::new();
            for desc in remaining {
                if builder.type_id(&desc.supertype).is_none() {
                    deferred.push(desc);
                    continue;
                }
                if desc.supertype == TYPE_NAME_STRING && !desc.allowed_values.is_empty() {
                    builder.add_string_subtype(&desc.name, desc.allowed_values.clone())?;
                } else {
                    builder.add_type(&desc.name, &desc.supertype)?;
                }
            }
            if deferred.len() == before {
                let first = deferred[0];
                return Err(TypeSystemError::UnknownSupertype {
                    type_name: first.name.clone(),
                    supertype: first.supertype.clone(),
                });
            }
            remaining = deferred;
        }

        for desc in &self.types {
            let domain = builder
                .type_id(&desc.name)
                .ok_or_else(|| TypeSystemError::UnknownType(desc.name.clone()))?;
            for feature in &desc.features {
                builder.declare_feature(
                    domain,
                    &feature.name,
                    &feature.range,
                    feature.element_type.as_deref(),
                    feature.multiple_references_allowed,
                )?;
            }
        }

        for list in &self.type_priorities {
            let names: Vec<&str> = list.iter().map(String::as_str).collect();
            builder.add_type_priorities(&names);
        }
        Ok(())
    }

    /// Builds and commits a type system from this descriptor.
    pub fn build(&self, policy: TypeOrderPolicy) -> TypeSystemResult<TypeSystem> {
        let mut builder = TypeSystemBuilder::new();
        builder.set_type_order_policy(policy);
        self.apply(&mut builder)?;
        builder.commit()
    }
}

impl TypeSystem {
    /// Describes the user-declared part of this type system: non-built-in
    /// types, plus built-in types that were given extra features.
    ///
    /// Typed FS array types are implied by feature ranges and not listed.
    /// Array-valued ranges use the `X[]` spelling.
    pub fn describe(&self) -> TypeSystemDescription {
        let mut types = Vec::new();
        for def in self.types() {
            if def.is_array() || def.supertype().is_none() {
                continue;
            }
            let features: Vec<FeatureDescription> = def
                .declared_features()
                .iter()
                .map(|f| self.feature_def(*f))
                .filter(|f| !f.is_builtin())
                .map(|f| FeatureDescription {
                    name: f.short_name().to_string(),
                    range: self.type_name(f.range()).to_string(),
                    element_type: None,
                    multiple_references_allowed: f.multiple_references_allowed(),
                    description: None,
                })
                .collect();
            if def.is_builtin() && features.is_empty() {
                continue;
            }
            let supertype = def.supertype().map(|s| self.type_name(s)).unwrap_or_default();
            types.push(TypeDescription {
                name: def.name().to_string(),
                supertype: supertype.to_string(),
                description: None,
                features,
                allowed_values: self.allowed_values(def.id()).map(<[String]>::to_vec).unwrap_or_default(),
            });
        }
        TypeSystemDescription {
            types,
            type_priorities: Vec::new(),
        }
    }
}

/// Startup source of a committed type system.
pub trait TypeSystemSource {
    /// Produce the committed type system.
    fn load(&self) -> TypeSystemResult<TypeSystem>;
}

impl TypeSystemSource for TypeSystemDescription {
    fn load(&self) -> TypeSystemResult<TypeSystem> {
        self.build(TypeOrderPolicy::default())
    }
}

/// Reads a descriptor file and commits it.
#[derive(Debug, Clone)]
pub struct FileTypeSystemSource {
    path: PathBuf,
    policy: TypeOrderPolicy,
}

impl FileTypeSystemSource {
    /// Creates a source for the descriptor at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: TypeOrderPolicy::default(),
        }
    }

    /// Overrides the linear type order policy.
    pub fn with_policy(mut self, policy: TypeOrderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the descriptor path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TypeSystemSource for FileTypeSystemSource {
    fn load(&self) -> TypeSystemResult<TypeSystem> {
        TypeSystemDescription::load(&self.path)?.build(self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typesystem::builtin::{TYPE_NAME_ANNOTATION, TYPE_NAME_DOCUMENT_ANNOTATION};
    use std::io::Write;

    fn sample() -> TypeSystemDescription {
        TypeSystemDescription {
            types: vec![
                // Listed before its supertype on purpose
                TypeDescription::new("org.example.Word", "org.example.Token")
                    .with_feature("length", "uima.cas.Integer"),
                TypeDescription::new("org.example.Token", TYPE_NAME_ANNOTATION)
                    .with_feature("posTag", "uima.cas.String"),
            ],
            type_priorities: vec![],
        }
    }

    #[test]
    fn test_out_of_order_declarations() {
        let ts = sample().load().unwrap();
        let word = ts.require_type("org.example.Word").unwrap();
        assert!(ts.feature_by_short_name(word, "posTag").is_some());
        assert!(ts.feature_by_short_name(word, "length").is_some());
    }

    #[test]
    fn test_missing_supertype() {
        let desc = TypeSystemDescription {
            types: vec![TypeDescription::new("org.example.Orphan", "org.example.Nowhere")],
            type_priorities: vec![],
        };
        let err = desc.load().unwrap_err();
        assert_eq!(err.code(), "CAS_TS_UNKNOWN_SUPERTYPE");
    }

    #[test]
    fn test_extend_builtin() {
        let desc = TypeSystemDescription {
            types: vec![TypeDescription::new(TYPE_NAME_DOCUMENT_ANNOTATION, TYPE_NAME_ANNOTATION)
                .with_feature("author", "uima.cas.String")],
            type_priorities: vec![],
        };
        let ts = desc.load().unwrap();
        let doc = ts.builtins().document_annotation;
        assert!(ts.feature_by_short_name(doc, "author").is_some());
    }

    #[test]
    fn test_string_subtype_from_descriptor() {
        let mut pos = TypeDescription::new("org.example.PosValue", TYPE_NAME_STRING);
        pos.allowed_values = vec!["NN".into(), "VB".into()];
        let desc = TypeSystemDescription {
            types: vec![pos],
            type_priorities: vec![],
        };
        let ts = desc.load().unwrap();
        let t = ts.require_type("org.example.PosValue").unwrap();
        assert_eq!(ts.allowed_values(t).map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_describe_rebuilds_equivalent_system() {
        let ts = sample().build(TypeOrderPolicy::default()).unwrap();
        let described = ts.describe();
        let rebuilt = described.build(TypeOrderPolicy::default()).unwrap();
        assert_eq!(rebuilt.type_count(), ts.type_count());
        assert_eq!(rebuilt.feature_count(), ts.feature_count());
        for def in ts.types() {
            assert!(rebuilt.type_by_name(def.name()).is_some(), "{}", def.name());
        }
        assert!(described.types.iter().all(|t| !t.name.ends_with("[]")));
    }

    #[test]
    fn test_json_round_trip() {
        let desc = sample();
        let json = desc.to_json().unwrap();
        assert_eq!(TypeSystemDescription::from_json(&json).unwrap(), desc);
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample().to_json().unwrap().as_bytes()).unwrap();

        let source = FileTypeSystemSource::new(file.path()).with_policy(TypeOrderPolicy::SubtypesFirst);
        let ts = source.load().unwrap();
        let token = ts.require_type("org.example.Token").unwrap();
        let word = ts.require_type("org.example.Word").unwrap();
        assert!(ts.type_order().less_than(word, token));
    }

    #[test]
    fn test_file_source_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = FileTypeSystemSource::new(file.path()).load().unwrap_err();
        assert_eq!(err.code(), "CAS_TS_DESCRIPTOR");
    }
}
