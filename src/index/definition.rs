//! Index definitions

use serde::{Deserialize, Serialize};

use super::comparator::{Comparator, KeySpec, KeySpecDescription};
use super::errors::{IndexError, IndexResult};
use crate::typesystem::{TypeId, TypeKind, TypeSystem};

/// Name of the built-in annotation index present in every view.
pub const ANNOTATION_INDEX: &str = "AnnotationIndex";

/// Ordering and deduplication policy of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Total order by comparator, duplicates allowed.
    Sorted,
    /// One element per distinct key; the first insert wins.
    Set,
    /// Insertion order, no comparator.
    Bag,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Sorted => "sorted",
            IndexKind::Set => "set",
            IndexKind::Bag => "bag",
        }
    }
}

/// A validated index definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    name: String,
    base_type: TypeId,
    kind: IndexKind,
    comparator: Comparator,
}

impl IndexDefinition {
    /// Validates a definition against the type system. BAG indexes ignore
    /// their keys.
    pub fn new(
        ts: &TypeSystem,
        name: impl Into<String>,
        base_type: TypeId,
        kind: IndexKind,
        keys: Vec<KeySpec>,
    ) -> IndexResult<Self> {
        let name = name.into();
        if matches!(
            ts.type_def(base_type).kind(),
            TypeKind::Primitive(_) | TypeKind::StringSubtype { .. }
        ) {
            return Err(IndexError::invalid_key(
                &name,
                format!("primitive type '{}' cannot be indexed", ts.type_name(base_type)),
            ));
        }
        let comparator = match kind {
            IndexKind::Bag => Comparator::default(),
            IndexKind::Sorted | IndexKind::Set => Comparator::new(ts, &name, base_type, keys)?,
        };
        Ok(Self {
            name,
            base_type,
            kind,
            comparator,
        })
    }

    /// The built-in annotation index: SORTED on `begin` ascending, `end`
    /// descending.
    pub fn annotation_index(ts: &TypeSystem) -> IndexResult<Self> {
        let builtins = ts.builtins();
        Self::new(
            ts,
            ANNOTATION_INDEX,
            builtins.annotation,
            IndexKind::Sorted,
            vec![KeySpec::ascending(builtins.begin), KeySpec::descending(builtins.end)],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_type(&self) -> TypeId {
        self.base_type
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }
}

/// Declarative index definition, resolved by name against a type system.
///
/// ```json
/// { "name": "TokenByPos", "type_name": "org.example.Token", "kind": "set",
///   "keys": [{ "feature": "posTag" }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub type_name: String,
    pub kind: IndexKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<KeySpecDescription>,
}

impl IndexDescription {
    /// Resolves type and feature names.
    pub fn resolve(&self, ts: &TypeSystem) -> IndexResult<IndexDefinition> {
        let base = ts.type_by_name(&self.type_name).ok_or_else(|| {
            IndexError::invalid_key(&self.name, format!("unknown type '{}'", self.type_name))
        })?;
        let comparator = match self.kind {
            IndexKind::Bag => Comparator::default(),
            _ => Comparator::from_descriptions(ts, &self.name, base, &self.keys)?,
        };
        IndexDefinition::new(ts, &self.name, base, self.kind, comparator.keys().to_vec())
    }
}
