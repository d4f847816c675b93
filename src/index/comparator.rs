//! Comparator engine
//!
//! A comparator is an ordered list of (feature, direction) keys. Comparing
//! two feature structures evaluates keys left to right and stops at the
//! first difference. The id tie-break that makes the underlying collection
//! strictly ordered is added by the index entry, never here, so equality
//! under a comparator is always id-free.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::errors::{IndexError, IndexResult};
use super::key::{IndexKey, KeyComponent, KeyValue, SortOrder};
use crate::store::{FsId, Store};
use crate::typesystem::{FeatureId, TypeId, TypeSystem};

/// One comparator key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub feature: FeatureId,
    pub order: SortOrder,
}

impl KeySpec {
    pub fn ascending(feature: FeatureId) -> Self {
        Self {
            feature,
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(feature: FeatureId) -> Self {
        Self {
            feature,
            order: SortOrder::Descending,
        }
    }
}

/// Named form of a key, as written in descriptors and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpecDescription {
    /// Short feature name on the index's base type
    pub feature: String,
    #[serde(default)]
    pub order: SortOrder,
}

/// Composite multi-key comparator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparator {
    keys: Vec<KeySpec>,
}

impl Comparator {
    /// Builds a comparator for indexes over `base`, checking that every
    /// key feature is defined on it.
    pub fn new(ts: &TypeSystem, index_name: &str, base: TypeId, keys: Vec<KeySpec>) -> IndexResult<Self> {
        for key in &keys {
            if !ts.is_appropriate(base, key.feature) {
                return Err(IndexError::invalid_key(
                    index_name,
                    format!(
                        "feature '{}' is not defined on '{}'",
                        ts.feature_def(key.feature).name(),
                        ts.type_name(base)
                    ),
                ));
            }
            if ts.type_def(ts.feature_def(key.feature).range()).is_array() {
                return Err(IndexError::invalid_key(
                    index_name,
                    format!("array-valued feature '{}' cannot be a key", ts.feature_def(key.feature).name()),
                ));
            }
        }
        Ok(Self { keys })
    }

    /// Resolves named keys against `base`.
    pub fn from_descriptions(
        ts: &TypeSystem,
        index_name: &str,
        base: TypeId,
        keys: &[KeySpecDescription],
    ) -> IndexResult<Self> {
        let mut specs = Vec::with_capacity(keys.len());
        for key in keys {
            let feature = ts.feature_by_short_name(base, &key.feature).ok_or_else(|| {
                IndexError::invalid_key(
                    index_name,
                    format!("no feature '{}' on '{}'", key.feature, ts.type_name(base)),
                )
            })?;
            specs.push(KeySpec {
                feature,
                order: key.order,
            });
        }
        Self::new(ts, index_name, base, specs)
    }

    pub fn keys(&self) -> &[KeySpec] {
        &self.keys
    }

    /// Extracts the key tuple of `fs`.
    pub fn extract(&self, store: &Store, fs: FsId) -> IndexResult<IndexKey> {
        let mut components = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            components.push(KeyComponent {
                value: KeyValue::from_value(store.get(fs, key.feature)?),
                order: key.order,
            });
        }
        Ok(IndexKey(components))
    }

    /// Compares two feature structures; `Equal` means equal keys, whatever
    /// their ids.
    pub fn compare(&self, store: &Store, a: FsId, b: FsId) -> IndexResult<Ordering> {
        for key in &self.keys {
            let va = KeyValue::from_value(store.get(a, key.feature)?);
            let vb = KeyValue::from_value(store.get(b, key.feature)?);
            let ord = match key.order {
                SortOrder::Ascending => va.cmp(&vb),
                SortOrder::Descending => vb.cmp(&va),
            };
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }
}
