//! Type system builder
//!
//! Types and features are declared against a mutable builder; `commit`
//! consumes the builder and yields an immutable `TypeSystem`. Sealing is
//! enforced by ownership: once committed there is nothing left to mutate.
//!
//! Feature ranges are recorded by name at declaration time and resolved at
//! commit, so a feature may name a type that is declared after it.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::builtin::{
    self, ARRAY_TYPE_SUFFIX, TYPE_NAME_BOOLEAN, TYPE_NAME_BOOLEAN_ARRAY, TYPE_NAME_BYTE,
    TYPE_NAME_BYTE_ARRAY, TYPE_NAME_DOUBLE, TYPE_NAME_DOUBLE_ARRAY, TYPE_NAME_FLOAT,
    TYPE_NAME_FLOAT_ARRAY, TYPE_NAME_FS_ARRAY, TYPE_NAME_INTEGER, TYPE_NAME_INTEGER_ARRAY,
    TYPE_NAME_LONG, TYPE_NAME_LONG_ARRAY, TYPE_NAME_SHORT, TYPE_NAME_SHORT_ARRAY,
    TYPE_NAME_STRING, TYPE_NAME_STRING_ARRAY, TYPE_NAME_TOP,
};
use super::errors::{TypeSystemError, TypeSystemResult};
use super::system::TypeSystem;
use super::type_order::{LinearTypeOrder, TypeOrderPolicy};
use super::types::{ArrayElement, FeatureDef, FeatureId, TypeDef, TypeId, TypeKind};
use crate::observability::{log_event, Event};

/// A feature whose range has not been resolved yet.
#[derive(Debug, Clone)]
struct PendingFeature {
    domain: TypeId,
    short_name: String,
    /// Canonical range name, `X[]` for arrays of X.
    range: String,
    multiple_references_allowed: bool,
    builtin: bool,
}

/// Mutable type system under construction.
#[derive(Debug)]
pub struct TypeSystemBuilder {
    types: Vec<TypeDef>,
    by_name: HashMap<String, TypeId>,
    pending: Vec<PendingFeature>,
    priorities: Vec<Vec<String>>,
    policy: TypeOrderPolicy,
}

impl Default for TypeSystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSystemBuilder {
    /// Creates a builder with every built-in type registered.
    pub fn new() -> Self {
        let mut builder = Self {
            types: Vec::new(),
            by_name: HashMap::new(),
            pending: Vec::new(),
            priorities: Vec::new(),
            policy: TypeOrderPolicy::default(),
        };
        builtin::register(&mut builder);
        builder
    }

    /// Sets the policy used to derive the linear type order.
    pub fn set_type_order_policy(&mut self, policy: TypeOrderPolicy) {
        self.policy = policy;
    }

    /// Looks up a declared type by name.
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// True if `t` is a pre-registered type.
    pub fn is_builtin(&self, t: TypeId) -> bool {
        self.types.get(t.index()).map_or(false, |def| def.builtin)
    }

    /// Name of `t`'s supertype.
    pub fn supertype_name(&self, t: TypeId) -> Option<&str> {
        let parent = self.types.get(t.index())?.supertype?;
        Some(self.types[parent.index()].name.as_str())
    }

    /// Declares a type below an already declared supertype.
    pub fn add_type(&mut self, name: &str, supertype: &str) -> TypeSystemResult<TypeId> {
        self.check_new_name(name)?;
        let parent = self.type_id(supertype).ok_or_else(|| TypeSystemError::UnknownSupertype {
            type_name: name.to_string(),
            supertype: supertype.to_string(),
        })?;

        let parent_def = &self.types[parent.index()];
        let extensible = matches!(parent_def.kind, TypeKind::Regular | TypeKind::Top);
        if parent_def.inheritance_final || !extensible {
            return Err(TypeSystemError::FinalType(supertype.to_string()));
        }

        let id = self.push_type(name, Some(parent), TypeKind::Regular, false, true, false);
        debug!(type_name = name, supertype, "type declared");
        Ok(id)
    }

    /// Declares an enumerated string subtype with a fixed allowed-value set.
    pub fn add_string_subtype(&mut self, name: &str, allowed: Vec<String>) -> TypeSystemResult<TypeId> {
        self.check_new_name(name)?;
        if allowed.is_empty() {
            return Err(TypeSystemError::Inconsistent(format!(
                "string subtype '{}' declares no allowed values",
                name
            )));
        }
        let string = self
            .type_id(TYPE_NAME_STRING)
            .ok_or_else(|| TypeSystemError::UnknownType(TYPE_NAME_STRING.to_string()))?;

        let id = self.push_type(name, Some(string), TypeKind::StringSubtype { allowed }, false, false, true);
        debug!(type_name = name, "string subtype declared");
        Ok(id)
    }

    /// Declares a single-valued feature. `range` may be `X[]` for an array of X.
    pub fn add_feature(&mut self, domain: TypeId, short_name: &str, range: &str) -> TypeSystemResult<()> {
        self.declare_feature(domain, short_name, range, None, false)
    }

    /// Declares a feature with every option spelled out.
    ///
    /// `element_type` is only meaningful when `range` is `uima.cas.FSArray`;
    /// it narrows the array to elements of that type.
    pub fn declare_feature(
        &mut self,
        domain: TypeId,
        short_name: &str,
        range: &str,
        element_type: Option<&str>,
        multiple_references_allowed: bool,
    ) -> TypeSystemResult<()> {
        let domain_def = self
            .types
            .get(domain.index())
            .ok_or_else(|| TypeSystemError::UnknownType(domain.to_string()))?;
        if domain_def.inheritance_final {
            return Err(TypeSystemError::FinalType(domain_def.name.clone()));
        }

        let range = canonical_range(range, element_type);

        // Ancestors (and the domain itself): identical redeclaration is a no-op
        let mut cursor = Some(domain);
        while let Some(t) = cursor {
            if let Some(existing) = self
                .pending
                .iter()
                .find(|p| p.domain == t && p.short_name == short_name)
            {
                if existing.range == range {
                    return Ok(());
                }
                return Err(TypeSystemError::DuplicateFeature {
                    type_name: self.types[t.index()].name.clone(),
                    feature: short_name.to_string(),
                });
            }
            cursor = self.types[t.index()].supertype;
        }

        // Descendants may not already carry the name
        if let Some(clash) = self
            .pending
            .iter()
            .find(|p| p.short_name == short_name && self.is_descendant(p.domain, domain))
        {
            return Err(TypeSystemError::DuplicateFeature {
                type_name: self.types[clash.domain.index()].name.clone(),
                feature: short_name.to_string(),
            });
        }

        self.pending.push(PendingFeature {
            domain,
            short_name: short_name.to_string(),
            range,
            multiple_references_allowed,
            builtin: false,
        });
        Ok(())
    }

    /// Adds a type priority list: earlier names precede later ones in the
    /// linear type order. Names are resolved at commit.
    pub fn add_type_priorities(&mut self, names: &[&str]) {
        self.priorities
            .push(names.iter().map(|n| n.to_string()).collect());
    }

    /// Seals the type system.
    ///
    /// Fails with `Inconsistent` if a feature range or priority entry names an
    /// undeclared type, or if the priority lists contradict each other.
    pub fn commit(mut self) -> TypeSystemResult<TypeSystem> {
        let fs_array = self.require(TYPE_NAME_FS_ARRAY)?;

        // Resolve ranges, minting typed FS array types on demand
        let pending = std::mem::take(&mut self.pending);
        let mut ranges = Vec::with_capacity(pending.len());
        for feature in &pending {
            let range = match feature.range.strip_suffix(ARRAY_TYPE_SUFFIX) {
                Some(element) => {
                    let element_id = self.type_id(element).ok_or_else(|| {
                        TypeSystemError::Inconsistent(format!(
                            "feature '{}' has unresolved array element type '{}'",
                            feature.short_name, element
                        ))
                    })?;
                    match self.type_id(&feature.range) {
                        Some(existing) => existing,
                        None => self.push_type(
                            &feature.range,
                            Some(fs_array),
                            TypeKind::Array(ArrayElement::Fs(element_id)),
                            false,
                            false,
                            true,
                        ),
                    }
                }
                None => self.type_id(&feature.range).ok_or_else(|| {
                    TypeSystemError::Inconsistent(format!(
                        "feature '{}' has unresolved range '{}'",
                        feature.short_name, feature.range
                    ))
                })?,
            };
            ranges.push(range);
        }

        // Feature ids follow declaration order; slot offsets follow the merged
        // (ancestors first) order, which types are already sorted for.
        let mut features = Vec::with_capacity(pending.len());
        for (index, (feature, range)) in pending.iter().zip(&ranges).enumerate() {
            let id = FeatureId::new(index);
            let domain_name = &self.types[feature.domain.index()].name;
            features.push(FeatureDef {
                id,
                short_name: feature.short_name.clone(),
                name: format!("{}:{}", domain_name, feature.short_name),
                domain: feature.domain,
                range: *range,
                multiple_references_allowed: feature.multiple_references_allowed,
                builtin: feature.builtin,
                offset: 0,
            });
            self.types[feature.domain.index()].declared.push(id);
        }

        let mut merged: Vec<Vec<FeatureId>> = Vec::with_capacity(self.types.len());
        for def in &self.types {
            let mut list = match def.supertype {
                Some(parent) => merged[parent.index()].clone(),
                None => Vec::new(),
            };
            for &f in &def.declared {
                features[f.index()].offset = list.len();
                list.push(f);
            }
            merged.push(list);
        }

        let mut children = vec![Vec::new(); self.types.len()];
        for def in &self.types {
            if let Some(parent) = def.supertype {
                children[parent.index()].push(def.id);
            }
        }

        let mut priorities = Vec::with_capacity(self.priorities.len());
        for list in &self.priorities {
            let mut resolved = Vec::with_capacity(list.len());
            for name in list {
                resolved.push(self.type_id(name).ok_or_else(|| {
                    TypeSystemError::Inconsistent(format!("type priority names unknown type '{}'", name))
                })?);
            }
            priorities.push(resolved);
        }

        let top = self.require(TYPE_NAME_TOP)?;
        let order = LinearTypeOrder::build(top, &children, self.policy, &priorities)?;
        let system = TypeSystem::assemble(self.types, features, self.by_name, merged, children, order)?;

        log_event(
            Event::TypeSystemCommitted,
            &[
                ("types", system.type_count().to_string().as_str()),
                ("features", system.feature_count().to_string().as_str()),
            ],
        );
        Ok(system)
    }

    // ---- crate-internal registration used by `builtin` ----

    pub(crate) fn push_builtin(
        &mut self,
        name: &str,
        supertype: Option<TypeId>,
        kind: TypeKind,
        creatable: bool,
        inheritance_final: bool,
    ) -> TypeId {
        self.push_type(name, supertype, kind, true, creatable, inheritance_final)
    }

    pub(crate) fn push_builtin_feature(
        &mut self,
        domain: TypeId,
        short_name: &str,
        range: &str,
        multiple_references_allowed: bool,
    ) {
        self.pending.push(PendingFeature {
            domain,
            short_name: short_name.to_string(),
            range: range.to_string(),
            multiple_references_allowed,
            builtin: true,
        });
    }

    fn push_type(
        &mut self,
        name: &str,
        supertype: Option<TypeId>,
        kind: TypeKind,
        builtin: bool,
        creatable: bool,
        inheritance_final: bool,
    ) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(TypeDef {
            id,
            name: name.to_string(),
            supertype,
            kind,
            declared: Vec::new(),
            builtin,
            creatable,
            inheritance_final,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn check_new_name(&self, name: &str) -> TypeSystemResult<()> {
        if name.is_empty() || name.ends_with(ARRAY_TYPE_SUFFIX) {
            return Err(TypeSystemError::Inconsistent(format!("illegal type name '{}'", name)));
        }
        match self.type_id(name) {
            Some(existing) if self.types[existing.index()].builtin => {
                Err(TypeSystemError::BuiltinRedefinition(name.to_string()))
            }
            Some(_) => Err(TypeSystemError::DuplicateType(name.to_string())),
            None => Ok(()),
        }
    }

    fn require(&self, name: &str) -> TypeSystemResult<TypeId> {
        self.type_id(name)
            .ok_or_else(|| TypeSystemError::UnknownType(name.to_string()))
    }

    /// True if `candidate` is a strict descendant of `ancestor`.
    fn is_descendant(&self, candidate: TypeId, ancestor: TypeId) -> bool {
        let mut seen = HashSet::new();
        let mut cursor = self.types[candidate.index()].supertype;
        while let Some(t) = cursor {
            if t == ancestor {
                return true;
            }
            if !seen.insert(t) {
                break;
            }
            cursor = self.types[t.index()].supertype;
        }
        false
    }
}

/// Normalizes the two interchangeable array spellings and maps arrays of
/// primitives (and of TOP) onto their built-in array types.
pub(crate) fn canonical_range(range: &str, element_type: Option<&str>) -> String {
    let spelled = match element_type {
        Some(element) if range == TYPE_NAME_FS_ARRAY => format!("{}{}", element, ARRAY_TYPE_SUFFIX),
        _ => range.to_string(),
    };
    match spelled.strip_suffix(ARRAY_TYPE_SUFFIX) {
        Some(element) => match builtin_array_for(element) {
            Some(array) => array.to_string(),
            None => spelled,
        },
        None => spelled,
    }
}

fn builtin_array_for(element: &str) -> Option<&'static str> {
    match element {
        TYPE_NAME_BOOLEAN => Some(TYPE_NAME_BOOLEAN_ARRAY),
        TYPE_NAME_BYTE => Some(TYPE_NAME_BYTE_ARRAY),
        TYPE_NAME_SHORT => Some(TYPE_NAME_SHORT_ARRAY),
        TYPE_NAME_INTEGER => Some(TYPE_NAME_INTEGER_ARRAY),
        TYPE_NAME_LONG => Some(TYPE_NAME_LONG_ARRAY),
        TYPE_NAME_FLOAT => Some(TYPE_NAME_FLOAT_ARRAY),
        TYPE_NAME_DOUBLE => Some(TYPE_NAME_DOUBLE_ARRAY),
        TYPE_NAME_STRING => Some(TYPE_NAME_STRING_ARRAY),
        TYPE_NAME_TOP => Some(TYPE_NAME_FS_ARRAY),
        _ => None,
    }
}
