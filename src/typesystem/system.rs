//! Committed type system
//!
//! Immutable after construction and shared by handle (`Arc<TypeSystem>`)
//! between a CAS, its index repositories and the codec. There is no
//! process-wide registry: every consumer receives the type system it works
//! against explicitly.
//!
//! Subsumption is answered in O(1) from pre-order numbering: `a` is a subtype
//! of `b` iff `a`'s pre-order position falls inside `b`'s subtree interval.

use std::collections::HashMap;

use super::builtin::{
    BuiltinTypes, FEATURE_BASE_NAME_BEGIN, FEATURE_BASE_NAME_END, FEATURE_BASE_NAME_LANGUAGE,
    FEATURE_BASE_NAME_SOFA, FEATURE_BASE_NAME_SOFAARRAY, FEATURE_BASE_NAME_SOFAID,
    FEATURE_BASE_NAME_SOFAMIME, FEATURE_BASE_NAME_SOFANUM, FEATURE_BASE_NAME_SOFASTRING,
    FEATURE_BASE_NAME_SOFAURI, TYPE_NAME_ANNOTATION, TYPE_NAME_ANNOTATION_BASE,
    TYPE_NAME_DOCUMENT_ANNOTATION, TYPE_NAME_FS_ARRAY, TYPE_NAME_SOFA, TYPE_NAME_STRING,
    TYPE_NAME_TOP,
};
use super::errors::{TypeSystemError, TypeSystemResult};
use super::type_order::LinearTypeOrder;
use super::types::{ArrayElement, FeatureDef, FeatureId, PrimitiveKind, TypeDef, TypeId, TypeKind};

/// An immutable, committed type system.
#[derive(Debug)]
pub struct TypeSystem {
    types: Vec<TypeDef>,
    features: Vec<FeatureDef>,
    by_name: HashMap<String, TypeId>,
    /// Inherited + declared features per type, ancestors first.
    merged: Vec<Vec<FeatureId>>,
    /// Short name → feature, per type (merged set).
    by_short_name: Vec<HashMap<String, FeatureId>>,
    children: Vec<Vec<TypeId>>,
    /// Types in hierarchy pre-order.
    preorder: Vec<TypeId>,
    pre_position: Vec<u32>,
    subtree_size: Vec<u32>,
    order: LinearTypeOrder,
    builtins: BuiltinTypes,
    /// Array type per element type, for arrays of feature structures.
    fs_arrays: HashMap<TypeId, TypeId>,
    primitive_arrays: HashMap<PrimitiveKind, TypeId>,
}

impl TypeSystem {
    pub(crate) fn assemble(
        types: Vec<TypeDef>,
        features: Vec<FeatureDef>,
        by_name: HashMap<String, TypeId>,
        merged: Vec<Vec<FeatureId>>,
        children: Vec<Vec<TypeId>>,
        order: LinearTypeOrder,
    ) -> TypeSystemResult<Self> {
        let n = types.len();
        let top = lookup(&by_name, TYPE_NAME_TOP)?;

        // Pre-order walk with subtree sizes
        let mut preorder = Vec::with_capacity(n);
        let mut pre_position = vec![0u32; n];
        let mut subtree_size = vec![1u32; n];
        let mut stack = vec![top];
        while let Some(t) = stack.pop() {
            pre_position[t.index()] = preorder.len() as u32;
            preorder.push(t);
            stack.extend(children[t.index()].iter().rev());
        }
        for t in preorder.iter().rev() {
            if let Some(parent) = types[t.index()].supertype {
                subtree_size[parent.index()] += subtree_size[t.index()];
            }
        }

        let by_short_name = merged
            .iter()
            .map(|list| {
                list.iter()
                    .map(|f| (features[f.index()].short_name.clone(), *f))
                    .collect::<HashMap<_, _>>()
            })
            .collect::<Vec<_>>();

        let mut fs_arrays = HashMap::new();
        let mut primitive_arrays = HashMap::new();
        for def in &types {
            match def.kind {
                TypeKind::Array(ArrayElement::Fs(element)) => {
                    fs_arrays.insert(element, def.id);
                }
                TypeKind::Array(ArrayElement::Primitive(kind)) => {
                    primitive_arrays.insert(kind, def.id);
                }
                _ => {}
            }
        }

        let feature = |type_name: &str, short: &str| -> TypeSystemResult<FeatureId> {
            let t = lookup(&by_name, type_name)?;
            by_short_name[t.index()].get(short).copied().ok_or_else(|| {
                TypeSystemError::Inconsistent(format!("built-in feature {}:{} missing", type_name, short))
            })
        };
        let builtins = BuiltinTypes {
            top,
            string: lookup(&by_name, TYPE_NAME_STRING)?,
            fs_array: lookup(&by_name, TYPE_NAME_FS_ARRAY)?,
            sofa: lookup(&by_name, TYPE_NAME_SOFA)?,
            annotation_base: lookup(&by_name, TYPE_NAME_ANNOTATION_BASE)?,
            annotation: lookup(&by_name, TYPE_NAME_ANNOTATION)?,
            document_annotation: lookup(&by_name, TYPE_NAME_DOCUMENT_ANNOTATION)?,
            sofa_num: feature(TYPE_NAME_SOFA, FEATURE_BASE_NAME_SOFANUM)?,
            sofa_id: feature(TYPE_NAME_SOFA, FEATURE_BASE_NAME_SOFAID)?,
            sofa_mime: feature(TYPE_NAME_SOFA, FEATURE_BASE_NAME_SOFAMIME)?,
            sofa_array: feature(TYPE_NAME_SOFA, FEATURE_BASE_NAME_SOFAARRAY)?,
            sofa_string: feature(TYPE_NAME_SOFA, FEATURE_BASE_NAME_SOFASTRING)?,
            sofa_uri: feature(TYPE_NAME_SOFA, FEATURE_BASE_NAME_SOFAURI)?,
            sofa_ref: feature(TYPE_NAME_ANNOTATION_BASE, FEATURE_BASE_NAME_SOFA)?,
            begin: feature(TYPE_NAME_ANNOTATION, FEATURE_BASE_NAME_BEGIN)?,
            end: feature(TYPE_NAME_ANNOTATION, FEATURE_BASE_NAME_END)?,
            language: feature(TYPE_NAME_DOCUMENT_ANNOTATION, FEATURE_BASE_NAME_LANGUAGE)?,
        };

        Ok(Self {
            types,
            features,
            by_name,
            merged,
            by_short_name,
            children,
            preorder,
            pre_position,
            subtree_size,
            order,
            builtins,
            fs_arrays,
            primitive_arrays,
        })
    }

    // ---- types ----

    /// Number of types, built-ins included.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of features, built-ins included.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Looks up a type by qualified name.
    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Looks up a type by qualified name, failing with `UnknownType`.
    pub fn require_type(&self, name: &str) -> TypeSystemResult<TypeId> {
        lookup(&self.by_name, name)
    }

    /// Returns the definition of a type.
    pub fn type_def(&self, t: TypeId) -> &TypeDef {
        &self.types[t.index()]
    }

    /// Returns a type's qualified name.
    pub fn type_name(&self, t: TypeId) -> &str {
        &self.types[t.index()].name
    }

    /// All types in id order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter()
    }

    /// Handles of frequently used built-in types and features.
    pub fn builtins(&self) -> &BuiltinTypes {
        &self.builtins
    }

    /// Returns the direct subtypes of `t`.
    pub fn direct_subtypes(&self, t: TypeId) -> &[TypeId] {
        &self.children[t.index()]
    }

    /// Returns `t` followed by all of its transitive subtypes, in pre-order.
    pub fn subsumed_types(&self, t: TypeId) -> &[TypeId] {
        let start = self.pre_position[t.index()] as usize;
        let end = start + self.subtree_size[t.index()] as usize;
        &self.preorder[start..end]
    }

    /// True if `sub` equals `sup` or descends from it.
    #[inline]
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        let position = self.pre_position[sub.index()];
        let start = self.pre_position[sup.index()];
        position >= start && position < start + self.subtree_size[sup.index()]
    }

    /// Same relation as `is_subtype`, argument order of the host API.
    #[inline]
    pub fn subsumes(&self, sup: TypeId, sub: TypeId) -> bool {
        self.is_subtype(sub, sup)
    }

    /// The committed linear type order.
    pub fn type_order(&self) -> &LinearTypeOrder {
        &self.order
    }

    /// The scalar kind stored for values of type `t`, if `t` is a primitive
    /// (enumerated string subtypes are strings).
    pub fn primitive_kind(&self, t: TypeId) -> Option<PrimitiveKind> {
        match &self.types[t.index()].kind {
            TypeKind::Primitive(kind) => Some(*kind),
            TypeKind::StringSubtype { .. } => Some(PrimitiveKind::String),
            _ => None,
        }
    }

    /// The allowed-value set of an enumerated string subtype.
    pub fn allowed_values(&self, t: TypeId) -> Option<&[String]> {
        match &self.types[t.index()].kind {
            TypeKind::StringSubtype { allowed } => Some(allowed),
            _ => None,
        }
    }

    /// The array type holding elements of `element`.
    ///
    /// Primitive element types map to the built-in arrays; feature structure
    /// element types map to their typed array if one was declared, otherwise
    /// to `uima.cas.FSArray`.
    pub fn array_type_for(&self, element: TypeId) -> TypeId {
        if let Some(kind) = self.primitive_kind(element) {
            if let Some(array) = self.primitive_arrays.get(&kind) {
                return *array;
            }
        }
        self.fs_arrays
            .get(&element)
            .copied()
            .unwrap_or(self.builtins.fs_array)
    }

    // ---- features ----

    /// Returns the definition of a feature.
    pub fn feature_def(&self, f: FeatureId) -> &FeatureDef {
        &self.features[f.index()]
    }

    /// All features in id order.
    pub fn features(&self) -> impl Iterator<Item = &FeatureDef> {
        self.features.iter()
    }

    /// The merged (inherited first, then declared) features of `t`.
    pub fn features_of(&self, t: TypeId) -> &[FeatureId] {
        &self.merged[t.index()]
    }

    /// Looks up a feature by short name within `t`'s merged feature set.
    pub fn feature_by_short_name(&self, t: TypeId, short_name: &str) -> Option<FeatureId> {
        self.by_short_name[t.index()].get(short_name).copied()
    }

    /// Looks up a feature by qualified `<type>:<short name>`.
    pub fn feature_by_name(&self, name: &str) -> Option<FeatureId> {
        let (type_name, short) = name.split_once(':')?;
        let t = self.type_by_name(type_name)?;
        self.feature_by_short_name(t, short)
    }

    /// True if instances of `t` carry feature `f`.
    #[inline]
    pub fn is_appropriate(&self, t: TypeId, f: FeatureId) -> bool {
        self.is_subtype(t, self.features[f.index()].domain)
    }

    /// True if values of `f` are references to feature structures.
    pub fn is_reference_feature(&self, f: FeatureId) -> bool {
        self.primitive_kind(self.features[f.index()].range).is_none()
    }
}

fn lookup(by_name: &HashMap<String, TypeId>, name: &str) -> TypeSystemResult<TypeId> {
    by_name
        .get(name)
        .copied()
        .ok_or_else(|| TypeSystemError::UnknownType(name.to_string()))
}
