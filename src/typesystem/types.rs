//! Type and feature definitions
//!
//! Types and features are addressed by dense integer handles (`TypeId`,
//! `FeatureId`) issued by the type system. Handles are only meaningful for
//! the type system that issued them.

use std::fmt;

/// Handle of a type within one type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn new(index: usize) -> Self {
        TypeId(index as u32)
    }

    /// Returns the dense index of this type.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Handle of a feature within one type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(u32);

impl FeatureId {
    pub(crate) fn new(index: usize) -> Self {
        FeatureId(index as u32)
    }

    /// Returns the dense index of this feature.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feature#{}", self.0)
    }
}

/// Scalar value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
}

impl PrimitiveKind {
    /// All primitive kinds in registration order.
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Integer,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::String,
    ];

    /// Returns the kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::String => "string",
        }
    }
}

/// Element kind of an array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayElement {
    /// Array of scalars stored inline.
    Primitive(PrimitiveKind),
    /// Array of references to feature structures of the given type.
    Fs(TypeId),
}

/// Structural category of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// The single root of the hierarchy.
    Top,
    /// A scalar value type. Never instantiated as a feature structure.
    Primitive(PrimitiveKind),
    /// A string type restricted to a fixed set of values.
    StringSubtype {
        /// Permitted values, in declaration order
        allowed: Vec<String>,
    },
    /// A contiguous array type.
    Array(ArrayElement),
    /// A grouping type that has no instances of its own (list and array bases).
    Abstract,
    /// An ordinary structured type.
    Regular,
}

/// A committed type.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub(crate) id: TypeId,
    pub(crate) name: String,
    pub(crate) supertype: Option<TypeId>,
    pub(crate) kind: TypeKind,
    /// Features introduced on this type, in declaration order.
    pub(crate) declared: Vec<FeatureId>,
    pub(crate) builtin: bool,
    pub(crate) creatable: bool,
    pub(crate) inheritance_final: bool,
}

impl TypeDef {
    /// Returns the type handle.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the namespace-qualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name without its namespace.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Returns the supertype, `None` only for the root.
    pub fn supertype(&self) -> Option<TypeId> {
        self.supertype
    }

    /// Returns the structural kind.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Features introduced on this type (not inherited ones).
    pub fn declared_features(&self) -> &[FeatureId] {
        &self.declared
    }

    /// Whether the type is pre-registered.
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Whether plain `create` may instantiate the type.
    pub fn is_creatable(&self) -> bool {
        self.creatable
    }

    /// Whether the type may not be subtyped or given new features.
    pub fn is_final(&self) -> bool {
        self.inheritance_final
    }

    /// Whether this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array(_))
    }

    /// Returns the array element kind, if this is an array type.
    pub fn array_element(&self) -> Option<ArrayElement> {
        match self.kind {
            TypeKind::Array(element) => Some(element),
            _ => None,
        }
    }
}

/// A committed feature.
#[derive(Debug, Clone)]
pub struct FeatureDef {
    pub(crate) id: FeatureId,
    pub(crate) short_name: String,
    pub(crate) name: String,
    pub(crate) domain: TypeId,
    pub(crate) range: TypeId,
    pub(crate) multiple_references_allowed: bool,
    pub(crate) builtin: bool,
    /// Slot index. Identical in the domain and every subtype.
    pub(crate) offset: usize,
}

impl FeatureDef {
    /// Returns the feature handle.
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Returns the short name, unique within the domain and its ancestors.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Returns the qualified name `<domain>:<short name>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type that introduced the feature.
    pub fn domain(&self) -> TypeId {
        self.domain
    }

    /// The value type.
    pub fn range(&self) -> TypeId {
        self.range
    }

    /// Whether the referenced value may be shared between several owners.
    pub fn multiple_references_allowed(&self) -> bool {
        self.multiple_references_allowed
    }

    /// Whether the feature is pre-registered on a built-in type.
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Slot position inside every instance of the domain or its subtypes.
    pub fn offset(&self) -> usize {
        self.offset
    }
}
