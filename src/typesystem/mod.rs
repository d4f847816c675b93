//! Type System subsystem for aerocas
//!
//! Types and features are declared on a `TypeSystemBuilder` and sealed by
//! `commit` into an immutable `TypeSystem`. Feature structures are only ever
//! created against a committed type system.
//!
//! # Invariants
//!
//! - The subtype relation is a tree with the single root `uima.cas.TOP`
//! - Array, primitive and enumerated-string types are final
//! - A feature name is unique within the union of a type and its ancestors
//! - Feature slot offsets are stable across a domain and all its subtypes

pub mod builtin;
mod builder;
mod descriptor;
mod errors;
mod system;
mod type_order;
mod types;

pub use builder::TypeSystemBuilder;
pub use builtin::BuiltinTypes;
pub use descriptor::{
    FeatureDescription, FileTypeSystemSource, TypeDescription, TypeSystemDescription,
    TypeSystemSource,
};
pub use errors::{TypeSystemError, TypeSystemResult};
pub use system::TypeSystem;
pub use type_order::{LinearTypeOrder, TypeOrderPolicy};
pub use types::{ArrayElement, FeatureDef, FeatureId, PrimitiveKind, TypeDef, TypeId, TypeKind};
