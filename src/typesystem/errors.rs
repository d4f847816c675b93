//! Type system error types
//!
//! Every type system error is FATAL at build time: a type system that fails
//! to build is never partially usable and no operation is retried.
//!
//! Error codes:
//! - CAS_TS_UNKNOWN_SUPERTYPE
//! - CAS_TS_UNKNOWN_TYPE
//! - CAS_TS_DUPLICATE_TYPE
//! - CAS_TS_DUPLICATE_FEATURE
//! - CAS_TS_FINAL_TYPE
//! - CAS_TS_BUILTIN_REDEFINITION
//! - CAS_TS_INCONSISTENT
//! - CAS_TS_DESCRIPTOR

use thiserror::Error;

use crate::observability::Severity;

/// Result type for type system operations
pub type TypeSystemResult<T> = Result<T, TypeSystemError>;

/// Type system errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeSystemError {
    /// Supertype has not been declared yet
    #[error("Unknown supertype '{supertype}' for type '{type_name}'")]
    UnknownSupertype {
        /// Type being declared
        type_name: String,
        /// Missing supertype
        supertype: String,
    },

    /// Type lookup by name failed
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    /// Type name already declared
    #[error("Type '{0}' is already declared")]
    DuplicateType(String),

    /// Feature name clashes within a type's merged feature set
    #[error("Feature '{feature}' conflicts with an existing feature on '{type_name}'")]
    DuplicateFeature {
        /// Type that already carries the name
        type_name: String,
        /// Conflicting short name
        feature: String,
    },

    /// Array, enumerated-string, primitive and sofa types can't be extended
    #[error("Type '{0}' is final and cannot be subtyped or given features")]
    FinalType(String),

    /// Built-in types are pre-registered and immutable
    #[error("Built-in type '{0}' cannot be redefined")]
    BuiltinRedefinition(String),

    /// Commit-time consistency failure
    #[error("Inconsistent type system: {0}")]
    Inconsistent(String),

    /// Malformed type system descriptor
    #[error("Invalid type system descriptor '{source_name}': {reason}")]
    Descriptor {
        /// File or resource name
        source_name: String,
        /// What went wrong
        reason: String,
    },
}

impl TypeSystemError {
    /// Create a descriptor error
    pub fn descriptor(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        TypeSystemError::Descriptor {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            TypeSystemError::UnknownSupertype { .. } => "CAS_TS_UNKNOWN_SUPERTYPE",
            TypeSystemError::UnknownType(_) => "CAS_TS_UNKNOWN_TYPE",
            TypeSystemError::DuplicateType(_) => "CAS_TS_DUPLICATE_TYPE",
            TypeSystemError::DuplicateFeature { .. } => "CAS_TS_DUPLICATE_FEATURE",
            TypeSystemError::FinalType(_) => "CAS_TS_FINAL_TYPE",
            TypeSystemError::BuiltinRedefinition(_) => "CAS_TS_BUILTIN_REDEFINITION",
            TypeSystemError::Inconsistent(_) => "CAS_TS_INCONSISTENT",
            TypeSystemError::Descriptor { .. } => "CAS_TS_DESCRIPTOR",
        }
    }

    /// Type system errors always abort the build
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
