//! Feature structure store errors
//!
//! Store errors are caller errors: they are surfaced immediately, never
//! swallowed, and leave the store unchanged.
//!
//! Error codes:
//! - CAS_STORE_TYPE_MISMATCH
//! - CAS_STORE_INAPPROPRIATE_FEATURE
//! - CAS_STORE_ARRAY_BOUNDS
//! - CAS_STORE_NON_CREATABLE_TYPE
//! - CAS_STORE_NOT_AN_ARRAY
//! - CAS_STORE_UNKNOWN_FS
//! - CAS_STORE_ILLEGAL_STRING_VALUE

use thiserror::Error;

use super::value::FsId;
use crate::observability::Severity;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Value does not fit the range of the slot it is written to
    #[error("Type mismatch on {target}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Feature or array element being written
        target: String,
        /// Expected range
        expected: String,
        /// Offending value kind or type
        actual: String,
    },

    /// Feature is not defined on the feature structure's type
    #[error("Feature '{feature}' is not appropriate for type '{type_name}'")]
    InappropriateFeature {
        /// Type of the feature structure
        type_name: String,
        /// Qualified feature name
        feature: String,
    },

    /// Array access outside `0..length`
    #[error("Array index {index} out of bounds for length {length}")]
    ArrayIndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Array length
        length: usize,
    },

    /// Type has no plain constructor
    #[error("Type '{0}' cannot be instantiated with create")]
    NonCreatableType(String),

    /// Array operation on a non-array feature structure
    #[error("Feature structure {0} is not an array")]
    NotAnArray(FsId),

    /// Id does not name a feature structure of this store
    #[error("Unknown feature structure {0}")]
    UnknownFs(FsId),

    /// Value outside an enumerated string subtype's allowed set
    #[error("Value '{value}' is not allowed for string subtype '{type_name}'")]
    IllegalStringValue {
        /// Enumerated string subtype
        type_name: String,
        /// Rejected value
        value: String,
    },
}

impl StoreError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::TypeMismatch { .. } => "CAS_STORE_TYPE_MISMATCH",
            StoreError::InappropriateFeature { .. } => "CAS_STORE_INAPPROPRIATE_FEATURE",
            StoreError::ArrayIndexOutOfBounds { .. } => "CAS_STORE_ARRAY_BOUNDS",
            StoreError::NonCreatableType(_) => "CAS_STORE_NON_CREATABLE_TYPE",
            StoreError::NotAnArray(_) => "CAS_STORE_NOT_AN_ARRAY",
            StoreError::UnknownFs(_) => "CAS_STORE_UNKNOWN_FS",
            StoreError::IllegalStringValue { .. } => "CAS_STORE_ILLEGAL_STRING_VALUE",
        }
    }

    /// Store errors reject the single operation
    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    pub(crate) fn mismatch(target: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        StoreError::TypeMismatch {
            target: target.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
