//! Index error types
//!
//! Error codes:
//! - CAS_INDEX_UNKNOWN
//! - CAS_INDEX_DUPLICATE
//! - CAS_INDEX_INVALID_KEY
//! - CAS_INDEX_TYPE_NOT_IN_INDEX
//! - CAS_STORE_* (key extraction failed)

use thiserror::Error;

use crate::observability::Severity;
use crate::store::StoreError;

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Index errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// No index family with this name
    #[error("Unknown index '{0}'")]
    UnknownIndex(String),

    /// A different definition is already registered under this name
    #[error("Index '{0}' is already declared with a different definition")]
    DuplicateIndex(String),

    /// Key feature does not apply to the base type, or the base type
    /// cannot be indexed
    #[error("Invalid key for index '{index}': {reason}")]
    InvalidKey {
        /// Index name
        index: String,
        /// What is wrong with the key
        reason: String,
    },

    /// Requested type lies outside the index's base type
    #[error("Type '{type_name}' is not covered by index '{index}'")]
    TypeNotInIndex {
        /// Index name
        index: String,
        /// Requested type
        type_name: String,
    },

    /// Key extraction or membership update hit a store error
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IndexError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::UnknownIndex(_) => "CAS_INDEX_UNKNOWN",
            IndexError::DuplicateIndex(_) => "CAS_INDEX_DUPLICATE",
            IndexError::InvalidKey { .. } => "CAS_INDEX_INVALID_KEY",
            IndexError::TypeNotInIndex { .. } => "CAS_INDEX_TYPE_NOT_IN_INDEX",
            IndexError::Store(e) => e.code(),
        }
    }

    /// Index errors reject the single operation
    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    pub(crate) fn invalid_key(index: &str, reason: impl Into<String>) -> Self {
        IndexError::InvalidKey {
            index: index.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsId;

    #[test]
    fn test_error_codes() {
        assert_eq!(IndexError::UnknownIndex("x".into()).code(), "CAS_INDEX_UNKNOWN");
        assert_eq!(
            IndexError::invalid_key("TokenIndex", "feature not on base type").code(),
            "CAS_INDEX_INVALID_KEY"
        );
    }

    #[test]
    fn test_store_errors_keep_their_code() {
        let err: IndexError = StoreError::UnknownFs(FsId::from_raw(3)).into();
        assert_eq!(err.code(), "CAS_STORE_UNKNOWN_FS");
        assert!(err.to_string().contains("#3"));
    }
}
