//! CAS error types
//!
//! Error codes:
//! - CAS_VIEW_UNKNOWN
//! - CAS_VIEW_DUPLICATE
//! - CAS_SOFA_DATA_ALREADY_SET
//! - CAS_WRONG_VIEW
//! - codes of the wrapped type system, store and index errors

use thiserror::Error;

use crate::index::IndexError;
use crate::observability::Severity;
use crate::store::{FsId, StoreError};
use crate::typesystem::TypeSystemError;

/// Result type for CAS operations
pub type CasResult<T> = Result<T, CasError>;

/// CAS errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CasError {
    /// No view with this name
    #[error("Unknown view '{0}'")]
    UnknownView(String),

    /// View name already taken
    #[error("View '{0}' already exists")]
    DuplicateView(String),

    /// Sofa data of a view can be set only once
    #[error("Sofa data of view '{0}' is already set")]
    SofaDataAlreadySet(String),

    /// Annotation belongs to another view's sofa
    #[error("Feature structure {fs} belongs to another sofa and cannot be indexed in view '{view}'")]
    WrongView {
        /// Offending feature structure
        fs: FsId,
        /// Target view
        view: String,
    },

    #[error(transparent)]
    TypeSystem(#[from] TypeSystemError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl CasError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CasError::UnknownView(_) => "CAS_VIEW_UNKNOWN",
            CasError::DuplicateView(_) => "CAS_VIEW_DUPLICATE",
            CasError::SofaDataAlreadySet(_) => "CAS_SOFA_DATA_ALREADY_SET",
            CasError::WrongView { .. } => "CAS_WRONG_VIEW",
            CasError::TypeSystem(e) => e.code(),
            CasError::Store(e) => e.code(),
            CasError::Index(e) => e.code(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CasError::TypeSystem(e) => e.severity(),
            _ => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CasError::UnknownView("v".into()).code(), "CAS_VIEW_UNKNOWN");
        let wrapped: CasError = StoreError::UnknownFs(FsId::from_raw(1)).into();
        assert_eq!(wrapped.code(), "CAS_STORE_UNKNOWN_FS");
        let fatal: CasError = TypeSystemError::UnknownType("x".into()).into();
        assert_eq!(fatal.severity(), Severity::Fatal);
    }
}
