//! Iterator error types
//!
//! Error codes:
//! - CAS_ITER_NO_SUCH_ELEMENT
//! - CAS_INDEX_* / CAS_STORE_* (template key extraction failed)

use thiserror::Error;

use crate::index::IndexError;
use crate::observability::Severity;

/// Result type for cursor operations
pub type IteratorResult<T> = Result<T, IteratorError>;

/// Cursor errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IteratorError {
    /// `get` on a cursor positioned past either end
    #[error("Cursor is not positioned on an element")]
    NoSuchElement,

    /// The template of a `move_to` has no key for this index
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl IteratorError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IteratorError::NoSuchElement => "CAS_ITER_NO_SUCH_ELEMENT",
            IteratorError::Index(e) => e.code(),
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}
