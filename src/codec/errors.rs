//! Codec error types
//!
//! Every codec error aborts the document being read or written. A failed
//! deserialization leaves no partially-usable CAS behind.
//!
//! Error codes:
//! - CAS_CODEC_MALFORMED
//! - CAS_CODEC_UNKNOWN_TYPE
//! - CAS_CODEC_UNKNOWN_VIEW
//! - CAS_CODEC_UNRESOLVED_REFERENCE
//! - CAS_CODEC_MULTI_VIEW_DOCUMENT_ANNOTATION
//! - CAS_CODEC_JSON
//! - CAS_CODEC_IO
//! - codes of the wrapped type system, store and CAS errors

use thiserror::Error;

use crate::cas::CasError;
use crate::index::IndexError;
use crate::observability::Severity;
use crate::store::StoreError;
use crate::typesystem::TypeSystemError;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Document structure is not a valid CAS document
    #[error("Malformed CAS document: {0}")]
    Malformed(String),

    /// Feature structure names a type the type system lacks
    #[error("Unknown type '{0}' in CAS document")]
    UnknownType(String),

    /// Index section names a view that has no sofa
    #[error("Unknown view '{0}' in CAS document")]
    UnknownView(String),

    /// A reference names an id that never appears in the document
    #[error("Unresolved reference to feature structure id {id} from {source_name}")]
    UnresolvedReference {
        /// Referenced document id
        id: u64,
        /// Referring feature or array
        source_name: String,
    },

    /// A document annotation is indexed in more than one view
    #[error("Document annotation {0} is indexed in more than one view")]
    MultiViewDocumentAnnotation(u64),

    /// JSON syntax or encoding failure
    #[error("JSON error: {0}")]
    Json(String),

    /// File access failure
    #[error("I/O error on '{path}': {reason}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        reason: String,
    },

    #[error(transparent)]
    TypeSystem(#[from] TypeSystemError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cas(#[from] CasError),
}

impl From<IndexError> for CodecError {
    fn from(err: IndexError) -> Self {
        CodecError::Cas(CasError::Index(err))
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err.to_string())
    }
}

impl CodecError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Malformed(_) => "CAS_CODEC_MALFORMED",
            CodecError::UnknownType(_) => "CAS_CODEC_UNKNOWN_TYPE",
            CodecError::UnknownView(_) => "CAS_CODEC_UNKNOWN_VIEW",
            CodecError::UnresolvedReference { .. } => "CAS_CODEC_UNRESOLVED_REFERENCE",
            CodecError::MultiViewDocumentAnnotation(_) => "CAS_CODEC_MULTI_VIEW_DOCUMENT_ANNOTATION",
            CodecError::Json(_) => "CAS_CODEC_JSON",
            CodecError::Io { .. } => "CAS_CODEC_IO",
            CodecError::TypeSystem(e) => e.code(),
            CodecError::Store(e) => e.code(),
            CodecError::Cas(e) => e.code(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CodecError::TypeSystem(e) => e.severity(),
            CodecError::Cas(e) => e.severity(),
            _ => Severity::Error,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CodecError::Malformed(reason.into())
    }

    pub(crate) fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        CodecError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CodecError::malformed("x").code(), "CAS_CODEC_MALFORMED");
        let err = CodecError::UnresolvedReference {
            id: 7,
            source_name: "org.example.Token:next".into(),
        };
        assert_eq!(err.code(), "CAS_CODEC_UNRESOLVED_REFERENCE");
        assert!(err.to_string().contains("id 7"));
    }

    #[test]
    fn test_wrapped_codes_pass_through() {
        let err: CodecError = CasError::UnknownView("v".into()).into();
        assert_eq!(err.code(), "CAS_VIEW_UNKNOWN");
        let err: CodecError = IndexError::UnknownIndex("idx".into()).into();
        assert_eq!(err.code(), "CAS_INDEX_UNKNOWN");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CodecError = parse.into();
        assert_eq!(err.code(), "CAS_CODEC_JSON");
        assert_eq!(err.severity(), Severity::Error);
    }
}
