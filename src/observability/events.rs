//! Observable lifecycle events
//!
//! Events are explicit and typed. Each has a stable name that appears as the
//! `event` field of the emitted log record.

use std::fmt;

/// Observable events in a feature-structure store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Type system
    /// Type system sealed
    TypeSystemCommitted,

    // Views and indexes
    /// View and its sofa created
    ViewCreated,
    /// Index family declared on a repository
    IndexDeclared,
    /// Live index collection copied because a snapshot was outstanding
    SnapshotCopied,
    /// A view's document annotation was replaced
    DocumentAnnotationReplaced,

    // Codec
    /// Serialization begins
    SerializeStart,
    /// Serialization complete
    SerializeComplete,
    /// Deserialization begins
    DeserializeStart,
    /// Deserialization complete
    DeserializeComplete,
    /// Deserialization aborted
    DeserializeFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::TypeSystemCommitted => "TYPE_SYSTEM_COMMITTED",
            Event::ViewCreated => "VIEW_CREATED",
            Event::IndexDeclared => "INDEX_DECLARED",
            Event::SnapshotCopied => "SNAPSHOT_COPIED",
            Event::DocumentAnnotationReplaced => "DOCUMENT_ANNOTATION_REPLACED",
            Event::SerializeStart => "SERIALIZE_BEGIN",
            Event::SerializeComplete => "SERIALIZE_COMPLETE",
            Event::DeserializeStart => "DESERIALIZE_BEGIN",
            Event::DeserializeComplete => "DESERIALIZE_COMPLETE",
            Event::DeserializeFailed => "DESERIALIZE_FAILED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::DeserializeFailed)
    }

    /// High-frequency events are logged at debug level
    pub fn is_verbose(&self) -> bool {
        matches!(self, Event::SnapshotCopied | Event::IndexDeclared)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
