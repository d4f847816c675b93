//! JSON Wire Codec
//!
//! Reads and writes whole CASes as JSON documents: the user type system
//! (`%TYPES`), per-view index membership (`%VIEWS`) and every reachable
//! feature structure (`%FEATURE_STRUCTURES`).
//!
//! ```json
//! {
//!   "%TYPES": { "org.example.Token": { "%NAME": "org.example.Token", "%SUPER_TYPE": "uima.tcas.Annotation" } },
//!   "%VIEWS": { "_InitialView": { "%SOFA": 1, "%INDEX": [2] } },
//!   "%FEATURE_STRUCTURES": [
//!     { "%ID": 1, "%TYPE": "uima.cas.Sofa", "sofaNum": 1, "sofaID": "_InitialView", "sofaString": "Hi" },
//!     { "%ID": 2, "%TYPE": "org.example.Token", "@sofa": 1, "begin": 0, "end": 2 }
//!   ]
//! }
//! ```
//!
//! # Invariants
//!
//! - `deserialize(serialize(cas))` has the same reachable graph, feature
//!   values and view membership as `cas`
//! - Reserved keys start with `%`; reference features with `@`
//! - A failed read returns an error and no CAS

mod deserializer;
mod document;
mod errors;
mod locator;
mod names;
mod options;
mod serializer;
mod types;
mod values;

use std::path::Path;

pub use deserializer::CasDeserializer;
pub use document::{FsSection, Object, WireDocument, WireView};
pub use errors::{CodecError, CodecResult};
pub use locator::{DataPathLocator, ResourceLocator};
pub use options::{ArrayRangeEncoding, CodecOptions, FsLayout, TypeSystemMode};
pub use serializer::{serialize_to_string, serialize_to_value, CasSerializer};

use crate::cas::Cas;

/// Reads a document, taking the type system from the document itself.
pub fn deserialize_from_str(input: &str) -> CodecResult<Cas> {
    CasDeserializer::new().read_str(input)
}

/// Reads a document file.
pub fn deserialize_from_file(path: &Path) -> CodecResult<Cas> {
    CasDeserializer::new().read_file(path)
}

/// Writes a CAS to `path`.
pub fn serialize_to_file(cas: &Cas, options: &CodecOptions, path: &Path) -> CodecResult<()> {
    let out = serialize_to_string(cas, options)?;
    std::fs::write(path, out).map_err(|e| CodecError::io(path.display().to_string(), e))
}
