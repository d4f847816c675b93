//! Index Repository subsystem
//!
//! Comparator engine, per-view index families, and the copy-on-write
//! collections cursors read from.
//!
//! # Design Principles
//!
//! - Index kinds are a closed set: SORTED, SET, BAG
//! - Leaf indexes hold exactly one type; aggregates compose leaves
//! - Membership changes are immediate for the writer and invisible to
//!   cursors until they reposition
//!
//! # Invariants
//!
//! - A SET leaf never holds two entries with equal keys
//! - Leaf entries are strictly ordered by (key, tie-break)
//! - Removal is by identity, never by recomputed key
//! - Aggregate size is the sum of its leaf sizes

mod comparator;
mod cow;
mod definition;
mod errors;
mod key;
mod leaf;
mod repository;

pub use comparator::{Comparator, KeySpec, KeySpecDescription};
pub use cow::{CowVec, Snapshot};
pub use definition::{IndexDefinition, IndexDescription, IndexKind, ANNOTATION_INDEX};
pub use errors::{IndexError, IndexResult};
pub use key::{IndexKey, KeyComponent, KeyValue, SortOrder};
pub use leaf::{IndexEntry, Insertion};
pub use repository::{FsIndex, IndexRepository};
