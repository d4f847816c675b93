//! Feature Structure Store
//!
//! Typed instances of a committed type system, held in an id-indexed arena.
//!
//! # Invariants
//!
//! - An FS has exactly one type, fixed at creation
//! - Ids are assigned in creation order and never reused
//! - Every slot value matches its feature's range
//! - Index membership is not stored here; the store knows nothing of views

mod array;
mod errors;
mod heap;
mod reachability;
mod value;

pub use array::ArrayData;
pub use errors::{StoreError, StoreResult};
pub use heap::Store;
pub use value::{FsId, Value};
