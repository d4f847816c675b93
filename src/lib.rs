//! aerocas - A strict, deterministic feature structure store
//!
//! Typed feature structures, per-view indexes with snapshot iterators and a
//! JSON wire codec.
//!
//! - `typesystem`: type hierarchy, features and the linear type order
//! - `store`: feature structure heap
//! - `index`: sorted, set and bag indexes with subtype aggregation
//! - `iterator`: cursors over index snapshots
//! - `cas`: views, sofas and the document annotation
//! - `codec`: JSON serialization
//! - `config`: store-wide settings

pub mod cas;
pub mod cli;
pub mod codec;
pub mod config;
pub mod index;
pub mod iterator;
pub mod observability;
pub mod store;
pub mod typesystem;
