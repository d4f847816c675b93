//! Common Analysis Structure
//!
//! Views over one shared feature structure store.
//!
//! # Invariants
//!
//! - `_InitialView` always exists and has sofa number 1
//! - Every view owns exactly one sofa; sofa data is set at most once
//! - An AnnotationBase feature structure is indexed only in its sofa's view
//! - At most one document annotation is tracked per view

mod container;
mod errors;
mod sofa;
mod view;

pub use container::Cas;
pub use errors::{CasError, CasResult};
pub use sofa::TEXT_MIME;
pub use view::{View, INITIAL_VIEW};
