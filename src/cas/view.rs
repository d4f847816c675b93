//! Views

use crate::index::IndexRepository;
use crate::store::FsId;

/// Name of the view every CAS starts with.
pub const INITIAL_VIEW: &str = "_InitialView";

/// A named index partition with its own sofa.
#[derive(Debug)]
pub struct View {
    pub(crate) name: String,
    pub(crate) sofa: FsId,
    pub(crate) sofa_num: i32,
    pub(crate) indexes: IndexRepository,
    pub(crate) document_annotation: Option<FsId>,
}

impl View {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The view's sofa feature structure.
    pub fn sofa(&self) -> FsId {
        self.sofa
    }

    /// Sofa number, 1 for the initial view.
    pub fn sofa_num(&self) -> i32 {
        self.sofa_num
    }

    /// The view's index repository.
    pub fn indexes(&self) -> &IndexRepository {
        &self.indexes
    }

    /// The view's document annotation, if one was created or indexed.
    pub fn document_annotation(&self) -> Option<FsId> {
        self.document_annotation
    }
}
