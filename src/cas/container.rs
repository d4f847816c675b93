//! The CAS container
//!
//! A CAS binds one committed type system, one feature structure store, and
//! the views indexing that store. All views share the store; each view has
//! its own sofa and index repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::errors::{CasError, CasResult};
use super::view::{View, INITIAL_VIEW};
use crate::index::{IndexDescription, IndexRepository};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::store::{FsId, Store, StoreError, Value};
use crate::typesystem::{TypeId, TypeSystem};

/// Common Analysis Structure: store, views and their indexes.
#[derive(Debug)]
pub struct Cas {
    ts: Arc<TypeSystem>,
    store: Store,
    views: BTreeMap<String, View>,
    index_descriptions: Vec<IndexDescription>,
    metrics: Arc<MetricsRegistry>,
}

impl Cas {
    /// Creates a CAS with the initial view and the built-in indexes.
    pub fn new(ts: Arc<TypeSystem>) -> CasResult<Self> {
        Self::with_indexes(ts, Vec::new())
    }

    /// Creates a CAS whose views all declare `indexes` in addition to the
    /// built-in ones.
    pub fn with_indexes(ts: Arc<TypeSystem>, indexes: Vec<IndexDescription>) -> CasResult<Self> {
        let metrics = Arc::new(MetricsRegistry::new());
        let mut cas = Self {
            store: Store::with_metrics(ts.clone(), metrics.clone()),
            ts,
            views: BTreeMap::new(),
            index_descriptions: indexes,
            metrics,
        };
        cas.create_view(INITIAL_VIEW)?;
        Ok(cas)
    }

    pub fn type_system(&self) -> &Arc<TypeSystem> {
        &self.ts
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Direct store access for slot writes. Index membership is managed
    /// through the CAS.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Index declarations applied to every view.
    pub fn index_descriptions(&self) -> &[IndexDescription] {
        &self.index_descriptions
    }

    // ---- views ----

    /// Creates a view and its sofa.
    pub fn create_view(&mut self, name: &str) -> CasResult<&View> {
        if self.views.contains_key(name) {
            return Err(CasError::DuplicateView(name.to_string()));
        }
        let sofa_num = self.views.values().map(|v| v.sofa_num).max().unwrap_or(0) + 1;
        self.create_view_numbered(name, sofa_num)
    }

    pub(crate) fn create_view_numbered(&mut self, name: &str, sofa_num: i32) -> CasResult<&View> {
        let mut indexes = IndexRepository::new(self.ts.clone(), self.metrics.clone())?;
        indexes.declare_indexes(&self.index_descriptions)?;

        let builtins = self.ts.builtins().clone();
        let sofa = self.store.create_sofa();
        self.store.set(sofa, builtins.sofa_num, Value::Integer(sofa_num))?;
        self.store.set(sofa, builtins.sofa_id, Value::from(name))?;

        log_event(
            Event::ViewCreated,
            &[("view", name), ("sofa_num", sofa_num.to_string().as_str())],
        );
        let view = self.views.entry(name.to_string()).or_insert(View {
            name: name.to_string(),
            sofa,
            sofa_num,
            indexes,
            document_annotation: None,
        });
        Ok(view)
    }

    pub fn view(&self, name: &str) -> CasResult<&View> {
        self.views
            .get(name)
            .ok_or_else(|| CasError::UnknownView(name.to_string()))
    }

    pub(crate) fn view_mut(&mut self, name: &str) -> CasResult<&mut View> {
        self.views
            .get_mut(name)
            .ok_or_else(|| CasError::UnknownView(name.to_string()))
    }

    pub fn initial_view(&self) -> CasResult<&View> {
        self.view(INITIAL_VIEW)
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    /// Views in name order.
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    /// The view owning `sofa`, if any.
    pub fn view_of_sofa(&self, sofa: FsId) -> Option<&View> {
        self.views.values().find(|v| v.sofa == sofa)
    }

    /// Names of the views `fs` is indexed in.
    pub fn indexed_in(&self, fs: FsId) -> Vec<&str> {
        self.views
            .values()
            .filter(|v| v.indexes.is_member(fs))
            .map(|v| v.name.as_str())
            .collect()
    }

    // ---- feature structures ----

    /// Creates a feature structure; annotation types get `view`'s sofa.
    pub fn create_fs(&mut self, view: &str, t: TypeId) -> CasResult<FsId> {
        let sofa = self.view(view)?.sofa;
        let fs = self.store.create(t)?;
        if self.ts.subsumes(self.ts.builtins().annotation_base, t) {
            self.store.set_ref(fs, self.ts.builtins().sofa_ref, Some(sofa))?;
        }
        Ok(fs)
    }

    /// Creates an annotation over `begin..end` of `view`'s sofa. The
    /// annotation is not indexed.
    pub fn create_annotation(&mut self, view: &str, t: TypeId, begin: i32, end: i32) -> CasResult<FsId> {
        let builtins = self.ts.builtins().clone();
        if !self.ts.subsumes(builtins.annotation, t) {
            return Err(StoreError::mismatch(
                "annotation",
                self.ts.type_name(builtins.annotation),
                self.ts.type_name(t),
            )
            .into());
        }
        let fs = self.create_fs(view, t)?;
        self.store.set_int(fs, builtins.begin, begin)?;
        self.store.set_int(fs, builtins.end, end)?;
        Ok(fs)
    }

    /// Adds `fs` to `view`'s indexes. Annotations must belong to the view's
    /// sofa; one with no sofa is bound to it.
    pub fn add_to_indexes(&mut self, view: &str, fs: FsId) -> CasResult<()> {
        let builtins = self.ts.builtins().clone();
        let t = self.store.type_of(fs)?;
        let sofa = self.view(view)?.sofa;

        if self.ts.subsumes(builtins.annotation_base, t) {
            match self.store.get_ref(fs, builtins.sofa_ref)? {
                Some(owner) if owner != sofa => {
                    return Err(CasError::WrongView {
                        fs,
                        view: view.to_string(),
                    })
                }
                Some(_) => {}
                None => self.store.set_ref(fs, builtins.sofa_ref, Some(sofa))?,
            }
        }

        let is_document = self.ts.subsumes(builtins.document_annotation, t);
        let v = self
            .views
            .get_mut(view)
            .ok_or_else(|| CasError::UnknownView(view.to_string()))?;
        v.indexes.add(&self.store, fs)?;
        if is_document && v.document_annotation.is_none() {
            v.document_annotation = Some(fs);
        }
        Ok(())
    }

    /// Removes `fs` from `view`'s indexes by identity.
    pub fn remove_from_indexes(&mut self, view: &str, fs: FsId) -> CasResult<bool> {
        let v = self
            .views
            .get_mut(view)
            .ok_or_else(|| CasError::UnknownView(view.to_string()))?;
        let removed = v.indexes.remove(&self.store, fs)?;
        if v.document_annotation == Some(fs) {
            v.document_annotation = None;
        }
        Ok(removed)
    }
}
