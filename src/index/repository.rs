//! Index repository
//!
//! One repository per view. It owns every index family declared for the
//! view and the view's membership set. A family holds one leaf index per
//! type subsumed by its base type, ordered by the linear type order; an
//! aggregate index over a type is the family's leaves for that type and its
//! subtypes.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use super::comparator::KeySpec;
use super::definition::{IndexDefinition, IndexDescription, IndexKind, ANNOTATION_INDEX};
use super::errors::{IndexError, IndexResult};
use super::leaf::{Insertion, LeafIndex};
use crate::iterator::{AggregateCursor, FsCursor, LeafCursor, Subiterator};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::store::{FsId, Store};
use crate::typesystem::{TypeId, TypeSystem};

#[derive(Debug)]
struct IndexFamily {
    definition: IndexDefinition,
    /// Leaves in linear type order
    leaves: Vec<LeafIndex>,
    position: HashMap<TypeId, usize>,
}

/// Index families and membership of one view.
#[derive(Debug)]
pub struct IndexRepository {
    ts: Arc<TypeSystem>,
    families: BTreeMap<String, IndexFamily>,
    members: BTreeSet<FsId>,
    metrics: Arc<MetricsRegistry>,
}

impl IndexRepository {
    /// Creates a repository holding the built-in annotation index.
    pub fn new(ts: Arc<TypeSystem>, metrics: Arc<MetricsRegistry>) -> IndexResult<Self> {
        let mut repo = Self {
            ts: ts.clone(),
            families: BTreeMap::new(),
            members: BTreeSet::new(),
            metrics,
        };
        repo.declare_index(IndexDefinition::annotation_index(&ts)?)?;
        Ok(repo)
    }

    pub fn type_system(&self) -> &Arc<TypeSystem> {
        &self.ts
    }

    /// Declares an index family.
    ///
    /// Re-declaring an identical definition is a no-op. Feature structures
    /// already in the view are not back-filled, so declare indexes before
    /// adding to them.
    pub fn declare_index(&mut self, definition: IndexDefinition) -> IndexResult<()> {
        if let Some(existing) = self.families.get(definition.name()) {
            if existing.definition == definition {
                return Ok(());
            }
            return Err(IndexError::DuplicateIndex(definition.name().to_string()));
        }

        let order = self.ts.type_order();
        let mut types: Vec<TypeId> = self.ts.subsumed_types(definition.base_type()).to_vec();
        types.sort_by_key(|t| order.rank(*t));

        let name: Arc<str> = Arc::from(definition.name());
        let comparator = Arc::new(definition.comparator().clone());
        let leaves: Vec<LeafIndex> = types
            .iter()
            .map(|t| {
                LeafIndex::new(
                    name.clone(),
                    *t,
                    order.rank(*t),
                    definition.kind(),
                    comparator.clone(),
                    self.metrics.clone(),
                )
            })
            .collect();
        let position = types.iter().enumerate().map(|(i, t)| (*t, i)).collect();

        log_event(
            Event::IndexDeclared,
            &[
                ("index", definition.name()),
                ("type", self.ts.type_name(definition.base_type())),
                ("kind", definition.kind().as_str()),
            ],
        );
        self.families.insert(
            definition.name().to_string(),
            IndexFamily {
                definition,
                leaves,
                position,
            },
        );
        Ok(())
    }

    /// Resolves and declares each description in turn.
    pub fn declare_indexes(&mut self, descriptions: &[IndexDescription]) -> IndexResult<()> {
        for description in descriptions {
            let definition = description.resolve(&self.ts)?;
            self.declare_index(definition)?;
        }
        Ok(())
    }

    /// Declared index names, sorted.
    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    pub fn definition(&self, name: &str) -> IndexResult<&IndexDefinition> {
        Ok(&self.family(name)?.definition)
    }

    fn family(&self, name: &str) -> IndexResult<&IndexFamily> {
        self.families
            .get(name)
            .ok_or_else(|| IndexError::UnknownIndex(name.to_string()))
    }

    /// Adds `fs` to the view and to every index whose base type subsumes
    /// its type. Adding a member again is a no-op.
    pub fn add(&mut self, store: &Store, fs: FsId) -> IndexResult<()> {
        let t = store.type_of(fs)?;
        if self.members.contains(&fs) {
            return Ok(());
        }
        for family in self.families.values_mut() {
            if let Some(&i) = family.position.get(&t) {
                if family.leaves[i].insert(store, fs)? == Insertion::DuplicateKey {
                    debug!(index = family.definition.name(), fs = fs.raw(), "set index kept existing element");
                }
            }
        }
        self.members.insert(fs);
        Ok(())
    }

    /// Removes `fs` from the view and every index, by identity. Returns
    /// false if it was not a member.
    pub fn remove(&mut self, store: &Store, fs: FsId) -> IndexResult<bool> {
        let t = store.type_of(fs)?;
        if !self.members.remove(&fs) {
            return Ok(false);
        }
        for family in self.families.values_mut() {
            if let Some(&i) = family.position.get(&t) {
                family.leaves[i].remove(fs);
            }
        }
        Ok(true)
    }

    /// True if `fs` was added to this view.
    pub fn is_member(&self, fs: FsId) -> bool {
        self.members.contains(&fs)
    }

    /// Members of the view in ascending id order.
    pub fn members(&self) -> impl Iterator<Item = FsId> + '_ {
        self.members.iter().copied()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Aggregate index over the family's base type.
    pub fn index(&self, name: &str) -> IndexResult<FsIndex<'_>> {
        let family = self.family(name)?;
        self.index_for_type(name, family.definition.base_type())
    }

    /// Aggregate index over `t` and its subtypes.
    pub fn index_for_type(&self, name: &str, t: TypeId) -> IndexResult<FsIndex<'_>> {
        let family = self.family(name)?;
        if !family.position.contains_key(&t) {
            return Err(self.not_in_index(name, t));
        }
        let leaves = family
            .leaves
            .iter()
            .filter(|leaf| self.ts.subsumes(t, leaf.type_id()))
            .collect();
        Ok(FsIndex {
            definition: &family.definition,
            type_id: t,
            leaves,
            aggregate: true,
            metrics: &self.metrics,
        })
    }

    /// Single-type index holding exactly the members of type `t`.
    pub fn leaf_index(&self, name: &str, t: TypeId) -> IndexResult<FsIndex<'_>> {
        let family = self.family(name)?;
        let i = *family.position.get(&t).ok_or_else(|| self.not_in_index(name, t))?;
        Ok(FsIndex {
            definition: &family.definition,
            type_id: t,
            leaves: vec![&family.leaves[i]],
            aggregate: false,
            metrics: &self.metrics,
        })
    }

    /// The built-in annotation index.
    pub fn annotation_index(&self) -> IndexResult<FsIndex<'_>> {
        self.index(ANNOTATION_INDEX)
    }

    fn not_in_index(&self, name: &str, t: TypeId) -> IndexError {
        IndexError::TypeNotInIndex {
            index: name.to_string(),
            type_name: self.ts.type_name(t).to_string(),
        }
    }
}

/// A read handle on a single-type or aggregate index.
#[derive(Debug)]
pub struct FsIndex<'a> {
    definition: &'a IndexDefinition,
    type_id: TypeId,
    leaves: Vec<&'a LeafIndex>,
    aggregate: bool,
    metrics: &'a MetricsRegistry,
}

impl<'a> FsIndex<'a> {
    pub fn definition(&self) -> &'a IndexDefinition {
        self.definition
    }

    pub fn name(&self) -> &'a str {
        self.definition.name()
    }

    pub fn kind(&self) -> IndexKind {
        self.definition.kind()
    }

    /// The type this handle covers.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn is_aggregate(&self) -> bool {
        self.aggregate
    }

    /// Number of members: O(1) for a single-type index, O(#subtypes) for
    /// an aggregate.
    pub fn size(&self) -> usize {
        self.leaves.iter().map(|leaf| leaf.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.iter().all(|leaf| leaf.len() == 0)
    }

    /// True if this exact feature structure is indexed here.
    pub fn contains_fs(&self, fs: FsId) -> bool {
        self.leaves.iter().any(|leaf| leaf.contains_id(fs))
    }

    /// First member equal to `template` under the index's comparator (the
    /// template itself for BAG indexes). Members are searched in linear
    /// type order.
    pub fn find(&self, store: &Store, template: FsId) -> IndexResult<Option<FsId>> {
        if self.kind() == IndexKind::Bag {
            return Ok(self.contains_fs(template).then_some(template));
        }
        let key = self.definition.comparator().extract(store, template)?;
        Ok(self.leaves.iter().find_map(|leaf| leaf.find_key(&key)))
    }

    /// True if some member equals `template` under the comparator.
    pub fn contains(&self, store: &Store, template: FsId) -> IndexResult<bool> {
        Ok(self.find(store, template)?.is_some())
    }

    /// A cursor on the first element of the current version.
    pub fn iterator(&self) -> FsCursor {
        self.metrics.increment_cursors();
        let mut cursors = self.leaves.iter().map(|leaf| {
            LeafCursor::new(
                leaf.entries().clone(),
                leaf.kind(),
                leaf.comparator().clone(),
                leaf.type_rank(),
            )
        });
        match (self.aggregate, cursors.next()) {
            (false, Some(cursor)) => FsCursor::Leaf(cursor),
            (_, first) => FsCursor::Aggregate(AggregateCursor::new(first.into_iter().chain(cursors).collect())),
        }
    }

    /// A cursor over the members covered by the annotation `bound`, in
    /// index order. With `strict`, members that begin inside the bound but
    /// end after it are skipped. The index must be ordered on `begin`
    /// ascending then `end` descending.
    pub fn subiterator(&self, store: &Store, bound: FsId, strict: bool) -> IndexResult<Subiterator> {
        let ts = store.type_system();
        let builtins = ts.builtins();
        let leading = [KeySpec::ascending(builtins.begin), KeySpec::descending(builtins.end)];
        if self.kind() == IndexKind::Bag || !self.definition.comparator().keys().starts_with(&leading) {
            return Err(IndexError::invalid_key(
                self.name(),
                "subiterator needs begin ascending, end descending as leading keys",
            ));
        }
        let key = self.definition.comparator().extract(store, bound)?;
        let rank = ts.type_order().rank(store.type_of(bound)?);
        debug!(index = self.name(), bound = bound.raw(), strict, "subiterator opened");
        Ok(Subiterator::new(self.iterator(), key, rank, strict))
    }
}
