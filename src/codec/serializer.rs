//! CAS → JSON document
//!
//! Walk order: type system, then views (by sofa number), then every feature
//! structure reachable from a sofa or an indexed feature structure, in id
//! order. Output is deterministic for a given CAS and option set.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::{json, Value as Json};

use super::document::{FsSection, Object, WireDocument, WireView};
use super::errors::CodecResult;
use super::names;
use super::options::{CodecOptions, FsLayout, TypeSystemMode};
use super::types::encode_types;
use super::values::{encode_array, encode_value, wire_id};
use crate::cas::Cas;
use crate::observability::{log_event, Event};
use crate::store::FsId;
use crate::typesystem::ArrayElement;

/// Writes one CAS as a JSON document.
pub struct CasSerializer<'a> {
    cas: &'a Cas,
    options: &'a CodecOptions,
}

impl<'a> CasSerializer<'a> {
    pub fn new(cas: &'a Cas, options: &'a CodecOptions) -> Self {
        Self { cas, options }
    }

    /// Builds the document model.
    pub fn document(&self) -> CodecResult<WireDocument> {
        let ts = self.cas.type_system();

        let types = match self.options.type_system {
            TypeSystemMode::Full => Some(encode_types(&ts.describe(), self.options.array_range_encoding)),
            TypeSystemMode::None => None,
        };

        let mut views: Vec<_> = self.cas.views().collect();
        views.sort_by_key(|v| v.sofa_num());

        let mut roots = Vec::new();
        let mut members = HashSet::new();
        let mut wire_views = Object::new();
        for view in &views {
            roots.push(view.sofa());
            let index: Vec<FsId> = view.indexes().members().collect();
            roots.extend(index.iter().copied());
            members.extend(index.iter().copied());
            wire_views.push(
                view.name(),
                WireView {
                    sofa: wire_id(view.sofa()),
                    index: index.into_iter().map(wire_id).collect(),
                },
            );
        }

        let reachable: BTreeSet<FsId> = self.cas.store().reachable_from(&roots)?.into_iter().collect();
        let embedded = if self.options.embed_owned_arrays {
            self.owned_arrays(&reachable, &members)?
        } else {
            HashSet::new()
        };

        let mut objects = Vec::with_capacity(reachable.len());
        for fs in &reachable {
            if embedded.contains(fs) {
                continue;
            }
            objects.push((*fs, self.encode_fs(*fs, &embedded)?));
        }

        let feature_structures = match self.options.fs_layout {
            FsLayout::Array => FsSection::Array(objects.into_iter().map(|(_, o)| o).collect()),
            FsLayout::Map => {
                let mut map = Object::new();
                for (fs, mut object) in objects {
                    object.0.retain(|(k, _)| k != names::ID);
                    map.push(wire_id(fs).to_string(), object);
                }
                FsSection::Map(map)
            }
        };

        Ok(WireDocument {
            type_system_ref: self.options.type_system_ref.clone(),
            types,
            views: wire_views,
            feature_structures,
        })
    }

    /// Serializes to a JSON string.
    pub fn to_json(&self) -> CodecResult<String> {
        let views = self.cas.views().count().to_string();
        log_event(Event::SerializeStart, &[("views", views.as_str())]);

        let document = self.document()?;
        let out = if self.options.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };

        self.cas.metrics().increment_serialized();
        log_event(
            Event::SerializeComplete,
            &[
                ("views", views.as_str()),
                ("feature_structures", document_size(&document).to_string().as_str()),
                ("bytes", out.len().to_string().as_str()),
            ],
        );
        Ok(out)
    }

    fn encode_fs(&self, fs: FsId, embedded: &HashSet<FsId>) -> CodecResult<Object> {
        let ts = self.cas.type_system();
        let store = self.cas.store();
        let t = store.type_of(fs)?;

        let mut object = Object::new();
        object.push(names::ID, json!(wire_id(fs)));
        object.push(names::TYPE, json!(ts.type_name(t)));

        if ts.type_def(t).is_array() {
            object.push(names::ELEMENTS, encode_array(store.array_data(fs)?));
            return Ok(object);
        }

        for f in ts.features_of(t) {
            let def = ts.feature_def(*f);
            let value = store.get(fs, *f)?;
            if !ts.is_reference_feature(*f) {
                if let Some(json) = encode_value(value) {
                    object.push(def.short_name(), json);
                }
                continue;
            }
            match value.as_ref_id() {
                Some(target) if embedded.contains(&target) => {
                    object.push(def.short_name(), encode_array(store.array_data(target)?));
                }
                Some(target) => {
                    object.push(format!("{}{}", names::REF_PREFIX, def.short_name()), json!(wire_id(target)));
                }
                None => {}
            }
        }
        Ok(object)
    }

    /// Primitive arrays referenced exactly once, from a feature whose range is
    /// their own array type, and not indexed themselves.
    fn owned_arrays(&self, reachable: &BTreeSet<FsId>, members: &HashSet<FsId>) -> CodecResult<HashSet<FsId>> {
        let ts = self.cas.type_system();
        let store = self.cas.store();
        let mut referrers: HashMap<FsId, (usize, bool)> = HashMap::new();

        for fs in reachable {
            let t = store.type_of(*fs)?;
            if let Ok(data) = store.array_data(*fs) {
                for target in data.refs() {
                    referrers.entry(target).or_insert((0, false)).0 += 2;
                }
                continue;
            }
            for f in ts.features_of(t) {
                if !ts.is_reference_feature(*f) {
                    continue;
                }
                if let Some(target) = store.get(*fs, *f)?.as_ref_id() {
                    let exact = store.type_of(target)? == ts.feature_def(*f).range();
                    let entry = referrers.entry(target).or_insert((0, true));
                    entry.0 += 1;
                    entry.1 &= exact;
                }
            }
        }

        let mut owned = HashSet::new();
        for (fs, (count, exact)) in referrers {
            if count != 1 || !exact || members.contains(&fs) {
                continue;
            }
            let t = store.type_of(fs)?;
            if matches!(ts.type_def(t).array_element(), Some(ArrayElement::Primitive(_))) {
                owned.insert(fs);
            }
        }
        Ok(owned)
    }
}

fn document_size(document: &WireDocument) -> usize {
    match &document.feature_structures {
        FsSection::Array(list) => list.len(),
        FsSection::Map(map) => map.len(),
    }
}

/// Serializes a CAS to a JSON string.
pub fn serialize_to_string(cas: &Cas, options: &CodecOptions) -> CodecResult<String> {
    CasSerializer::new(cas, options).to_json()
}

/// Serializes a CAS to a JSON value, ignoring `pretty`.
pub fn serialize_to_value(cas: &Cas, options: &CodecOptions) -> CodecResult<Json> {
    let document = CasSerializer::new(cas, options).document()?;
    Ok(serde_json::to_value(&document)?)
}
