//! JSON document → CAS
//!
//! A single forward pass over `%FEATURE_STRUCTURES` creates each feature
//! structure as it is met. References to ids not seen yet are deferred and
//! resolved once the section has been consumed; any still missing then is
//! `UnresolvedReference`. Index membership from `%VIEWS` is applied last.
//!
//! Deserialization always builds a fresh CAS, so a failed read leaves
//! nothing behind.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde_json::Value as Json;

use super::document::{feature_key, Object, WireDocument, WireView};
use super::errors::{CodecError, CodecResult};
use super::locator::ResourceLocator;
use super::names;
use super::types::decode_types;
use super::values::{decode_array, decode_ref, decode_value, DecodedArray};
use crate::cas::Cas;
use crate::index::IndexDescription;
use crate::observability::{log_event, Event};
use crate::store::{FsId, Value};
use crate::typesystem::builtin::{ARRAY_TYPE_SUFFIX, FEATURE_BASE_NAME_SOFAID, FEATURE_BASE_NAME_SOFANUM};
use crate::typesystem::{
    ArrayElement, FeatureId, PrimitiveKind, TypeId, TypeOrderPolicy, TypeSystem, TypeSystemBuilder,
    TypeSystemDescription,
};

/// Reads JSON documents into fresh CASes.
///
/// The type system comes from, in order of preference: the one supplied
/// with [`CasDeserializer::with_type_system`], the document's `%TYPES`, the
/// descriptor named by `%TYPE_SYSTEM_REF` (resolved through the locator),
/// or the built-in types alone.
#[derive(Default)]
pub struct CasDeserializer {
    type_system: Option<Arc<TypeSystem>>,
    locator: Option<Box<dyn ResourceLocator>>,
    indexes: Vec<IndexDescription>,
    policy: TypeOrderPolicy,
}

impl CasDeserializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_system(mut self, ts: Arc<TypeSystem>) -> Self {
        self.type_system = Some(ts);
        self
    }

    pub fn with_locator(mut self, locator: impl ResourceLocator + 'static) -> Self {
        self.locator = Some(Box::new(locator));
        self
    }

    /// Indexes declared in every view of the resulting CAS.
    pub fn with_indexes(mut self, indexes: Vec<IndexDescription>) -> Self {
        self.indexes = indexes;
        self
    }

    /// Type order policy for type systems built from the document.
    pub fn with_type_order(mut self, policy: TypeOrderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reads a document from a JSON string.
    pub fn read_str(&self, input: &str) -> CodecResult<Cas> {
        log_event(Event::DeserializeStart, &[("bytes", input.len().to_string().as_str())]);
        let result = serde_json::from_str::<WireDocument>(input)
            .map_err(CodecError::from)
            .and_then(|document| self.read_document(document));
        if let Err(err) = &result {
            log_event(
                Event::DeserializeFailed,
                &[("code", err.code()), ("error", err.to_string().as_str())],
            );
        }
        result
    }

    /// Reads a document file.
    pub fn read_file(&self, path: &Path) -> CodecResult<Cas> {
        let input = std::fs::read_to_string(path).map_err(|e| CodecError::io(path.display().to_string(), e))?;
        self.read_str(&input)
    }

    /// Builds a CAS from a parsed document.
    pub fn read_document(&self, document: WireDocument) -> CodecResult<Cas> {
        let ts = self.resolve_type_system(&document)?;
        let cas = Cas::with_indexes(ts, self.indexes.clone())?;
        let mut reader = Reader::new(cas);

        let entries = document.feature_structures.into_entries().map_err(CodecError::Malformed)?;
        for (key_id, object) in &entries {
            reader.read_fs(*key_id, object)?;
        }
        reader.resolve_deferred()?;
        reader.apply_views(&document.views)?;

        let cas = reader.cas;
        cas.metrics().increment_deserialized();
        log_event(
            Event::DeserializeComplete,
            &[
                ("views", cas.views().count().to_string().as_str()),
                ("feature_structures", entries.len().to_string().as_str()),
            ],
        );
        Ok(cas)
    }

    fn resolve_type_system(&self, document: &WireDocument) -> CodecResult<Arc<TypeSystem>> {
        if let Some(ts) = &self.type_system {
            return Ok(ts.clone());
        }
        if let Some(types) = &document.types {
            return Ok(Arc::new(decode_types(types)?.build(self.policy)?));
        }
        if let Some(reference) = &document.type_system_ref {
            let path = self
                .locator
                .as_ref()
                .and_then(|locator| locator.locate(reference))
                .ok_or_else(|| {
                    CodecError::malformed(format!("type system reference '{}' cannot be located", reference))
                })?;
            return Ok(Arc::new(TypeSystemDescription::load(&path)?.build(self.policy)?));
        }
        let mut builder = TypeSystemBuilder::new();
        builder.set_type_order_policy(self.policy);
        Ok(Arc::new(builder.commit()?))
    }
}

enum Slot {
    Feature(FeatureId),
    Element(usize),
}

struct Deferred {
    fs: FsId,
    slot: Slot,
    target: u64,
    source: String,
}

struct Reader {
    cas: Cas,
    ts: Arc<TypeSystem>,
    ids: HashMap<u64, FsId>,
    deferred: Vec<Deferred>,
    sofas_seen: HashSet<String>,
}

impl Reader {
    fn new(cas: Cas) -> Self {
        Self {
            ts: cas.type_system().clone(),
            cas,
            ids: HashMap::new(),
            deferred: Vec::new(),
            sofas_seen: HashSet::new(),
        }
    }

    fn read_fs(&mut self, key_id: Option<u64>, object: &Object) -> CodecResult<()> {
        let id = match key_id {
            Some(id) => id,
            None => object
                .get(names::ID)
                .and_then(Json::as_u64)
                .ok_or_else(|| CodecError::malformed("feature structure without a numeric %ID"))?,
        };
        if self.ids.contains_key(&id) {
            return Err(CodecError::malformed(format!("duplicate feature structure id {}", id)));
        }
        let type_name = object
            .get(names::TYPE)
            .and_then(Json::as_str)
            .ok_or_else(|| CodecError::malformed(format!("feature structure {} has no %TYPE", id)))?;
        let t = self.resolve_type(type_name)?;

        if t == self.ts.builtins().sofa {
            let sofa = self.read_sofa(id, object)?;
            self.ids.insert(id, sofa);
            return self.assign_features(sofa, t, object, &[FEATURE_BASE_NAME_SOFANUM, FEATURE_BASE_NAME_SOFAID]);
        }

        if let Some(element) = self.ts.type_def(t).array_element() {
            return self.read_array(id, t, element, object);
        }

        let fs = self.cas.store_mut().create(t)?;
        self.ids.insert(id, fs);
        self.assign_features(fs, t, object, &[])
    }

    fn resolve_type(&self, name: &str) -> CodecResult<TypeId> {
        if let Some(t) = self.ts.type_by_name(name) {
            return Ok(t);
        }
        // Typed arrays not implied by any feature range fall back to FSArray
        name.strip_suffix(ARRAY_TYPE_SUFFIX)
            .and_then(|element| self.ts.type_by_name(element))
            .map(|element| self.ts.array_type_for(element))
            .ok_or_else(|| CodecError::UnknownType(name.to_string()))
    }

    fn read_sofa(&mut self, id: u64, object: &Object) -> CodecResult<FsId> {
        let view = object
            .get(FEATURE_BASE_NAME_SOFAID)
            .and_then(Json::as_str)
            .ok_or_else(|| CodecError::malformed(format!("sofa {} has no {}", id, FEATURE_BASE_NAME_SOFAID)))?
            .to_string();
        if !self.sofas_seen.insert(view.clone()) {
            return Err(CodecError::malformed(format!("view '{}' has more than one sofa", view)));
        }
        if let Ok(existing) = self.cas.view(&view) {
            return Ok(existing.sofa());
        }
        let sofa_num = match object.get(FEATURE_BASE_NAME_SOFANUM) {
            Some(json) => match decode_value(PrimitiveKind::Integer, json, &view)? {
                Value::Integer(n) => Some(n),
                _ => None,
            },
            None => None,
        };
        let created = match sofa_num {
            Some(n) => self.cas.create_view_numbered(&view, n)?,
            None => self.cas.create_view(&view)?,
        };
        Ok(created.sofa())
    }

    fn read_array(&mut self, id: u64, t: TypeId, element: ArrayElement, object: &Object) -> CodecResult<()> {
        let owner = self.ts.type_name(t).to_string();
        let elements = object.get(names::ELEMENTS).cloned().unwrap_or(Json::Array(Vec::new()));
        match decode_array(element, &elements, &owner)? {
            DecodedArray::Primitive(data) => {
                let fs = self.cas.store_mut().create_array_from(t, data)?;
                self.ids.insert(id, fs);
            }
            DecodedArray::Fs(targets) => {
                let fs = self.cas.store_mut().create_array_of_type(t, targets.len())?;
                self.ids.insert(id, fs);
                for (index, target) in targets.into_iter().enumerate() {
                    if let Some(target) = target {
                        self.set_or_defer(fs, Slot::Element(index), target, &owner)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn assign_features(&mut self, fs: FsId, t: TypeId, object: &Object, skip: &[&str]) -> CodecResult<()> {
        for (key, json) in object.iter() {
            if key.starts_with(names::RESERVED_PREFIX) || skip.contains(&key) {
                continue;
            }
            let (short, is_ref) = feature_key(key);
            let f = self.ts.feature_by_short_name(t, short).ok_or_else(|| {
                CodecError::malformed(format!("type '{}' has no feature '{}'", self.ts.type_name(t), short))
            })?;
            let def = self.ts.feature_def(f);
            let owner = def.name().to_string();
            let range = def.range();

            if !self.ts.is_reference_feature(f) {
                if is_ref {
                    return Err(CodecError::malformed(format!("{} is not a reference feature", owner)));
                }
                let kind = self
                    .ts
                    .primitive_kind(range)
                    .ok_or_else(|| CodecError::malformed(format!("{} has no primitive range", owner)))?;
                let value = decode_value(kind, json, &owner)?;
                self.cas.store_mut().set(fs, f, value)?;
                continue;
            }

            if is_ref {
                if let Some(target) = decode_ref(json, &owner)? {
                    self.set_or_defer(fs, Slot::Feature(f), target, &owner)?;
                }
                continue;
            }

            // Inline (embedded) primitive array
            match self.ts.type_def(range).array_element() {
                Some(element @ ArrayElement::Primitive(_)) => {
                    if let DecodedArray::Primitive(data) = decode_array(element, json, &owner)? {
                        let array = self.cas.store_mut().create_array_from(range, data)?;
                        self.cas.store_mut().set_ref(fs, f, Some(array))?;
                    }
                }
                _ => {
                    return Err(CodecError::malformed(format!(
                        "reference feature {} must be written as '{}{}'",
                        owner,
                        names::REF_PREFIX,
                        short
                    )))
                }
            }
        }
        Ok(())
    }

    fn set_or_defer(&mut self, fs: FsId, slot: Slot, target: u64, source: &str) -> CodecResult<()> {
        match self.ids.get(&target) {
            Some(resolved) => self.write_slot(fs, &slot, *resolved),
            None => {
                self.deferred.push(Deferred {
                    fs,
                    slot,
                    target,
                    source: source.to_string(),
                });
                Ok(())
            }
        }
    }

    fn write_slot(&mut self, fs: FsId, slot: &Slot, target: FsId) -> CodecResult<()> {
        let store = self.cas.store_mut();
        match slot {
            Slot::Feature(f) => store.set(fs, *f, Value::Ref(Some(target)))?,
            Slot::Element(index) => store.array_set(fs, *index, Value::Ref(Some(target)))?,
        }
        Ok(())
    }

    fn resolve_deferred(&mut self) -> CodecResult<()> {
        for pending in std::mem::take(&mut self.deferred) {
            let target = *self.ids.get(&pending.target).ok_or(CodecError::UnresolvedReference {
                id: pending.target,
                source_name: pending.source.clone(),
            })?;
            self.write_slot(pending.fs, &pending.slot, target)?;
        }
        Ok(())
    }

    fn apply_views(&mut self, views: &Object<WireView>) -> CodecResult<()> {
        let document_annotation = self.ts.builtins().document_annotation;
        let mut document_owner: HashMap<FsId, String> = HashMap::new();
        let mut reconciled: HashSet<String> = HashSet::new();

        for (name, view) in views.iter() {
            let sofa = self
                .cas
                .view(name)
                .map_err(|_| CodecError::UnknownView(name.to_string()))?
                .sofa();
            if self.ids.get(&view.sofa) != Some(&sofa) {
                return Err(CodecError::malformed(format!(
                    "view '{}' names sofa {} which is not its sofa",
                    name, view.sofa
                )));
            }

            for id in &view.index {
                let fs = *self.ids.get(id).ok_or_else(|| CodecError::UnresolvedReference {
                    id: *id,
                    source_name: format!("{}/{}", names::VIEWS, name),
                })?;
                let t = self.cas.store().type_of(fs)?;
                if !self.ts.subsumes(document_annotation, t) {
                    self.cas.add_to_indexes(name, fs)?;
                    continue;
                }

                if let Some(owner) = document_owner.get(&fs) {
                    if owner != name {
                        return Err(CodecError::MultiViewDocumentAnnotation(*id));
                    }
                }
                document_owner.insert(fs, name.to_string());
                if reconciled.insert(name.to_string()) {
                    self.cas.set_document_annotation(name, fs)?;
                } else {
                    self.cas.add_to_indexes(name, fs)?;
                }
            }
        }
        Ok(())
    }
}
