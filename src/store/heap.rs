//! Feature structure arena
//!
//! Feature structures live in a single arena indexed by id. References
//! between feature structures are ids, never pointers, so cyclic graphs need
//! no special handling. Slot `i` of a feature structure holds the value of
//! the feature at offset `i` of its type's merged feature list; offsets are
//! stable across subtypes, so slot access is O(1) after the appropriateness
//! check.

use std::sync::Arc;

use super::array::ArrayData;
use super::errors::{StoreError, StoreResult};
use super::value::{FsId, Value};
use crate::observability::MetricsRegistry;
use crate::typesystem::{ArrayElement, FeatureId, PrimitiveKind, TypeId, TypeKind, TypeSystem};

#[derive(Debug, Clone)]
struct FsRecord {
    type_id: TypeId,
    slots: Vec<Value>,
    array: Option<ArrayData>,
}

/// Owner of every feature structure of one CAS.
#[derive(Debug)]
pub struct Store {
    ts: Arc<TypeSystem>,
    records: Vec<FsRecord>,
    metrics: Arc<MetricsRegistry>,
}

impl Store {
    /// Creates an empty store over a committed type system.
    pub fn new(ts: Arc<TypeSystem>) -> Self {
        Self::with_metrics(ts, Arc::new(MetricsRegistry::new()))
    }

    /// Creates an empty store reporting into a shared registry.
    pub fn with_metrics(ts: Arc<TypeSystem>, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            ts,
            records: Vec::new(),
            metrics,
        }
    }

    /// The type system this store validates against.
    pub fn type_system(&self) -> &Arc<TypeSystem> {
        &self.ts
    }

    /// Number of feature structures created so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = FsId> {
        (1..=self.records.len() as u32).map(FsId::from_raw)
    }

    /// True if `fs` names a feature structure of this store.
    pub fn contains(&self, fs: FsId) -> bool {
        fs.slot().map_or(false, |slot| slot < self.records.len())
    }

    /// Creates a feature structure with zero/null slots.
    ///
    /// Arrays, primitives, abstract bases and sofas have specialized
    /// constructors and fail with `NonCreatableType`.
    pub fn create(&mut self, t: TypeId) -> StoreResult<FsId> {
        let def = self.ts.type_def(t);
        if !def.is_creatable() {
            return Err(StoreError::NonCreatableType(def.name().to_string()));
        }
        Ok(self.push(t, None))
    }

    /// Creates an array of `len` elements of `element_type`.
    ///
    /// Primitive element types give the built-in primitive arrays; anything
    /// else gives the typed FS array for that element, or `uima.cas.FSArray`.
    pub fn create_array(&mut self, element_type: TypeId, len: usize) -> StoreResult<FsId> {
        let array_type = self.ts.array_type_for(element_type);
        self.create_array_of_type(array_type, len)
    }

    /// Creates an array instance of the given array type.
    pub fn create_array_of_type(&mut self, array_type: TypeId, len: usize) -> StoreResult<FsId> {
        let element = self.array_element(array_type)?;
        Ok(self.push(array_type, Some(ArrayData::new(element, len))))
    }

    /// Creates an array instance and fills it from `data` in one step.
    pub fn create_array_from(&mut self, array_type: TypeId, data: ArrayData) -> StoreResult<FsId> {
        let element = self.array_element(array_type)?;
        let expected = ArrayData::new(element, 0).element_kind();
        if data.element_kind() != expected {
            return Err(StoreError::mismatch(
                self.ts.type_name(array_type),
                expected.map_or("reference", |k| k.kind_name()),
                data.element_kind().map_or("reference", |k| k.kind_name()),
            ));
        }
        if let ArrayElement::Fs(element_type) = element {
            for target in data.refs() {
                self.check_ref_target(self.ts.type_name(array_type), element_type, target)?;
            }
        }
        Ok(self.push(array_type, Some(data)))
    }

    /// Sofas are created by the CAS when a view is created.
    pub(crate) fn create_sofa(&mut self) -> FsId {
        let sofa = self.ts.builtins().sofa;
        self.push(sofa, None)
    }

    fn array_element(&self, array_type: TypeId) -> StoreResult<ArrayElement> {
        match self.ts.type_def(array_type).kind() {
            TypeKind::Array(element) => Ok(*element),
            _ => Err(StoreError::NonCreatableType(self.ts.type_name(array_type).to_string())),
        }
    }

    fn push(&mut self, t: TypeId, array: Option<ArrayData>) -> FsId {
        let slots = self
            .ts
            .features_of(t)
            .iter()
            .map(|f| Value::default_for(self.ts.primitive_kind(self.ts.feature_def(*f).range())))
            .collect();
        self.records.push(FsRecord {
            type_id: t,
            slots,
            array,
        });
        self.metrics.increment_fs_created();
        FsId::from_raw(self.records.len() as u32)
    }

    fn record(&self, fs: FsId) -> StoreResult<&FsRecord> {
        fs.slot()
            .and_then(|slot| self.records.get(slot))
            .ok_or(StoreError::UnknownFs(fs))
    }

    fn record_mut(&mut self, fs: FsId) -> StoreResult<&mut FsRecord> {
        fs.slot()
            .and_then(|slot| self.records.get_mut(slot))
            .ok_or(StoreError::UnknownFs(fs))
    }

    /// The type of `fs`.
    pub fn type_of(&self, fs: FsId) -> StoreResult<TypeId> {
        Ok(self.record(fs)?.type_id)
    }

    // ---- slots ----

    fn offset_of(&self, type_id: TypeId, f: FeatureId) -> StoreResult<usize> {
        if !self.ts.is_appropriate(type_id, f) {
            return Err(StoreError::InappropriateFeature {
                type_name: self.ts.type_name(type_id).to_string(),
                feature: self.ts.feature_def(f).name().to_string(),
            });
        }
        Ok(self.ts.feature_def(f).offset())
    }

    /// Reads the value of feature `f` on `fs`.
    pub fn get(&self, fs: FsId, f: FeatureId) -> StoreResult<&Value> {
        let record = self.record(fs)?;
        let offset = self.offset_of(record.type_id, f)?;
        Ok(&record.slots[offset])
    }

    /// Writes the value of feature `f` on `fs`.
    ///
    /// The value must match the feature's range: the same scalar kind, an
    /// allowed value for enumerated strings, or a reference to a feature
    /// structure whose type the range subsumes.
    pub fn set(&mut self, fs: FsId, f: FeatureId, value: Value) -> StoreResult<()> {
        let type_id = self.type_of(fs)?;
        let offset = self.offset_of(type_id, f)?;
        let def = self.ts.feature_def(f);
        self.check_value(def.name(), def.range(), &value)?;
        self.record_mut(fs)?.slots[offset] = value;
        Ok(())
    }

    fn check_value(&self, target: &str, range: TypeId, value: &Value) -> StoreResult<()> {
        match (self.ts.primitive_kind(range), value) {
            (Some(expected), _) if value.kind() != Some(expected) => Err(StoreError::mismatch(
                target,
                self.ts.type_name(range),
                value.kind_name(),
            )),
            (Some(_), Value::String(Some(s))) => match self.ts.allowed_values(range) {
                Some(allowed) if !allowed.iter().any(|a| a == s) => Err(StoreError::IllegalStringValue {
                    type_name: self.ts.type_name(range).to_string(),
                    value: s.clone(),
                }),
                _ => Ok(()),
            },
            (Some(_), _) => Ok(()),
            (None, Value::Ref(None)) => Ok(()),
            (None, Value::Ref(Some(target_fs))) => self.check_ref_target(target, range, *target_fs),
            (None, other) => Err(StoreError::mismatch(target, self.ts.type_name(range), other.kind_name())),
        }
    }

    fn check_ref_target(&self, target: &str, range: TypeId, target_fs: FsId) -> StoreResult<()> {
        let actual = self.type_of(target_fs)?;
        if self.ts.subsumes(range, actual) {
            Ok(())
        } else {
            Err(StoreError::mismatch(
                target,
                self.ts.type_name(range),
                self.ts.type_name(actual),
            ))
        }
    }

    pub fn get_boolean(&self, fs: FsId, f: FeatureId) -> StoreResult<bool> {
        match self.get(fs, f)? {
            Value::Boolean(v) => Ok(*v),
            other => Err(self.read_mismatch(f, PrimitiveKind::Boolean, other)),
        }
    }

    pub fn get_int(&self, fs: FsId, f: FeatureId) -> StoreResult<i32> {
        match self.get(fs, f)? {
            Value::Integer(v) => Ok(*v),
            other => Err(self.read_mismatch(f, PrimitiveKind::Integer, other)),
        }
    }

    pub fn get_long(&self, fs: FsId, f: FeatureId) -> StoreResult<i64> {
        match self.get(fs, f)? {
            Value::Long(v) => Ok(*v),
            other => Err(self.read_mismatch(f, PrimitiveKind::Long, other)),
        }
    }

    pub fn get_float(&self, fs: FsId, f: FeatureId) -> StoreResult<f32> {
        match self.get(fs, f)? {
            Value::Float(v) => Ok(*v),
            other => Err(self.read_mismatch(f, PrimitiveKind::Float, other)),
        }
    }

    pub fn get_double(&self, fs: FsId, f: FeatureId) -> StoreResult<f64> {
        match self.get(fs, f)? {
            Value::Double(v) => Ok(*v),
            other => Err(self.read_mismatch(f, PrimitiveKind::Double, other)),
        }
    }

    pub fn get_string(&self, fs: FsId, f: FeatureId) -> StoreResult<Option<&str>> {
        match self.get(fs, f)? {
            Value::String(v) => Ok(v.as_deref()),
            other => Err(self.read_mismatch(f, PrimitiveKind::String, other)),
        }
    }

    /// Reads a reference feature; `None` is the null reference.
    pub fn get_ref(&self, fs: FsId, f: FeatureId) -> StoreResult<Option<FsId>> {
        match self.get(fs, f)? {
            Value::Ref(v) => Ok(*v),
            other => Err(StoreError::mismatch(
                self.ts.feature_def(f).name(),
                "reference",
                other.kind_name(),
            )),
        }
    }

    fn read_mismatch(&self, f: FeatureId, expected: PrimitiveKind, actual: &Value) -> StoreError {
        StoreError::mismatch(self.ts.feature_def(f).name(), expected.kind_name(), actual.kind_name())
    }

    pub fn set_boolean(&mut self, fs: FsId, f: FeatureId, value: bool) -> StoreResult<()> {
        self.set(fs, f, Value::Boolean(value))
    }

    pub fn set_int(&mut self, fs: FsId, f: FeatureId, value: i32) -> StoreResult<()> {
        self.set(fs, f, Value::Integer(value))
    }

    pub fn set_long(&mut self, fs: FsId, f: FeatureId, value: i64) -> StoreResult<()> {
        self.set(fs, f, Value::Long(value))
    }

    pub fn set_float(&mut self, fs: FsId, f: FeatureId, value: f32) -> StoreResult<()> {
        self.set(fs, f, Value::Float(value))
    }

    pub fn set_double(&mut self, fs: FsId, f: FeatureId, value: f64) -> StoreResult<()> {
        self.set(fs, f, Value::Double(value))
    }

    pub fn set_string(&mut self, fs: FsId, f: FeatureId, value: Option<&str>) -> StoreResult<()> {
        self.set(fs, f, Value::String(value.map(str::to_string)))
    }

    pub fn set_ref(&mut self, fs: FsId, f: FeatureId, target: Option<FsId>) -> StoreResult<()> {
        self.set(fs, f, Value::Ref(target))
    }

    // ---- arrays ----

    /// The elements of an array feature structure.
    pub fn array_data(&self, fs: FsId) -> StoreResult<&ArrayData> {
        self.record(fs)?.array.as_ref().ok_or(StoreError::NotAnArray(fs))
    }

    /// Length of an array feature structure.
    pub fn array_len(&self, fs: FsId) -> StoreResult<usize> {
        Ok(self.array_data(fs)?.len())
    }

    /// Reads element `index` of an array.
    pub fn array_get(&self, fs: FsId, index: usize) -> StoreResult<Value> {
        let data = self.array_data(fs)?;
        data.get(index).ok_or(StoreError::ArrayIndexOutOfBounds {
            index,
            length: data.len(),
        })
    }

    /// Writes element `index` of an array.
    pub fn array_set(&mut self, fs: FsId, index: usize, value: Value) -> StoreResult<()> {
        let array_type = self.type_of(fs)?;
        let length = self.array_len(fs)?;
        if index >= length {
            return Err(StoreError::ArrayIndexOutOfBounds { index, length });
        }
        if let (ArrayElement::Fs(element_type), Value::Ref(Some(target))) = (self.array_element(array_type)?, &value) {
            self.check_ref_target(self.ts.type_name(array_type), element_type, *target)?;
        }

        let type_name = self.ts.type_name(array_type).to_string();
        let data = self
            .record_mut(fs)?
            .array
            .as_mut()
            .ok_or(StoreError::NotAnArray(fs))?;
        let expected = data.element_kind().map_or("reference", |k| k.kind_name());
        data.put(index, value)
            .map_err(|rejected| StoreError::mismatch(type_name, expected, rejected.kind_name()))
    }

    /// Elements of a primitive array as values, in order.
    pub fn array_values(&self, fs: FsId) -> StoreResult<Vec<Value>> {
        let data = self.array_data(fs)?;
        Ok((0..data.len()).filter_map(|i| data.get(i)).collect())
    }
}
