//! Array payloads
//!
//! Arrays are contiguous, fixed-length and typed by element kind. Primitive
//! elements are stored unboxed; feature structure elements are stored as ids.

use super::value::{FsId, Value};
use crate::typesystem::{ArrayElement, PrimitiveKind};

/// Elements of an array feature structure.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Boolean(Vec<bool>),
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Integer(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    String(Vec<Option<String>>),
    Fs(Vec<Option<FsId>>),
}

impl ArrayData {
    /// A zero-filled array of `len` elements.
    pub fn new(element: ArrayElement, len: usize) -> Self {
        match element {
            ArrayElement::Primitive(PrimitiveKind::Boolean) => ArrayData::Boolean(vec![false; len]),
            ArrayElement::Primitive(PrimitiveKind::Byte) => ArrayData::Byte(vec![0; len]),
            ArrayElement::Primitive(PrimitiveKind::Short) => ArrayData::Short(vec![0; len]),
            ArrayElement::Primitive(PrimitiveKind::Integer) => ArrayData::Integer(vec![0; len]),
            ArrayElement::Primitive(PrimitiveKind::Long) => ArrayData::Long(vec![0; len]),
            ArrayElement::Primitive(PrimitiveKind::Float) => ArrayData::Float(vec![0.0; len]),
            ArrayElement::Primitive(PrimitiveKind::Double) => ArrayData::Double(vec![0.0; len]),
            ArrayElement::Primitive(PrimitiveKind::String) => ArrayData::String(vec![None; len]),
            ArrayElement::Fs(_) => ArrayData::Fs(vec![None; len]),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Boolean(v) => v.len(),
            ArrayData::Byte(v) => v.len(),
            ArrayData::Short(v) => v.len(),
            ArrayData::Integer(v) => v.len(),
            ArrayData::Long(v) => v.len(),
            ArrayData::Float(v) => v.len(),
            ArrayData::Double(v) => v.len(),
            ArrayData::String(v) => v.len(),
            ArrayData::Fs(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element kind, `None` for arrays of feature structures.
    pub fn element_kind(&self) -> Option<PrimitiveKind> {
        match self {
            ArrayData::Boolean(_) => Some(PrimitiveKind::Boolean),
            ArrayData::Byte(_) => Some(PrimitiveKind::Byte),
            ArrayData::Short(_) => Some(PrimitiveKind::Short),
            ArrayData::Integer(_) => Some(PrimitiveKind::Integer),
            ArrayData::Long(_) => Some(PrimitiveKind::Long),
            ArrayData::Float(_) => Some(PrimitiveKind::Float),
            ArrayData::Double(_) => Some(PrimitiveKind::Double),
            ArrayData::String(_) => Some(PrimitiveKind::String),
            ArrayData::Fs(_) => None,
        }
    }

    /// Element `index` as a value, `None` when out of bounds.
    pub fn get(&self, index: usize) -> Option<Value> {
        let value = match self {
            ArrayData::Boolean(v) => Value::Boolean(*v.get(index)?),
            ArrayData::Byte(v) => Value::Byte(*v.get(index)?),
            ArrayData::Short(v) => Value::Short(*v.get(index)?),
            ArrayData::Integer(v) => Value::Integer(*v.get(index)?),
            ArrayData::Long(v) => Value::Long(*v.get(index)?),
            ArrayData::Float(v) => Value::Float(*v.get(index)?),
            ArrayData::Double(v) => Value::Double(*v.get(index)?),
            ArrayData::String(v) => Value::String(v.get(index)?.clone()),
            ArrayData::Fs(v) => Value::Ref(*v.get(index)?),
        };
        Some(value)
    }

    /// Overwrites element `index`. The caller checks bounds; a value of the
    /// wrong kind is handed back unchanged.
    pub(crate) fn put(&mut self, index: usize, value: Value) -> Result<(), Value> {
        match (self, value) {
            (ArrayData::Boolean(v), Value::Boolean(x)) => v[index] = x,
            (ArrayData::Byte(v), Value::Byte(x)) => v[index] = x,
            (ArrayData::Short(v), Value::Short(x)) => v[index] = x,
            (ArrayData::Integer(v), Value::Integer(x)) => v[index] = x,
            (ArrayData::Long(v), Value::Long(x)) => v[index] = x,
            (ArrayData::Float(v), Value::Float(x)) => v[index] = x,
            (ArrayData::Double(v), Value::Double(x)) => v[index] = x,
            (ArrayData::String(v), Value::String(x)) => v[index] = x,
            (ArrayData::Fs(v), Value::Ref(x)) => v[index] = x,
            (_, other) => return Err(other),
        }
        Ok(())
    }

    /// Non-null element references, in element order.
    pub fn refs(&self) -> impl Iterator<Item = FsId> + '_ {
        let elements: &[Option<FsId>] = match self {
            ArrayData::Fs(v) => v,
            _ => &[],
        };
        elements.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typesystem::TypeId;

    #[test]
    fn test_zero_filled() {
        let data = ArrayData::new(ArrayElement::Primitive(PrimitiveKind::Double), 3);
        assert_eq!(data.len(), 3);
        assert_eq!(data.get(2), Some(Value::Double(0.0)));
        assert_eq!(data.get(3), None);
    }

    #[test]
    fn test_put_rejects_wrong_kind() {
        let mut data = ArrayData::new(ArrayElement::Primitive(PrimitiveKind::Integer), 1);
        assert!(data.put(0, Value::Integer(4)).is_ok());
        assert_eq!(data.put(0, Value::Long(4)), Err(Value::Long(4)));
        assert_eq!(data.get(0), Some(Value::Integer(4)));
    }

    #[test]
    fn test_refs_skip_nulls() {
        let mut data = ArrayData::new(ArrayElement::Fs(TypeId::new(0)), 3);
        data.put(0, Value::Ref(Some(FsId::from_raw(5)))).unwrap();
        data.put(2, Value::Ref(Some(FsId::from_raw(2)))).unwrap();
        let refs: Vec<u32> = data.refs().map(FsId::raw).collect();
        assert_eq!(refs, vec![5, 2]);
        assert_eq!(data.element_kind(), None);
    }
}
