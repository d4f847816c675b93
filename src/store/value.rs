//! Slot values and feature structure identity

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::typesystem::PrimitiveKind;

/// Identity of a feature structure.
///
/// Ids are assigned by the store in creation order starting at 1 and never
/// reused; 0 is reserved for "no feature structure" on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FsId(u32);

impl FsId {
    /// Wraps a raw id. The store validates it on use.
    pub fn from_raw(raw: u32) -> Self {
        FsId(raw)
    }

    /// The raw numeric id
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn slot(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for FsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single slot or array element value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// A string; `None` is the null string.
    String(Option<String>),
    /// A reference; `None` is the null reference.
    Ref(Option<FsId>),
}

impl Value {
    /// Zero or null value for a slot of the given kind (`None` = reference).
    pub fn default_for(kind: Option<PrimitiveKind>) -> Value {
        match kind {
            Some(PrimitiveKind::Boolean) => Value::Boolean(false),
            Some(PrimitiveKind::Byte) => Value::Byte(0),
            Some(PrimitiveKind::Short) => Value::Short(0),
            Some(PrimitiveKind::Integer) => Value::Integer(0),
            Some(PrimitiveKind::Long) => Value::Long(0),
            Some(PrimitiveKind::Float) => Value::Float(0.0),
            Some(PrimitiveKind::Double) => Value::Double(0.0),
            Some(PrimitiveKind::String) => Value::String(None),
            None => Value::Ref(None),
        }
    }

    /// The primitive kind carried, `None` for references.
    pub fn kind(&self) -> Option<PrimitiveKind> {
        match self {
            Value::Boolean(_) => Some(PrimitiveKind::Boolean),
            Value::Byte(_) => Some(PrimitiveKind::Byte),
            Value::Short(_) => Some(PrimitiveKind::Short),
            Value::Integer(_) => Some(PrimitiveKind::Integer),
            Value::Long(_) => Some(PrimitiveKind::Long),
            Value::Float(_) => Some(PrimitiveKind::Float),
            Value::Double(_) => Some(PrimitiveKind::Double),
            Value::String(_) => Some(PrimitiveKind::String),
            Value::Ref(_) => None,
        }
    }

    /// Kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.kind_name(),
            None => "reference",
        }
    }

    /// The referenced id, if this is a non-null reference.
    pub fn as_ref_id(&self) -> Option<FsId> {
        match self {
            Value::Ref(target) => *target,
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Some(v.to_string()))
    }
}

impl From<FsId> for Value {
    fn from(v: FsId) -> Self {
        Value::Ref(Some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Value::default_for(Some(PrimitiveKind::Integer)), Value::Integer(0));
        assert_eq!(Value::default_for(Some(PrimitiveKind::String)), Value::String(None));
        assert_eq!(Value::default_for(None), Value::Ref(None));
    }

    #[test]
    fn test_fs_id_slot() {
        assert_eq!(FsId::from_raw(1).slot(), Some(0));
        assert_eq!(FsId::from_raw(0).slot(), None);
        assert_eq!(FsId::from_raw(7).to_string(), "#7");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::from("x").kind_name(), "string");
        assert_eq!(Value::from(FsId::from_raw(2)).kind_name(), "reference");
        assert_eq!(Value::from(FsId::from_raw(2)).as_ref_id(), Some(FsId::from_raw(2)));
    }
}
