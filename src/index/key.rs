//! Comparator key tuples
//!
//! A key is the tuple of feature values an index orders and deduplicates
//! by. Each component carries its direction so that the derived
//! lexicographic ordering of the tuple is the index order.
//!
//! Ordering per component kind:
//! - Bool: false < true
//! - Int: all integral kinds widened to i64
//! - Float: f32/f64 widened to f64, compared by total-order bits
//! - Str: null < any string, then lexical
//! - Ref: null < any reference, then by target id

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::store::Value;

/// Sort direction of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// One extracted key value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyValue {
    /// Boolean value (false < true)
    Bool(bool),
    /// Integral value
    Int(i64),
    /// Floating value (stored as bits for total ordering)
    Float(u64),
    /// String value, `None` for null
    Str(Option<String>),
    /// Reference target id, `None` for null
    ///
    /// Always the id, never the target's own key: references into another
    /// sorted domain are not ordered by that domain's comparator.
    Ref(Option<u32>),
}

impl KeyValue {
    /// Create a key from a float
    ///
    /// Uses bit representation for total ordering.
    pub fn from_float(v: f64) -> Self {
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits // Negative: flip all bits
        } else {
            bits ^ (1 << 63) // Positive: flip sign bit
        };
        KeyValue::Float(ordered)
    }

    /// Create a key from a slot value
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Boolean(v) => KeyValue::Bool(*v),
            Value::Byte(v) => KeyValue::Int(i64::from(*v)),
            Value::Short(v) => KeyValue::Int(i64::from(*v)),
            Value::Integer(v) => KeyValue::Int(i64::from(*v)),
            Value::Long(v) => KeyValue::Int(*v),
            Value::Float(v) => KeyValue::from_float(f64::from(*v)),
            Value::Double(v) => KeyValue::from_float(*v),
            Value::String(v) => KeyValue::Str(v.clone()),
            Value::Ref(v) => KeyValue::Ref(v.map(|id| id.raw())),
        }
    }
}

/// A key value with its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyComponent {
    pub value: KeyValue,
    pub order: SortOrder,
}

impl Ord for KeyComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        let ord = self.value.cmp(&other.value);
        match self.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }
}

impl PartialOrd for KeyComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A full comparator key tuple. Two feature structures with equal keys are
/// the same element for SET membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexKey(pub Vec<KeyComponent>);

impl IndexKey {
    /// The empty key of a BAG index
    pub fn empty() -> Self {
        IndexKey(Vec::new())
    }

    pub fn components(&self) -> &[KeyComponent] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsId;

    fn asc(value: KeyValue) -> KeyComponent {
        KeyComponent {
            value,
            order: SortOrder::Ascending,
        }
    }

    fn desc(value: KeyValue) -> KeyComponent {
        KeyComponent {
            value,
            order: SortOrder::Descending,
        }
    }

    #[test]
    fn test_float_total_order() {
        let values = [-2.5, -0.0, 0.0, 1.0, f64::INFINITY];
        let keys: Vec<KeyValue> = values.iter().map(|v| KeyValue::from_float(*v)).collect();
        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(KeyValue::from_float(f64::NEG_INFINITY) < KeyValue::from_float(-1e300));
    }

    #[test]
    fn test_nulls_first() {
        assert!(KeyValue::Str(None) < KeyValue::Str(Some(String::new())));
        assert!(KeyValue::Ref(None) < KeyValue::from_value(&Value::Ref(Some(FsId::from_raw(1)))));
    }

    #[test]
    fn test_descending_component() {
        assert!(desc(KeyValue::Int(5)) < desc(KeyValue::Int(3)));
        assert!(asc(KeyValue::Int(3)) < asc(KeyValue::Int(5)));
    }

    #[test]
    fn test_tuple_short_circuits() {
        // (begin asc, end desc): (0,5) < (0,3) < (6,9)
        let span = |b, e| IndexKey(vec![asc(KeyValue::Int(b)), desc(KeyValue::Int(e))]);
        assert!(span(0, 5) < span(0, 3));
        assert!(span(0, 3) < span(6, 9));
        assert_eq!(span(1, 1), span(1, 1));
    }

    #[test]
    fn test_keys_hash_with_direction() {
        use std::collections::HashSet;

        let keys: HashSet<IndexKey> = [
            IndexKey(vec![asc(KeyValue::Int(1))]),
            IndexKey(vec![desc(KeyValue::Int(1))]),
            IndexKey(vec![asc(KeyValue::Int(1))]),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_integral_widening() {
        assert_eq!(KeyValue::from_value(&Value::Byte(-1)), KeyValue::Int(-1));
        assert_eq!(KeyValue::from_value(&Value::Long(1 << 40)), KeyValue::Int(1 << 40));
    }
}
