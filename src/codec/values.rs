//! Feature value and array element encoding

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Number, Value as Json};

use super::errors::{CodecError, CodecResult};
use super::names::{parse_special_float, special_float};
use crate::store::{ArrayData, FsId, Value};
use crate::typesystem::{ArrayElement, PrimitiveKind};

/// Encodes a primitive slot value; `None` for nulls, which are omitted.
pub fn encode_value(value: &Value) -> Option<Json> {
    match value {
        Value::Boolean(b) => Some(json!(b)),
        Value::Byte(v) => Some(json!(v)),
        Value::Short(v) => Some(json!(v)),
        Value::Integer(v) => Some(json!(v)),
        Value::Long(v) => Some(json!(v)),
        Value::Float(v) => Some(encode_float(f64::from(*v))),
        Value::Double(v) => Some(encode_float(*v)),
        Value::String(s) => s.as_ref().map(|s| json!(s)),
        Value::Ref(r) => r.map(|id| json!(id.raw())),
    }
}

fn encode_float(value: f64) -> Json {
    match special_float(value) {
        Some(text) => json!(text),
        None => Number::from_f64(value).map(Json::Number).unwrap_or(Json::Null),
    }
}

/// Encodes the elements of an array feature structure.
pub fn encode_array(data: &ArrayData) -> Json {
    match data {
        ArrayData::Boolean(v) => json!(v),
        ArrayData::Byte(v) => {
            let bytes: Vec<u8> = v.iter().map(|b| *b as u8).collect();
            json!(BASE64.encode(bytes))
        }
        ArrayData::Short(v) => json!(v),
        ArrayData::Integer(v) => json!(v),
        ArrayData::Long(v) => json!(v),
        ArrayData::Float(v) => Json::Array(v.iter().map(|f| encode_float(f64::from(*f))).collect()),
        ArrayData::Double(v) => Json::Array(v.iter().map(|f| encode_float(*f)).collect()),
        ArrayData::String(v) => json!(v),
        ArrayData::Fs(v) => Json::Array(
            v.iter()
                .map(|id| id.map_or(Json::Null, |id| json!(id.raw())))
                .collect(),
        ),
    }
}

/// Decodes a primitive slot value of kind `kind`.
pub fn decode_value(kind: PrimitiveKind, json: &Json, owner: &str) -> CodecResult<Value> {
    let bad = || CodecError::malformed(format!("{} expects a {} value, got {}", owner, kind_name(kind), json));
    Ok(match kind {
        PrimitiveKind::Boolean => Value::Boolean(json.as_bool().ok_or_else(bad)?),
        PrimitiveKind::Byte => Value::Byte(integer(json).and_then(|v| i8::try_from(v).ok()).ok_or_else(bad)?),
        PrimitiveKind::Short => Value::Short(integer(json).and_then(|v| i16::try_from(v).ok()).ok_or_else(bad)?),
        PrimitiveKind::Integer => Value::Integer(integer(json).and_then(|v| i32::try_from(v).ok()).ok_or_else(bad)?),
        PrimitiveKind::Long => Value::Long(integer(json).ok_or_else(bad)?),
        PrimitiveKind::Float => Value::Float(float(json).ok_or_else(bad)? as f32),
        PrimitiveKind::Double => Value::Double(float(json).ok_or_else(bad)?),
        PrimitiveKind::String => match json {
            Json::Null => Value::String(None),
            Json::String(s) => Value::String(Some(s.clone())),
            _ => return Err(bad()),
        },
    })
}

/// Decoded array elements. FS elements are still document ids.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedArray {
    Primitive(ArrayData),
    Fs(Vec<Option<u64>>),
}

/// Decodes `%ELEMENTS` (or an inline array) for element kind `element`.
pub fn decode_array(element: ArrayElement, json: &Json, owner: &str) -> CodecResult<DecodedArray> {
    let kind = match element {
        ArrayElement::Fs(_) => {
            let ids = list(json, owner)?
                .iter()
                .map(|item| match item {
                    Json::Null => Ok(None),
                    other => other
                        .as_u64()
                        .map(Some)
                        .ok_or_else(|| CodecError::malformed(format!("{} element {} is not an id", owner, other))),
                })
                .collect::<CodecResult<Vec<_>>>()?;
            return Ok(DecodedArray::Fs(ids));
        }
        ArrayElement::Primitive(kind) => kind,
    };

    if kind == PrimitiveKind::Byte {
        if let Json::String(text) = json {
            let bytes = BASE64
                .decode(text)
                .map_err(|e| CodecError::malformed(format!("{} is not valid base64: {}", owner, e)))?;
            return Ok(DecodedArray::Primitive(ArrayData::Byte(
                bytes.into_iter().map(|b| b as i8).collect(),
            )));
        }
    }

    let items = list(json, owner)?;
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        values.push(decode_value(kind, item, owner)?);
    }
    let data = match kind {
        PrimitiveKind::Boolean => ArrayData::Boolean(collect(values, |v| match v {
            Value::Boolean(b) => Some(b),
            _ => None,
        })),
        PrimitiveKind::Byte => ArrayData::Byte(collect(values, |v| match v {
            Value::Byte(b) => Some(b),
            _ => None,
        })),
        PrimitiveKind::Short => ArrayData::Short(collect(values, |v| match v {
            Value::Short(s) => Some(s),
            _ => None,
        })),
        PrimitiveKind::Integer => ArrayData::Integer(collect(values, |v| match v {
            Value::Integer(i) => Some(i),
            _ => None,
        })),
        PrimitiveKind::Long => ArrayData::Long(collect(values, |v| match v {
            Value::Long(l) => Some(l),
            _ => None,
        })),
        PrimitiveKind::Float => ArrayData::Float(collect(values, |v| match v {
            Value::Float(f) => Some(f),
            _ => None,
        })),
        PrimitiveKind::Double => ArrayData::Double(collect(values, |v| match v {
            Value::Double(d) => Some(d),
            _ => None,
        })),
        PrimitiveKind::String => ArrayData::String(collect(values, |v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })),
    };
    Ok(DecodedArray::Primitive(data))
}

/// Decodes a reference value: an id or null.
pub fn decode_ref(json: &Json, owner: &str) -> CodecResult<Option<u64>> {
    match json {
        Json::Null => Ok(None),
        other => other
            .as_u64()
            .map(Some)
            .ok_or_else(|| CodecError::malformed(format!("{} expects a feature structure id, got {}", owner, other))),
    }
}

/// Document id of a feature structure.
pub fn wire_id(fs: FsId) -> u64 {
    u64::from(fs.raw())
}

fn integer(json: &Json) -> Option<i64> {
    json.as_i64()
}

fn float(json: &Json) -> Option<f64> {
    match json {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => parse_special_float(s),
        _ => None,
    }
}

fn list<'a>(json: &'a Json, owner: &str) -> CodecResult<&'a Vec<Json>> {
    json.as_array()
        .ok_or_else(|| CodecError::malformed(format!("{} expects a list of elements", owner)))
}

// Values were decoded for exactly this kind, so the filter never drops one.
fn collect<T>(values: Vec<Value>, pick: impl Fn(Value) -> Option<T>) -> Vec<T> {
    values.into_iter().filter_map(pick).collect()
}

fn kind_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "boolean",
        PrimitiveKind::Byte => "byte",
        PrimitiveKind::Short => "short",
        PrimitiveKind::Integer => "integer",
        PrimitiveKind::Long => "long",
        PrimitiveKind::Float => "float",
        PrimitiveKind::Double => "double",
        PrimitiveKind::String => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_float_values() {
        assert_eq!(encode_value(&Value::Double(f64::INFINITY)), Some(json!("Infinity")));
        assert_eq!(encode_value(&Value::Float(f32::NEG_INFINITY)), Some(json!("-Infinity")));
        let nan = decode_value(PrimitiveKind::Double, &json!("NaN"), "f").unwrap();
        assert!(matches!(nan, Value::Double(d) if d.is_nan()));
        assert_eq!(
            decode_value(PrimitiveKind::Float, &json!("-Inf"), "f").unwrap(),
            Value::Float(f32::NEG_INFINITY)
        );
    }

    #[test]
    fn test_nulls_are_omitted() {
        assert_eq!(encode_value(&Value::String(None)), None);
        assert_eq!(encode_value(&Value::Ref(None)), None);
        assert_eq!(encode_value(&Value::Ref(Some(FsId::from_raw(4)))), Some(json!(4)));
    }

    #[test]
    fn test_integer_ranges_are_checked() {
        assert_eq!(decode_value(PrimitiveKind::Byte, &json!(-128), "b").unwrap(), Value::Byte(-128));
        assert!(decode_value(PrimitiveKind::Byte, &json!(200), "b").is_err());
        assert!(decode_value(PrimitiveKind::Integer, &json!(1.5), "i").is_err());
        assert!(decode_value(PrimitiveKind::Boolean, &json!(1), "z").is_err());
    }

    #[test]
    fn test_byte_array_is_base64() {
        let data = ArrayData::Byte(vec![0, 1, -1]);
        let encoded = encode_array(&data);
        assert_eq!(encoded, json!("AAH/"));
        let decoded = decode_array(ArrayElement::Primitive(PrimitiveKind::Byte), &encoded, "a").unwrap();
        assert_eq!(decoded, DecodedArray::Primitive(data));
    }

    #[test]
    fn test_fs_array_elements() {
        let data = ArrayData::Fs(vec![Some(FsId::from_raw(3)), None]);
        assert_eq!(encode_array(&data), json!([3, null]));
        let decoded = decode_array(ArrayElement::Fs(crate::typesystem::TypeId::new(0)), &json!([3, null]), "a").unwrap();
        assert_eq!(decoded, DecodedArray::Fs(vec![Some(3), None]));
    }

    #[test]
    fn test_string_array_with_nulls() {
        let data = ArrayData::String(vec![Some("a".into()), None]);
        let encoded = encode_array(&data);
        assert_eq!(encoded, json!(["a", null]));
        let decoded = decode_array(ArrayElement::Primitive(PrimitiveKind::String), &encoded, "a").unwrap();
        assert_eq!(decoded, DecodedArray::Primitive(data));
    }

    #[test]
    fn test_malformed_elements() {
        let err = decode_array(ArrayElement::Primitive(PrimitiveKind::Integer), &json!("x"), "a").unwrap_err();
        assert_eq!(err.code(), "CAS_CODEC_MALFORMED");
    }
}
