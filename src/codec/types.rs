//! `%TYPES` section
//!
//! ```json
//! "%TYPES": {
//!   "org.example.Token": {
//!     "%NAME": "org.example.Token",
//!     "%SUPER_TYPE": "uima.tcas.Annotation",
//!     "posTag": { "%NAME": "posTag", "%RANGE": "uima.cas.String" },
//!     "parts": { "%NAME": "parts", "%RANGE": "org.example.Token[]" }
//!   }
//! }
//! ```

use serde_json::{json, Map, Value};

use super::document::Object;
use super::errors::{CodecError, CodecResult};
use super::names;
use super::options::ArrayRangeEncoding;
use crate::typesystem::builtin::{ARRAY_TYPE_SUFFIX, TYPE_NAME_FS_ARRAY};
use crate::typesystem::{FeatureDescription, TypeDescription, TypeSystemDescription};

/// Encodes the declared types of a descriptor.
pub fn encode_types(description: &TypeSystemDescription, encoding: ArrayRangeEncoding) -> Object<Object> {
    let mut section = Object::new();
    for t in &description.types {
        let mut entry = Object::new();
        entry.push(names::NAME, json!(t.name));
        entry.push(names::SUPER_TYPE, json!(t.supertype));
        if !t.allowed_values.is_empty() {
            entry.push(names::ALLOWED_VALUES, json!(t.allowed_values));
        }
        for f in &t.features {
            entry.push(f.name.clone(), encode_feature(f, encoding));
        }
        section.push(t.name.clone(), entry);
    }
    section
}

fn encode_feature(f: &FeatureDescription, encoding: ArrayRangeEncoding) -> Value {
    let mut out = Map::new();
    out.insert(names::NAME.to_string(), json!(f.name));
    let element = f.range.strip_suffix(ARRAY_TYPE_SUFFIX);
    match (encoding, element) {
        (ArrayRangeEncoding::ElementType, Some(element)) => {
            out.insert(names::RANGE.to_string(), json!(TYPE_NAME_FS_ARRAY));
            out.insert(names::ELEMENT_TYPE.to_string(), json!(element));
        }
        _ => {
            out.insert(names::RANGE.to_string(), json!(f.range));
        }
    }
    if f.multiple_references_allowed {
        out.insert(names::MULTIPLE_REFERENCES_ALLOWED.to_string(), json!(true));
    }
    Value::Object(out)
}

/// Decodes a `%TYPES` section into a descriptor.
pub fn decode_types(section: &Object<Object>) -> CodecResult<TypeSystemDescription> {
    let mut types = Vec::with_capacity(section.len());
    for (key, entry) in section.iter() {
        let name = match entry.get(names::NAME) {
            Some(v) => string_field(v, key, names::NAME)?,
            None => key.to_string(),
        };
        let supertype = entry
            .get(names::SUPER_TYPE)
            .ok_or_else(|| CodecError::malformed(format!("type '{}' has no {}", name, names::SUPER_TYPE)))
            .and_then(|v| string_field(v, &name, names::SUPER_TYPE))?;

        let mut desc = TypeDescription::new(name.clone(), supertype);
        for (field, value) in entry.iter() {
            if field == names::ALLOWED_VALUES {
                desc.allowed_values = serde_json::from_value(value.clone()).map_err(|_| {
                    CodecError::malformed(format!("{} of '{}' must be a list of strings", field, name))
                })?;
            } else if !field.starts_with(names::RESERVED_PREFIX) {
                desc.features.push(decode_feature(&name, field, value)?);
            }
        }
        types.push(desc);
    }
    Ok(TypeSystemDescription {
        types,
        type_priorities: Vec::new(),
    })
}

fn decode_feature(type_name: &str, key: &str, value: &Value) -> CodecResult<FeatureDescription> {
    let owner = format!("{}:{}", type_name, key);
    let object = value
        .as_object()
        .ok_or_else(|| CodecError::malformed(format!("feature '{}' must be an object", owner)))?;
    let name = match object.get(names::NAME) {
        Some(v) => string_field(v, &owner, names::NAME)?,
        None => key.to_string(),
    };
    let range = object
        .get(names::RANGE)
        .ok_or_else(|| CodecError::malformed(format!("feature '{}' has no {}", owner, names::RANGE)))
        .and_then(|v| string_field(v, &owner, names::RANGE))?;
    let element_type = object
        .get(names::ELEMENT_TYPE)
        .map(|v| string_field(v, &owner, names::ELEMENT_TYPE))
        .transpose()?;
    let multiple_references_allowed = object
        .get(names::MULTIPLE_REFERENCES_ALLOWED)
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Ok(FeatureDescription {
        name,
        range,
        element_type,
        multiple_references_allowed,
        description: None,
    })
}

fn string_field(value: &Value, owner: &str, field: &str) -> CodecResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CodecError::malformed(format!("{} of '{}' must be a string", field, owner)))
}
