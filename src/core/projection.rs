//! Field projection between typed records and representations
//!
//! A [`Representation`] is the untyped, ordered key/value form every record
//! passes through on its way in and out of the server. Projection goes
//! through serde, so the key order of a representation follows the field
//! order of the record struct.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::core::error::CrudError;
use crate::core::record::Record;

/// Ordered mapping from field name to untyped value
pub type Representation = IndexMap<String, Value>;

/// Serialize a record into its representation
///
/// When `subset` is given, only those keys are kept.
pub fn to_representation<R: Record>(
    record: &R,
    subset: Option<&[&str]>,
) -> Result<Representation, CrudError> {
    let value = serde_json::to_value(record).map_err(|e| CrudError::Encoding {
        record_type: R::record_type().to_string(),
        message: e.to_string(),
    })?;

    let Value::Object(map) = value else {
        return Err(CrudError::Encoding {
            record_type: R::record_type().to_string(),
            message: "record does not serialize to an object".to_string(),
        });
    };

    let representation: Representation = map.into_iter().collect();
    Ok(match subset {
        Some(fields) => restrict(representation, fields),
        None => representation,
    })
}

/// Keep only the listed keys
pub fn restrict(mut representation: Representation, fields: &[&str]) -> Representation {
    representation.retain(|key, _| fields.contains(&key.as_str()));
    representation
}

/// Rebuild a record from a representation
///
/// Input is laid over the serialized default record and handed to serde, so
/// keys the record does not declare are ignored while declared fields the
/// default omits (`skip_serializing_if`) are still read. Missing keys and
/// `null` values leave the field at its default. A value whose shape does not
/// fit the field type fails with [`CrudError::Decoding`].
pub fn to_record<R: Record>(representation: &Representation) -> Result<R, CrudError> {
    let mut base = to_representation(&R::default(), None)?;

    for (key, value) in representation {
        if value.is_null() {
            continue;
        }
        base.insert(key.clone(), value.clone());
    }

    let object: Map<String, Value> = base.into_iter().collect();
    serde_json::from_value(Value::Object(object)).map_err(|e| CrudError::Decoding {
        record_type: R::record_type().to_string(),
        message: e.to_string(),
    })
}

/// Turn a decoded JSON body into a representation
pub fn representation_from_value<R: Record>(value: Value) -> Result<Representation, CrudError> {
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(CrudError::Decoding {
            record_type: R::record_type().to_string(),
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
