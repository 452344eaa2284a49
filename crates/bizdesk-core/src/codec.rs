//! JSON boundary between typed field sets and the store's field objects.
//!
//! Some writers persisted sequence fields (`tags`, `members`, `permissions`
//! and friends) as a JSON-encoded string instead of a native array.
//! [`normalize_fields`] runs on every write and read so the rest of the
//! crate only ever sees arrays.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::model::EntityKind;
use crate::store::{Fields, StoreError};

/// Serialize a typed value into a field object.
///
/// # Errors
///
/// Returns [`StoreError::Codec`] if serialization fails and
/// [`StoreError::InvalidPatch`] if the value is not an object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::InvalidPatch(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Overwrite `target` keys with those in `changes`.
pub fn merge_fields(target: &mut Fields, changes: &Fields) {
    for (key, value) in changes {
        target.insert(key.clone(), value.clone());
    }
}

/// Decode string-encoded sequence fields of `kind` into native arrays.
///
/// A string that parses to an array is replaced by that array. Any other
/// string, and `null`, becomes an empty array. Missing keys stay missing.
pub fn normalize_fields(kind: EntityKind, fields: &mut Fields) {
    for key in kind.array_fields() {
        let Some(value) = fields.get_mut(*key) else {
            continue;
        };
        match value {
            Value::Array(_) => {}
            Value::String(encoded) => {
                let decoded = match serde_json::from_str::<Value>(encoded) {
                    Ok(Value::Array(items)) => items,
                    Ok(_) | Err(_) => {
                        debug!(%kind, field = *key, "discarding malformed encoded array");
                        Vec::new()
                    }
                };
                *value = Value::Array(decoded);
            }
            _ => *value = Value::Array(Vec::new()),
        }
    }
}
