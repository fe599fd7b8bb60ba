//! Canonical document serialization.
//!
//! Content identifiers are only stable if every node turns the same logical
//! document into the same bytes. The canonical form is compact JSON with
//! object keys sorted by byte value at every depth. Floating point numbers
//! are rejected because their textual rendering is not portable.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{StorageError, StorageResult};

/// Serialize any value into canonical bytes.
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if the value cannot be turned into
/// JSON and [`StorageError::NonCanonical`] if it contains a float.
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> StorageResult<Vec<u8>> {
    let value =
        serde_json::to_value(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let canonical = canonicalize(value)?;
    serde_json::to_vec(&canonical).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Rebuild a JSON value with sorted object keys, rejecting floats.
///
/// # Errors
///
/// Returns [`StorageError::NonCanonical`] if the value contains a float.
pub fn canonicalize(value: Value) -> StorageResult<Value> {
    match value {
        Value::Number(n) if n.is_f64() => Err(StorageError::NonCanonical(format!(
            "floating point number {n}"
        ))),
        Value::Array(items) => items
            .into_iter()
            .map(canonicalize)
            .collect::<StorageResult<Vec<_>>>()
            .map(Value::Array),
        Value::Object(fields) => {
            let mut entries = fields.into_iter().collect::<Vec<_>>();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

            let mut sorted = Map::new();
            for (key, field) in entries {
                sorted.insert(key, canonicalize(field)?);
            }
            Ok(Value::Object(sorted))
        },
        other => Ok(other),
    }
}
