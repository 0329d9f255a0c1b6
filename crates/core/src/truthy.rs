//! Truthiness checks over loosely-typed JSON payloads.
//!
//! Client payloads are checked for presence the way a browser client thinks
//! of it: `null`, `false`, `0`, and `""` count as absent. Arrays and objects
//! are always present, even when empty.

use serde_json::{Map, Value};

/// Whether a JSON value counts as present.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether `field` exists on `obj` and is truthy.
pub fn field_is_truthy(obj: &Map<String, Value>, field: &str) -> bool {
    obj.get(field).is_some_and(is_truthy)
}

/// Whether `field` exists on `obj` and is a non-empty array.
pub fn field_is_non_empty_array(obj: &Map<String, Value>, field: &str) -> bool {
    matches!(obj.get(field), Some(Value::Array(items)) if !items.is_empty())
}
