//! Payload normalization and envelope navigation.
//!
//! # Design
//! The service wraps every payload as `{"Response": {"Data": ...}}` and
//! encodes one-element collections as a bare object instead of a one-element
//! array. Everything that walks a payload goes through the helpers here so
//! that the rest of the crate only ever sees canonical keys and uniform
//! sequences.

use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// Canonical form of a payload key.
///
/// Keys are compared exactly (case-sensitive) everywhere else; the only
/// canonicalization is dropping surrounding whitespace.
pub fn canonical_key(key: &str) -> String {
    key.trim().to_string()
}

/// Recursively rewrite every mapping key into its canonical form.
///
/// Scalars pass through untouched. Applying this twice is the same as
/// applying it once.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        scalar => scalar,
    }
}

pub fn normalize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| (canonical_key(&key), normalize(value)))
        .collect()
}

/// A blank string is an absent value.
pub fn blank_to_null(value: Value) -> Value {
    match value {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        other => other,
    }
}

/// Coerce a singleton-or-sequence field into a sequence.
///
/// `null` and absent become empty. An empty string, which the service emits
/// for an empty wrapper, is also empty.
pub fn one_or_many(value: Option<Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(other) => vec![other],
    }
}

/// Unwrap `{"<Singular>": <object-or-sequence>}` into a sequence.
///
/// The wrapper itself may be absent, `null`, or an empty array (the service
/// serializes an empty wrapper that way).
pub fn unwrap_collection(wrapper: Option<Value>, singular: &str) -> Result<Vec<Value>> {
    match wrapper {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(mut map)) => Ok(one_or_many(map.remove(singular))),
        Some(Value::Array(items)) => Ok(items),
        Some(Value::String(s)) if s.is_empty() => Ok(Vec::new()),
        Some(other) => Err(ApiError::malformed(format!(
            "expected a {singular} collection, found {}",
            kind_of(&other)
        ))),
    }
}

/// Navigate to `Response.Data` and return it with canonical keys.
pub fn response_data(body: Value) -> Result<Map<String, Value>> {
    let Value::Object(mut root) = normalize(body) else {
        return Err(ApiError::malformed("response body is not an object"));
    };
    let Some(Value::Object(mut response)) = root.remove("Response") else {
        return Err(ApiError::malformed("missing Response envelope"));
    };
    match response.remove("Data") {
        Some(Value::Object(data)) => Ok(data),
        Some(other) => Err(ApiError::malformed(format!(
            "Response.Data is {}, expected an object",
            kind_of(&other)
        ))),
        None => Err(ApiError::malformed("missing Response.Data")),
    }
}

/// Remove a single-resource section from `Response.Data`.
pub fn take_object(data: &mut Map<String, Value>, key: &str) -> Result<Map<String, Value>> {
    match data.remove(key) {
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(ApiError::malformed(format!(
            "Response.Data.{key} is {}, expected an object",
            kind_of(&other)
        ))),
        None => Err(ApiError::malformed(format!("missing Response.Data.{key}"))),
    }
}

/// Remove a `{"<Plural>": {"<Singular>": ...}}` section from `Response.Data`.
pub fn take_collection(
    data: &mut Map<String, Value>,
    plural: &str,
    singular: &str,
) -> Result<Vec<Value>> {
    unwrap_collection(data.remove(plural), singular)
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
