//! Dynamic value tree used for user inputs, step outputs and request bodies.
//!
//! Tool responses are arbitrary JSON, so values are plain `serde_json`
//! trees. Mappings keep insertion order.

use crate::PathError;

pub type Value = serde_json::Value;

/// An ordered mapping of string keys to values.
pub type ValueMap = serde_json::Map<String, Value>;

/// Walk `path` into `value` one segment at a time.
///
/// A list consumes a segment as an integer index, a mapping as a key. Any
/// other value cannot be traversed further.
pub fn traverse<'v, S: AsRef<str>>(value: &'v Value, path: &[S]) -> Result<&'v Value, PathError> {
    let mut current = value;
    for segment in path {
        let segment = segment.as_ref();
        current = step_into(current, segment)?;
    }
    Ok(current)
}

/// Same as [`traverse`], starting from a mapping rather than a value.
pub fn traverse_map<'v, S: AsRef<str>>(
    map: &'v ValueMap,
    path: &[S],
) -> Result<&'v Value, PathError> {
    let Some((first, rest)) = path.split_first() else {
        return Err(PathError::MissingField {
            segment: String::new(),
        });
    };
    let first = first.as_ref();
    let head = map.get(first).ok_or_else(|| PathError::MissingField {
        segment: first.to_string(),
    })?;
    traverse(head, rest)
}

fn step_into<'v>(current: &'v Value, segment: &str) -> Result<&'v Value, PathError> {
    match current {
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .ok_or_else(|| PathError::BadIndex {
                segment: segment.to_string(),
            }),
        Value::Object(map) => map.get(segment).ok_or_else(|| PathError::MissingField {
            segment: segment.to_string(),
        }),
        other => Err(PathError::NotTraversable {
            segment: segment.to_string(),
            kind: type_name(other),
        }),
    }
}

/// Split a dot-path into its segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.').collect()
}

/// Runtime type name of a value: `null`, `bool`, `int`, `float`, `str`,
/// `list` or `dict`.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// String form used for interpolation, URLs, headers and regex matching.
///
/// Strings render raw; everything else renders as compact JSON.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Length of a string (in characters), list or mapping.
pub fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}
