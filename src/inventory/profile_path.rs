//! Typed lookups over loosely-structured JSON.
//!
//! Machine profiles and fact snapshots have no fixed schema. Fields are
//! resolved through ordered lists of candidate paths; the first candidate
//! holding a usable value wins.

use serde_json::Value;

/// A path into nested JSON objects, one key per segment.
pub(crate) type FieldPath = &'static [&'static str];

/// Follows `path` through nested objects.
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object. An empty path yields `root`.
pub(crate) fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |current, key| current.as_object()?.get(*key))
}

/// A string with non-blank content, trimmed.
pub(crate) fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Like [`text`], but also renders numbers and booleans.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => text(value),
    }
}

/// A finite number, from either a JSON number or a numeric string.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// First candidate that resolves to non-blank text.
pub(crate) fn first_text(root: &Value, candidates: &[FieldPath]) -> Option<String> {
    candidates
        .iter()
        .find_map(|path| lookup(root, path).and_then(text))
}

/// First candidate that resolves to a finite number.
pub(crate) fn first_number(root: &Value, candidates: &[FieldPath]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|path| lookup(root, path).and_then(number))
}

/// String entries of an array; anything else is ignored.
pub(crate) fn string_list(value: &Value) -> impl Iterator<Item = &str> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}
