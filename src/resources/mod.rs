//! Backend resources exposed by [`crate::GoosedClient`].

mod blueprints;
mod machines;

use crate::core::domain::error::ValidationError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Extracts `field` from a listing response, tolerating malformed shapes.
///
/// A missing or non-array field yields an empty list. Items that do not
/// decode are skipped.
pub(crate) fn decode_list<T>(body: Value, field: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    let items = match body {
        Value::Object(mut map) => map.remove(field),
        _ => None,
    };

    match items {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!(field, index, error = %e, "skipping undecodable list item");
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => {
            warn!(field, "listing missing from response, treating as empty");
            Vec::new()
        }
        Some(_) => {
            warn!(field, "listing is not an array, treating as empty");
            Vec::new()
        }
    }
}

/// Checks an id before it is placed in a request path.
pub(crate) fn validate_resource_id(id: &str) -> Result<&str, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::Field {
            field: "id".to_string(),
            message: "Id cannot be empty".to_string(),
        });
    }
    if id.chars().any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace()) {
        return Err(ValidationError::Format(format!(
            "Id contains characters not allowed in a path: {}",
            id
        )));
    }
    Ok(id)
}
