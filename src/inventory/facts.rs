//! Conversion of fact snapshots into display lines.

use crate::core::domain::model::machine_record::MachineFactEntry;
use serde_json::Value;

/// Maximum number of fact lines kept per machine.
pub const MAX_FACT_ENTRIES: usize = 12;

const MISSING_VALUE: &str = "—";
const COMPLEX_VALUE: &str = "(complex value)";

/// Turns a snapshot key like `kernel_release` or `boot-mode` into `Kernel Release` / `Boot Mode`.
pub fn humanize_key(key: &str) -> String {
    let words: Vec<String> = key
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();

    if words.is_empty() {
        key.to_string()
    } else {
        words.join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders a snapshot value for display.
pub fn format_fact_value(value: &Value) -> String {
    match value {
        Value::Null => MISSING_VALUE.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| COMPLEX_VALUE.to_string())
        }
    }
}

/// Builds at most [`MAX_FACT_ENTRIES`] lines from a snapshot, in key order.
///
/// Anything other than a JSON object yields no lines.
pub(crate) fn fact_entries(snapshot: &Value, updated_at: Option<&str>) -> Vec<MachineFactEntry> {
    let Some(map) = snapshot.as_object() else {
        return Vec::new();
    };

    map.iter()
        .take(MAX_FACT_ENTRIES)
        .map(|(key, value)| MachineFactEntry {
            label: humanize_key(key),
            value: format_fact_value(value),
            updated_at: updated_at.map(str::to_string),
        })
        .collect()
}
