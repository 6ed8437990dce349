//! Topic list normalization
//!
//! Skill topics are stored as a serialized JSON array in a TEXT column. Rows
//! written by older sync runs may hold null, empty, or truncated values, so
//! parsing must never fail outward.

use serde_json::Value;

/// Parse a raw serialized topic list into canonical lowercase topics.
///
/// Anything that does not parse as a JSON array yields an empty list.
/// Non-string array elements are dropped.
pub fn parse_topics(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_lowercase))
            .collect(),
        _ => Vec::new(),
    }
}
