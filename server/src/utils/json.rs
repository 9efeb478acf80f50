//! JSON utility functions

use serde_json::Value as JsonValue;

/// Flatten a JSON attribute value into the text stored in `event_attributes`.
///
/// Strings are stored without quotes so key/value lookups compare the raw
/// value; `null` maps to a database NULL. Nested values keep their JSON text.
pub fn json_to_attribute_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Array(_) | JsonValue::Object(_) => serde_json::to_string(value).ok(),
    }
}

/// Render a JSON value as plain text for display fields such as a log body
pub fn json_to_display_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
