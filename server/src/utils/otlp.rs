//! OTLP utility functions
//!
//! Conversions from OTLP protobuf types into the JSON shapes stored on events.

use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue, any_value};
use serde_json::{Map, Value as JsonValue};

/// Attribute keys read during ingestion
pub mod keys {
    pub const SERVICE_NAME: &str = "service.name";
    pub const SEVERITY: &str = "severity";
}

/// Convert AnyValue to JSON value (preserves native types)
pub fn any_value_to_json(value: &AnyValue) -> JsonValue {
    match &value.value {
        Some(any_value::Value::StringValue(s)) => serde_json::json!(s),
        Some(any_value::Value::BoolValue(b)) => serde_json::json!(b),
        Some(any_value::Value::IntValue(i)) => serde_json::json!(i),
        Some(any_value::Value::DoubleValue(d)) => serde_json::json!(d),
        Some(any_value::Value::ArrayValue(arr)) => {
            JsonValue::Array(arr.values.iter().map(any_value_to_json).collect())
        }
        Some(any_value::Value::KvlistValue(kvlist)) => {
            JsonValue::Object(attributes_to_map(&kvlist.values))
        }
        Some(any_value::Value::BytesValue(b)) => serde_json::json!(hex::encode(b)),
        None => JsonValue::Null,
    }
}

/// Build a JSON object from raw KeyValue attributes; entries without a value are skipped
pub fn attributes_to_map(attrs: &[KeyValue]) -> Map<String, JsonValue> {
    attrs
        .iter()
        .filter_map(|kv| {
            kv.value
                .as_ref()
                .map(|v| (kv.key.clone(), any_value_to_json(v)))
        })
        .collect()
}

/// Resource attributes overlaid with record attributes; the record wins on collision
pub fn merge_attributes(resource: &[KeyValue], own: &[KeyValue]) -> Map<String, JsonValue> {
    let mut merged = attributes_to_map(resource);
    merged.extend(attributes_to_map(own));
    merged
}

/// `service.name` from resource attributes, when it is a non-empty string
pub fn service_name(resource: &[KeyValue]) -> Option<String> {
    resource
        .iter()
        .find(|kv| kv.key == keys::SERVICE_NAME)
        .and_then(|kv| kv.value.as_ref())
        .and_then(|v| match &v.value {
            Some(any_value::Value::StringValue(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// Hex-encode a trace or span id; an empty id stays empty
pub fn id_to_hex(id: &[u8]) -> String {
    hex::encode(id)
}
