use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::common::v1::KeyValue;
use opentelemetry_proto::tonic::logs::v1::LogRecord;
use serde_json::Value as JsonValue;

use super::{resource_attributes, resource_service_name};
use crate::data::types::NewEvent;
use crate::utils::json::json_to_display_string;
use crate::utils::otlp::{any_value_to_json, id_to_hex, keys, merge_attributes};
use crate::utils::time::nanos_to_datetime;

/// Flatten every log record in the request into an event
pub fn events_from_logs(request: &ExportLogsServiceRequest) -> Vec<NewEvent> {
    let mut events = Vec::new();
    for resource_logs in &request.resource_logs {
        let resource = resource_logs.resource.as_ref();
        let service_name = resource_service_name(resource);
        let resource_attrs = resource_attributes(resource);

        for record in resource_logs.scope_logs.iter().flat_map(|sl| &sl.log_records) {
            events.push(log_event(record, &service_name, resource_attrs));
        }
    }
    events
}

fn log_event(record: &LogRecord, service_name: &str, resource_attrs: &[KeyValue]) -> NewEvent {
    // Records without an event time are positioned by when the collector saw them
    let nanos = if record.time_unix_nano != 0 {
        record.time_unix_nano
    } else {
        record.observed_time_unix_nano
    };
    let timestamp = nanos_to_datetime(nanos);

    let message = record
        .body
        .as_ref()
        .map(|body| json_to_display_string(&any_value_to_json(body)))
        .unwrap_or_default();

    let mut attributes = merge_attributes(resource_attrs, &record.attributes);
    if !record.severity_text.is_empty() {
        attributes.insert(
            keys::SEVERITY.to_string(),
            JsonValue::String(record.severity_text.clone()),
        );
    }

    NewEvent {
        trace_id: id_to_hex(&record.trace_id),
        span_id: id_to_hex(&record.span_id),
        parent_span_id: String::new(),
        message,
        service_name: service_name.to_string(),
        start_timestamp: timestamp,
        end_timestamp: timestamp,
        is_trace: false,
        attributes,
    }
}
