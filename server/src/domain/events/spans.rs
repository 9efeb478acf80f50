use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
use opentelemetry_proto::tonic::common::v1::KeyValue;
use opentelemetry_proto::tonic::trace::v1::Span;

use super::{resource_attributes, resource_service_name};
use crate::data::types::NewEvent;
use crate::utils::otlp::{id_to_hex, merge_attributes};
use crate::utils::time::nanos_to_datetime;

/// Flatten every span in the request into an event
pub fn events_from_traces(request: &ExportTraceServiceRequest) -> Vec<NewEvent> {
    let mut events = Vec::new();
    for resource_spans in &request.resource_spans {
        let resource = resource_spans.resource.as_ref();
        let service_name = resource_service_name(resource);
        let resource_attrs = resource_attributes(resource);

        for span in resource_spans.scope_spans.iter().flat_map(|ss| &ss.spans) {
            events.push(span_event(span, &service_name, resource_attrs));
        }
    }
    events
}

fn span_event(
    span: &Span,
    service_name: &str,
    resource_attrs: &[KeyValue],
) -> NewEvent {
    NewEvent {
        trace_id: id_to_hex(&span.trace_id),
        span_id: id_to_hex(&span.span_id),
        parent_span_id: id_to_hex(&span.parent_span_id),
        message: span.name.clone(),
        service_name: service_name.to_string(),
        start_timestamp: nanos_to_datetime(span.start_time_unix_nano),
        end_timestamp: nanos_to_datetime(span.end_time_unix_nano),
        is_trace: true,
        attributes: merge_attributes(resource_attrs, &span.attributes),
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_proto::tonic::resource::v1::Resource;
    use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans};
    use serde_json::json;

    use super::*;
    use crate::utils::otlp::test_support::{int_kv, string_kv};

    const START: u64 = 1_704_067_200_000_000_000;

    fn span(name: &str, parent: &[u8]) -> Span {
        Span {
            trace_id: vec![0xab; 16],
            span_id: vec![0x01; 8],
            parent_span_id: parent.to_vec(),
            name: name.to_string(),
            start_time_unix_nano: START,
            end_time_unix_nano: START + 1_500_000,
            attributes: vec![int_kv("http.status", 500), string_kv("env", "span")],
            ..Default::default()
        }
    }

    fn request(resource: Option<Resource>, spans: Vec<Span>) -> ExportTraceServiceRequest {
        ExportTraceServiceRequest {
            resource_spans: vec![ResourceSpans {
                resource,
                scope_spans: vec![ScopeSpans {
                    spans,
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_span_maps_to_event() {
        let resource = Resource {
            attributes: vec![string_kv("service.name", "checkout"), string_kv("env", "prod")],
            ..Default::default()
        };
        let events = events_from_traces(&request(Some(resource), vec![span("GET /cart", &[])]));

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.trace_id, "ab".repeat(16));
        assert_eq!(event.span_id, "0101010101010101");
        assert_eq!(event.parent_span_id, "");
        assert_eq!(event.message, "GET /cart");
        assert_eq!(event.service_name, "checkout");
        assert!(event.is_trace);
        assert_eq!(event.duration_ms(), 1.5);
        assert_eq!(
            serde_json::Value::Object(event.attributes.clone()),
            json!({"service.name": "checkout", "env": "span", "http.status": 500})
        );
    }

    #[test]
    fn test_missing_resource_uses_unknown_service() {
        let events = events_from_traces(&request(None, vec![span("a", &[0x02; 8]), span("b", &[])]));
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.service_name == "unknown"));
        assert_eq!(events[0].parent_span_id, "0202020202020202");
    }

    #[test]
    fn test_empty_request() {
        assert!(events_from_traces(&ExportTraceServiceRequest::default()).is_empty());
    }
}
