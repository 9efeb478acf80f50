//! OTLP → event mapping
//!
//! Spans and log records share one event shape. Both carry the resource
//! attributes merged under their own, and `service.name` lifted into a column.

mod logs;
mod spans;

pub use logs::events_from_logs;
pub use spans::events_from_traces;

use opentelemetry_proto::tonic::common::v1::KeyValue;
use opentelemetry_proto::tonic::resource::v1::Resource;

use crate::core::constants::UNKNOWN_SERVICE_NAME;
use crate::utils::otlp;

/// Service name for a resource, `unknown` when absent
fn resource_service_name(resource: Option<&Resource>) -> String {
    resource
        .and_then(|r| otlp::service_name(&r.attributes))
        .unwrap_or_else(|| UNKNOWN_SERVICE_NAME.to_string())
}

fn resource_attributes(resource: Option<&Resource>) -> &[KeyValue] {
    resource.map(|r| r.attributes.as_slice()).unwrap_or_default()
}
