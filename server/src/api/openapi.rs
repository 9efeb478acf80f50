//! OpenAPI document for the query API

use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{events, filters, health};
use crate::api::types::ErrorBody;
use crate::data::types::{EventRow, FilterRow, TraceEventRow};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Manta API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Event search over OTLP traces and logs"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "events", description = "Event search and trace views"),
        (name = "filters", description = "Remembered filter expressions")
    ),
    paths(
        health::health,
        events::list_events,
        events::get_event_attributes,
        events::list_trace_events,
        events::list_attribute_names,
        filters::list_filters,
        filters::delete_filter,
    ),
    components(schemas(ErrorBody, EventRow, TraceEventRow, FilterRow, health::HealthResponse))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/api/health",
            "/api/events",
            "/api/events/{id}/attributes",
            "/api/traces/{trace_id}/events",
            "/api/attributes",
            "/api/filters",
            "/api/filters/{id}",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}
