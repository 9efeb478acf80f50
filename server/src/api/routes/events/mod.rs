//! Event query endpoints

mod types;

pub use types::ListEventsQuery;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value as JsonValue;

use crate::api::extractors::{TracePath, ValidatedQuery};
use crate::api::types::ApiError;
use crate::data::EventStore;
use crate::data::types::{EventRow, TraceEventRow};

/// Total rows matching the filter, ignoring `skip`/`limit`
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub fn routes(store: Arc<EventStore>) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{id}/attributes", get(get_event_attributes))
        .route("/traces/{trace_id}/events", get(list_trace_events))
        .route("/attributes", get(list_attribute_names))
        .with_state(store)
}

/// List events, newest first, optionally filtered
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "Events; total in the x-total-count header", body = Vec<EventRow>),
        (status = 400, description = "Invalid filter or pagination", body = crate::api::types::ErrorBody)
    )
)]
pub async fn list_events(
    State(store): State<Arc<EventStore>>,
    ValidatedQuery(query): ValidatedQuery<ListEventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = store
        .search(query.filter.as_deref(), query.skip, query.limit)
        .await?;

    tracing::debug!(
        rows = page.rows.len(),
        total = page.total,
        filtered = query.filter.is_some(),
        "Listed events"
    );

    Ok(([(TOTAL_COUNT_HEADER, page.total.to_string())], Json(page.rows)))
}

/// Attribute payload of one event
#[utoipa::path(
    get,
    path = "/api/events/{id}/attributes",
    tag = "events",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Attribute object"),
        (status = 404, description = "Event not found", body = crate::api::types::ErrorBody)
    )
)]
pub async fn get_event_attributes(
    State(store): State<Arc<EventStore>>,
    Path(id): Path<i64>,
) -> Result<Json<JsonValue>, ApiError> {
    store
        .event_attributes(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("EVENT_NOT_FOUND", format!("Event {} not found", id)))
}

/// Events of one trace, in start order
#[utoipa::path(
    get,
    path = "/api/traces/{trace_id}/events",
    tag = "events",
    params(("trace_id" = String, Path, description = "Hex trace id")),
    responses(
        (status = 200, description = "Trace events with offsets", body = Vec<TraceEventRow>)
    )
)]
pub async fn list_trace_events(
    State(store): State<Arc<EventStore>>,
    path: TracePath,
) -> Result<Json<Vec<TraceEventRow>>, ApiError> {
    Ok(Json(store.trace_events(&path.trace_id).await?))
}

/// Distinct attribute names seen in stored events
#[utoipa::path(
    get,
    path = "/api/attributes",
    tag = "events",
    responses(
        (status = 200, description = "Sorted attribute names", body = Vec<String>)
    )
)]
pub async fn list_attribute_names(
    State(store): State<Arc<EventStore>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(store.attribute_names().await?))
}
