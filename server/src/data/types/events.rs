//! Event rows

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;

use crate::utils::time::millis_between;

/// Event to be inserted, produced by OTLP ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: String,
    pub message: String,
    pub service_name: String,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    pub is_trace: bool,
    pub attributes: Map<String, JsonValue>,
}

impl NewEvent {
    /// Duration in milliseconds, never negative
    pub fn duration_ms(&self) -> f64 {
        millis_between(&self.start_timestamp, &self.end_timestamp).max(0.0)
    }
}

/// Event row as listed by the API (attributes are fetched separately)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventRow {
    pub id: i64,
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: String,
    pub message: String,
    pub service_name: String,
    pub start_timestamp: String,
    pub end_timestamp: String,
    /// Milliseconds
    pub duration: f64,
    pub is_trace: bool,
}

/// Event within a trace, positioned relative to the trace's first event
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TraceEventRow {
    #[serde(flatten)]
    pub event: EventRow,
    pub offset_ms: f64,
}

/// One page of events plus the total matching the same filter
#[derive(Debug, Clone, PartialEq)]
pub struct EventPage {
    pub rows: Vec<EventRow>,
    pub total: i64,
}
