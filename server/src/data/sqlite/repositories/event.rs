//! Event repository for SQLite operations

use serde_json::Value as JsonValue;
use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool};

use crate::data::filters::{QueryFragment, SqlValue};
use crate::data::sqlite::SqliteError;
use crate::data::types::{EventPage, EventRow, NewEvent, TraceEventRow};
use crate::utils::json::json_to_attribute_text;
use crate::utils::time::{millis_between, parse_iso_timestamp, to_storage_timestamp};

/// Listed columns; compiled filters refer to the events row as `e`
const EVENT_COLUMNS: &str = "e.id, e.trace_id, e.span_id, e.parent_span_id, e.message, \
     e.service_name, e.start_timestamp, e.end_timestamp, e.duration, e.is_trace";

type EventTuple = (
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    f64,
    bool,
);

fn event_from_tuple(row: EventTuple) -> EventRow {
    let (
        id,
        trace_id,
        span_id,
        parent_span_id,
        message,
        service_name,
        start_timestamp,
        end_timestamp,
        duration,
        is_trace,
    ) = row;
    EventRow {
        id,
        trace_id,
        span_id,
        parent_span_id,
        message,
        service_name,
        start_timestamp,
        end_timestamp,
        duration,
        is_trace,
    }
}

/// Bind compiled filter parameters in placeholder order
fn bind_params<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &[SqlValue],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for value in params {
        query = match value {
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Integer(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            // SQLite has no date type; date() understands ISO text
            SqlValue::Date(d) => query.bind(SqlValue::date_text(d)),
        };
    }
    query
}

/// Insert a batch of events and their key/value attribute rows
/// Returns the new event ids in input order
pub async fn insert_events(pool: &SqlitePool, events: &[NewEvent]) -> Result<Vec<i64>, SqliteError> {
    if events.is_empty() {
        return Ok(Vec::new());
    }

    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(events.len());

    for event in events {
        let attributes = serde_json::to_string(&event.attributes)?;
        let result = sqlx::query(
            r#"
            INSERT INTO events (trace_id, span_id, parent_span_id, message, service_name,
                                start_timestamp, end_timestamp, duration, is_trace, attributes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.trace_id)
        .bind(&event.span_id)
        .bind(&event.parent_span_id)
        .bind(&event.message)
        .bind(&event.service_name)
        .bind(to_storage_timestamp(&event.start_timestamp))
        .bind(to_storage_timestamp(&event.end_timestamp))
        .bind(event.duration_ms())
        .bind(event.is_trace)
        .bind(attributes)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        for (name, value) in &event.attributes {
            sqlx::query("INSERT INTO event_attributes (event_id, name, value) VALUES (?, ?, ?)")
                .bind(id)
                .bind(name)
                .bind(json_to_attribute_text(value))
                .execute(&mut *tx)
                .await?;
        }
        ids.push(id);
    }

    tx.commit().await?;

    tracing::debug!(count = ids.len(), "Inserted events");
    Ok(ids)
}

/// List events newest first, optionally restricted by a compiled filter
///
/// The filter must have been compiled for SQLite with row alias `e`.
/// `total` counts every event matching the filter, ignoring `skip`/`limit`.
pub async fn list_events(
    pool: &SqlitePool,
    filter: Option<&QueryFragment>,
    skip: u32,
    limit: u32,
) -> Result<EventPage, SqliteError> {
    let (where_clause, params) = match filter {
        Some(fragment) => (format!(" WHERE {}", fragment.sql), fragment.params.as_slice()),
        None => (String::new(), &[][..]),
    };

    let count_sql = format!("SELECT COUNT(*) FROM events e{}", where_clause);
    let (total,): (i64,) = bind_params(sqlx::query_as(&count_sql), params)
        .fetch_one(pool)
        .await?;

    let list_sql = format!(
        "SELECT {} FROM events e{} ORDER BY e.start_timestamp DESC, e.id DESC LIMIT ? OFFSET ?",
        EVENT_COLUMNS, where_clause
    );
    let rows: Vec<EventTuple> = bind_params(sqlx::query_as(&list_sql), params)
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await?;

    Ok(EventPage {
        rows: rows.into_iter().map(event_from_tuple).collect(),
        total,
    })
}

/// All events of a trace in start order, with offsets from the first event
pub async fn list_trace_events(
    pool: &SqlitePool,
    trace_id: &str,
) -> Result<Vec<TraceEventRow>, SqliteError> {
    let sql = format!(
        "SELECT {} FROM events e WHERE e.trace_id = ? ORDER BY e.start_timestamp ASC, e.id ASC",
        EVENT_COLUMNS
    );
    let rows: Vec<EventTuple> = sqlx::query_as(&sql)
        .bind(trace_id)
        .fetch_all(pool)
        .await?;

    let events: Vec<EventRow> = rows.into_iter().map(event_from_tuple).collect();
    let Some(first) = events.first().map(|e| parse_iso_timestamp(&e.start_timestamp)) else {
        return Ok(Vec::new());
    };

    Ok(events
        .into_iter()
        .map(|event| {
            let offset_ms = millis_between(&first, &parse_iso_timestamp(&event.start_timestamp));
            TraceEventRow { event, offset_ms }
        })
        .collect())
}

/// Attribute object of one event, `None` if the event does not exist
pub async fn get_event_attributes(
    pool: &SqlitePool,
    event_id: i64,
) -> Result<Option<JsonValue>, SqliteError> {
    let raw: Option<String> = sqlx::query_scalar("SELECT attributes FROM events WHERE id = ?")
        .bind(event_id)
        .fetch_optional(pool)
        .await?;

    Ok(raw.map(|s| serde_json::from_str(&s)).transpose()?)
}

/// Sorted distinct attribute names across all stored events
pub async fn unique_attribute_names(pool: &SqlitePool) -> Result<Vec<String>, SqliteError> {
    let names = sqlx::query_scalar("SELECT DISTINCT name FROM event_attributes ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(names)
}
