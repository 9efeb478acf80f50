//! SQLite schema definitions
//!
//! `SCHEMA` is the complete latest schema, applied as-is to fresh databases.
//! Older databases are brought forward by the numbered migrations.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Events (spans and log records, flattened)
-- =============================================================================
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trace_id TEXT NOT NULL DEFAULT '',
    span_id TEXT NOT NULL DEFAULT '',
    parent_span_id TEXT NOT NULL DEFAULT '',
    message TEXT NOT NULL DEFAULT '',
    service_name TEXT NOT NULL DEFAULT 'unknown',
    start_timestamp TEXT NOT NULL,
    end_timestamp TEXT NOT NULL,
    duration REAL NOT NULL DEFAULT 0,
    is_trace INTEGER NOT NULL DEFAULT 0 CHECK (is_trace IN (0, 1)),
    attributes TEXT NOT NULL DEFAULT '{}' CHECK (json_valid(attributes))
);

CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_timestamp DESC);
CREATE INDEX IF NOT EXISTS idx_events_trace ON events(trace_id, start_timestamp);
CREATE INDEX IF NOT EXISTS idx_events_service ON events(service_name);

-- =============================================================================
-- 2. Event attributes (key/value mirror of events.attributes)
-- =============================================================================
CREATE TABLE IF NOT EXISTS event_attributes (
    event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    value TEXT,
    PRIMARY KEY (event_id, name)
);

CREATE INDEX IF NOT EXISTS idx_event_attributes_name ON event_attributes(name, value);

-- =============================================================================
-- 3. Filter memory (recently used filter expressions)
-- =============================================================================
CREATE TABLE IF NOT EXISTS filters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filter TEXT NOT NULL UNIQUE CHECK(length(filter) >= 1),
    last_used INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_filters_last_used ON filters(last_used DESC);
"#;
