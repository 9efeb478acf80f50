//! Data storage layer
//!
//! - `sqlite` - Event store: schema, migrations, repositories
//! - `filters` - Filter expression compiler (text → parameterized predicate)
//! - `sql` - SQL dialects the compiler can target
//! - `types` - Row types shared by repositories and the API
//! - `error` - Error type for store operations

pub mod error;
pub mod filters;
pub mod sql;
pub mod sqlite;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use filters::{AttributeStorage, FilterCompiler, columns};
use sql::Backend;
use sqlite::repositories;
use types::{EventPage, FilterRow, NewEvent, TraceEventRow};

/// Event store service
///
/// Couples the SQLite service with the filter compiler configured for it.
/// Filters are compiled per call against the attribute names currently in
/// the store, since the attribute namespace grows with ingestion.
pub struct EventStore {
    db: Arc<SqliteService>,
    compiler: FilterCompiler,
}

impl EventStore {
    /// Open the database at `path` and configure attribute lookups
    pub async fn init(path: &Path, storage: AttributeStorage) -> Result<Self, DataError> {
        let db = SqliteService::init(path).await?;
        Ok(Self::new(Arc::new(db), storage))
    }

    pub fn new(db: Arc<SqliteService>, storage: AttributeStorage) -> Self {
        let compiler = FilterCompiler::new(Backend::Sqlite)
            .storage(storage)
            .columns(columns::EVENT_FILTERABLE);
        Self { db, compiler }
    }

    pub fn compiler(&self) -> &FilterCompiler {
        &self.compiler
    }

    /// Store a batch of events, returning how many were written
    pub async fn ingest(&self, events: &[NewEvent]) -> Result<usize, DataError> {
        let ids = repositories::insert_events(self.db.pool(), events).await?;
        Ok(ids.len())
    }

    /// List events matching an optional filter expression
    ///
    /// An empty or whitespace-only filter means "no filter". A filter that
    /// compiles is remembered in filter memory; one that does not is returned
    /// as [`DataError::InvalidFilter`] and never applied partially.
    pub async fn search(
        &self,
        filter: Option<&str>,
        skip: u32,
        limit: u32,
    ) -> Result<EventPage, DataError> {
        let Some(text) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
            return Ok(repositories::list_events(self.db.pool(), None, skip, limit).await?);
        };

        let known: HashSet<String> = repositories::unique_attribute_names(self.db.pool())
            .await?
            .into_iter()
            .collect();
        let fragment = self.compiler.compile(text, &known)?;

        let page = repositories::list_events(self.db.pool(), Some(&fragment), skip, limit).await?;

        if let Err(e) = repositories::record_filter(self.db.pool(), text).await {
            tracing::warn!(error = %e, "Failed to remember filter");
        }

        Ok(page)
    }

    pub async fn trace_events(&self, trace_id: &str) -> Result<Vec<TraceEventRow>, DataError> {
        Ok(repositories::list_trace_events(self.db.pool(), trace_id).await?)
    }

    pub async fn event_attributes(&self, event_id: i64) -> Result<Option<JsonValue>, DataError> {
        Ok(repositories::get_event_attributes(self.db.pool(), event_id).await?)
    }

    pub async fn attribute_names(&self) -> Result<Vec<String>, DataError> {
        Ok(repositories::unique_attribute_names(self.db.pool()).await?)
    }

    pub async fn filters(&self, skip: u32, limit: u32) -> Result<Vec<FilterRow>, DataError> {
        Ok(repositories::list_filters(self.db.pool(), skip, limit).await?)
    }

    pub async fn filter_texts(&self) -> Result<Vec<String>, DataError> {
        Ok(repositories::list_filter_texts(self.db.pool()).await?)
    }

    pub async fn delete_filter(&self, id: i64) -> Result<bool, DataError> {
        Ok(repositories::delete_filter(self.db.pool(), id).await?)
    }

    /// Start the periodic WAL checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        self.db.start_checkpoint_task(shutdown_rx)
    }

    /// Final checkpoint, then close the pool
    pub async fn close(&self) {
        if let Err(e) = self.db.checkpoint().await {
            tracing::warn!("SQLite checkpoint failed: {}", e);
        }
        self.db.close().await;
    }
}

/// In-memory store for tests in other modules
#[cfg(test)]
pub(crate) async fn test_store(storage: AttributeStorage) -> EventStore {
    let pool = sqlite::test_pool().await;
    EventStore::new(Arc::new(SqliteService::from_pool(pool)), storage)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::filters::CompileStage;
    use crate::utils::time::nanos_to_datetime;

    fn event(message: &str, status: i64) -> NewEvent {
        NewEvent {
            trace_id: "t".to_string(),
            span_id: message.to_string(),
            parent_span_id: String::new(),
            message: message.to_string(),
            service_name: "api".to_string(),
            start_timestamp: nanos_to_datetime(1_704_067_200_000_000_000 + status as u64),
            end_timestamp: nanos_to_datetime(1_704_067_200_000_000_000 + status as u64),
            is_trace: true,
            attributes: json!({"status": status}).as_object().cloned().unwrap(),
        }
    }

    async fn seeded(storage: AttributeStorage) -> EventStore {
        let store = test_store(storage).await;
        let written = store
            .ingest(&[event("ok", 200), event("fail", 500)])
            .await
            .unwrap();
        assert_eq!(written, 2);
        store
    }

    #[tokio::test]
    async fn test_search_without_filter() {
        let store = seeded(AttributeStorage::Json).await;
        for filter in [None, Some(""), Some("   ")] {
            let page = store.search(filter, 0, 10).await.unwrap();
            assert_eq!(page.total, 2);
        }
        assert!(store.filter_texts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_records_successful_filter() {
        for storage in [AttributeStorage::Json, AttributeStorage::KeyValue] {
            let store = seeded(storage).await;
            let page = store.search(Some("  status >= 500 "), 0, 10).await.unwrap();
            assert_eq!(page.total, 1, "storage: {}", storage);
            assert_eq!(page.rows[0].message, "fail");
            assert_eq!(store.filter_texts().await.unwrap(), vec!["status >= 500"]);
        }
    }

    #[tokio::test]
    async fn test_search_rejects_invalid_filter_without_recording() {
        let store = seeded(AttributeStorage::Json).await;

        let err = store.search(Some("status >="), 0, 10).await.unwrap_err();
        match err {
            DataError::InvalidFilter(e) => assert_eq!(e.stage(), CompileStage::Parsing),
            other => panic!("unexpected {:?}", other),
        }

        let err = store.search(Some("nope = 1"), 0, 10).await.unwrap_err();
        match err {
            DataError::InvalidFilter(e) => assert_eq!(e.stage(), CompileStage::Compiling),
            other => panic!("unexpected {:?}", other),
        }

        assert!(store.filter_texts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_memory_roundtrip() {
        let store = seeded(AttributeStorage::Json).await;
        store.search(Some("status = 200"), 0, 10).await.unwrap();

        let filters = store.filters(0, 10).await.unwrap();
        assert_eq!(filters.len(), 1);
        assert!(store.delete_filter(filters[0].id).await.unwrap());
        assert!(store.filters(0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_attribute_names_and_attributes() {
        let store = seeded(AttributeStorage::Json).await;
        assert_eq!(store.attribute_names().await.unwrap(), vec!["status"]);

        let page = store.search(None, 0, 10).await.unwrap();
        let attrs = store.event_attributes(page.rows[0].id).await.unwrap();
        assert_eq!(attrs, Some(json!({"status": 500})));

        let trace = store.trace_events("t").await.unwrap();
        assert_eq!(trace.len(), 2);
    }
}
