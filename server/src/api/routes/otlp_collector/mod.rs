//! OpenTelemetry Protocol (OTLP/HTTP) collector endpoints
//!
//! `POST /v1/traces` and `POST /v1/logs` decode an export request, map it to
//! events and write them synchronously before acknowledging.

mod encoding;
mod logs;
mod traces;

use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;

use crate::core::constants::BACKPRESSURE_RETRY_AFTER_SECS;
use crate::data::EventStore;
use crate::data::types::NewEvent;

pub use encoding::{DecodeError, OtlpEncoding};

#[derive(Clone)]
pub struct OtlpState {
    pub store: Arc<EventStore>,
}

pub fn routes(store: Arc<EventStore>) -> Router {
    Router::new()
        .route("/traces", post(traces::export))
        .route("/logs", post(logs::export))
        .with_state(OtlpState { store })
}

/// Write mapped events; on failure the error response to send instead
async fn store_events(state: &OtlpState, signal: &str, events: &[NewEvent]) -> Result<(), Response> {
    if events.is_empty() {
        return Ok(());
    }

    match state.store.ingest(events).await {
        Ok(written) => {
            tracing::debug!(signal, written, "Stored OTLP events");
            Ok(())
        }
        Err(e) if e.is_transient() => {
            tracing::warn!(signal, error = %e, "Event store busy");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                [
                    (header::CONTENT_TYPE, "text/plain".to_string()),
                    (header::RETRY_AFTER, BACKPRESSURE_RETRY_AFTER_SECS.to_string()),
                ],
                "Service temporarily unavailable",
            )
                .into_response())
        }
        Err(e) => {
            tracing::error!(signal, error = %e, "Failed to store OTLP events");
            Err(encoding::plain(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
    use opentelemetry_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
    use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
    use opentelemetry_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span};
    use prost::Message;
    use tower::ServiceExt;

    use super::*;
    use crate::data::filters::AttributeStorage;
    use crate::data::test_store;

    async fn app() -> (Router, Arc<EventStore>) {
        let store = Arc::new(test_store(AttributeStorage::Json).await);
        (routes(store.clone()), store)
    }

    fn post(uri: &str, content_type: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    fn trace_request() -> ExportTraceServiceRequest {
        ExportTraceServiceRequest {
            resource_spans: vec![ResourceSpans {
                scope_spans: vec![ScopeSpans {
                    spans: vec![Span {
                        trace_id: vec![1; 16],
                        span_id: vec![2; 8],
                        name: "root".to_string(),
                        start_time_unix_nano: 1_704_067_200_000_000_000,
                        end_time_unix_nano: 1_704_067_200_002_000_000,
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[tokio::test]
    async fn test_export_traces_protobuf() {
        let (app, store) = app().await;
        let response = app
            .oneshot(post(
                "/traces",
                "application/x-protobuf",
                trace_request().encode_to_vec(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/x-protobuf"
        );

        let page = store.search(None, 0, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].message, "root");
        assert_eq!(page.rows[0].duration, 2.0);
        assert!(page.rows[0].is_trace);
    }

    #[tokio::test]
    async fn test_export_logs_json() {
        let (app, store) = app().await;
        let request = ExportLogsServiceRequest {
            resource_logs: vec![ResourceLogs {
                scope_logs: vec![ScopeLogs {
                    log_records: vec![LogRecord {
                        observed_time_unix_nano: 1_704_067_200_000_000_000,
                        severity_text: "WARN".to_string(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };
        let body = serde_json::to_vec(&request).unwrap();
        let response = app
            .oneshot(post("/logs", "application/json", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json.is_object());

        let page = store.search(Some("severity = 'WARN'"), 0, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(!page.rows[0].is_trace);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_bad_request() {
        let (app, store) = app().await;
        let response = app
            .oneshot(post("/traces", "application/x-protobuf", vec![0xff, 0xff, 0xff]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.search(None, 0, 10).await.unwrap().total, 0);
    }
}
