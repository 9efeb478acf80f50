//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::middleware::{self, AllowedOrigins};
use super::openapi::openapi_json;
use super::routes::{events, filters, health, otlp_collector};
use crate::core::CoreApp;
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_BODY_LIMIT, OTLP_BODY_LIMIT};
use crate::data::EventStore;

/// Full HTTP surface: OTLP ingestion under `/v1`, query API under `/api`
pub fn router(store: Arc<EventStore>, config: &AppConfig) -> Router {
    // Gzip bodies are inflated before the limit applies
    let otlp_routes = otlp_collector::routes(store.clone())
        .layer(DefaultBodyLimit::max(OTLP_BODY_LIMIT))
        .layer(RequestDecompressionLayer::new());

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/openapi.json", get(openapi_json))
        .merge(events::routes(store.clone()))
        .merge(filters::routes(store))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT));

    // Request logs are visible at the default filter only in debug mode
    let level = if config.debug {
        Level::INFO
    } else {
        Level::DEBUG
    };
    let allowed_origins = AllowedOrigins::from_config(&config.server);
    tracing::debug!(origins = ?allowed_origins, "CORS configured");

    Router::new()
        .nest("/v1", otlp_routes)
        .nest("/api", api_routes)
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(middleware::cors(&allowed_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(level))
                .on_response(DefaultOnResponse::new().level(level)),
        )
}

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until shutdown is triggered; returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;
        let shutdown = app.shutdown.clone();

        let host = &app.config.server.host;
        let port = app.config.server.port;
        let ip = host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse()
            .with_context(|| format!("Invalid server.host: {}", host))?;
        let addr = SocketAddr::new(ip, port);

        let router = router(app.store.clone(), &app.config);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!(%addr, "Listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::core::config::{DatabaseConfig, ServerConfig};
    use crate::data::filters::AttributeStorage;
    use crate::data::test_store;

    fn config(origins: &[&str]) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 4318,
                allowed_origins: origins.iter().map(|s| s.to_string()).collect(),
            },
            database: DatabaseConfig {
                path: PathBuf::from(":memory:"),
                attribute_storage: AttributeStorage::Json,
            },
            debug: false,
        }
    }

    async fn app(origins: &[&str]) -> Router {
        let store = Arc::new(test_store(AttributeStorage::Json).await);
        router(store, &config(origins))
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(&[])
            .await
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = app(&[])
            .await
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let preflight = |origin: &str| {
            Request::builder()
                .method("OPTIONS")
                .uri("/api/events")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap()
        };

        let router = app(&["http://ui.test"]).await;
        let allowed = router.clone().oneshot(preflight("http://ui.test")).await.unwrap();
        assert_eq!(
            allowed
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://ui.test"
        );

        let denied = router.oneshot(preflight("http://evil.test")).await.unwrap();
        assert!(
            denied
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_otlp_mounted_under_v1() {
        let response = app(&[])
            .await
            .oneshot(
                Request::post("/v1/traces")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"resourceSpans":[]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
