//! HTTP middleware (CORS, 404 handler)

use axum::Json;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::routes::events::TOTAL_COUNT_HEADER;
use crate::core::config::{ServerConfig, is_all_interfaces};

/// Origins allowed to call the API from a browser
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Configured origins, or local defaults derived from the bind address
    pub fn from_config(server: &ServerConfig) -> Self {
        if server.allowed_origins.iter().any(|o| o == "*") {
            return Self::Any;
        }
        if !server.allowed_origins.is_empty() {
            return Self::List(server.allowed_origins.clone());
        }
        Self::List(Self::defaults(&server.host, server.port))
    }

    fn defaults(host: &str, port: u16) -> Vec<String> {
        let is_all = is_all_interfaces(host);
        let hosts: Vec<&str> = if is_all || host == "127.0.0.1" || host == "localhost" {
            vec!["localhost", "127.0.0.1"]
        } else {
            vec![host]
        };

        let mut origins = Vec::new();
        for h in hosts {
            origins.push(format!("http://{}:{}", h, port));
            origins.push(format!("http://{}", h));
        }

        if is_all {
            if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
                for (_, ip) in interfaces
                    .iter()
                    .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
                {
                    origins.push(format!("http://{}:{}", ip, port));
                }
            }
        }
        origins
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::List(origins) => origins.iter().any(|o| o == origin),
        }
    }
}

/// Create CORS layer
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::CONTENT_ENCODING,
            header::ACCEPT,
            header::ORIGIN,
        ])
        .expose_headers([header::HeaderName::from_static(TOTAL_COUNT_HEADER)]);

    match allowed {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(origins) => {
            let values: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            layer.allow_origin(AllowOrigin::list(values))
        }
    }
}

/// Unknown route: JSON 404 in the API error shape
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "[404]");
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "not_found",
            "code": "ROUTE_NOT_FOUND",
            "message": format!("No route for {} {}", req.method(), req.uri().path()),
        })),
    )
}
