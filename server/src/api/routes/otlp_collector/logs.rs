//! Logs export endpoint

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use opentelemetry_proto::tonic::collector::logs::v1::{
    ExportLogsServiceRequest, ExportLogsServiceResponse,
};

use super::{OtlpEncoding, OtlpState, store_events};
use crate::domain::events_from_logs;

pub async fn export(State(state): State<OtlpState>, headers: HeaderMap, body: Bytes) -> Response {
    let encoding = OtlpEncoding::from_headers(&headers);

    let request: ExportLogsServiceRequest = match encoding.decode(&body) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };

    let events = events_from_logs(&request);
    if let Err(response) = store_events(&state, "logs", &events).await {
        return response;
    }

    encoding.respond(&ExportLogsServiceResponse {
        partial_success: None,
    })
}
