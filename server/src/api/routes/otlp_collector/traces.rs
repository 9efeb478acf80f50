//! Traces export endpoint

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use opentelemetry_proto::tonic::collector::trace::v1::{
    ExportTraceServiceRequest, ExportTraceServiceResponse,
};

use super::{OtlpEncoding, OtlpState, store_events};
use crate::domain::events_from_traces;

pub async fn export(State(state): State<OtlpState>, headers: HeaderMap, body: Bytes) -> Response {
    let encoding = OtlpEncoding::from_headers(&headers);

    let request: ExportTraceServiceRequest = match encoding.decode(&body) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };

    let events = events_from_traces(&request);
    if let Err(response) = store_events(&state, "traces", &events).await {
        return response;
    }

    encoding.respond(&ExportTraceServiceResponse {
        partial_success: None,
    })
}
