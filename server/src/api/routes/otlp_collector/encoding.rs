//! OTLP/HTTP payload encodings
//!
//! Requests arrive as protobuf (`application/x-protobuf`) or JSON
//! (`application/json`); responses mirror the request's encoding.

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use prost::Message;
use serde::{Deserialize, Serialize};

const PROTOBUF: &str = "application/x-protobuf";
const JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtlpEncoding {
    Protobuf,
    Json,
}

impl OtlpEncoding {
    /// Encoding named by `Content-Type`; anything other than JSON is treated as protobuf
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().starts_with(JSON));
        if is_json {
            OtlpEncoding::Json
        } else {
            OtlpEncoding::Protobuf
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OtlpEncoding::Protobuf => PROTOBUF,
            OtlpEncoding::Json => JSON,
        }
    }

    /// Decode an export request
    pub fn decode<T>(self, body: &Bytes) -> Result<T, DecodeError>
    where
        T: Message + Default + for<'de> Deserialize<'de>,
    {
        match self {
            OtlpEncoding::Protobuf => {
                T::decode(body.as_ref()).map_err(|e| DecodeError::Protobuf(e.to_string()))
            }
            OtlpEncoding::Json => {
                serde_json::from_slice(body.as_ref()).map_err(|e| DecodeError::Json(e.to_string()))
            }
        }
    }

    /// Encode an export response as a complete HTTP response
    pub fn respond<T>(self, response: &T) -> Response
    where
        T: Message + Serialize,
    {
        let bytes = match self {
            OtlpEncoding::Protobuf => Ok(response.encode_to_vec()),
            OtlpEncoding::Json => serde_json::to_vec(response),
        };
        match bytes {
            Ok(bytes) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, self.content_type())],
                bytes,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode OTLP response");
                plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// Request body that does not decode in its declared encoding
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("protobuf decode error: {0}")]
    Protobuf(String),
    #[error("JSON decode error: {0}")]
    Json(String),
}

impl IntoResponse for DecodeError {
    fn into_response(self) -> Response {
        // Details stay in the log
        tracing::warn!(error = %self, "Rejected OTLP request");
        let message = match self {
            DecodeError::Protobuf(_) => "Failed to decode protobuf request",
            DecodeError::Json(_) => "Failed to decode JSON request",
        };
        plain(StatusCode::BAD_REQUEST, message)
    }
}

pub(super) fn plain(status: StatusCode, message: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], message).into_response()
}
