//! Filter memory endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::api::extractors::ValidatedQuery;
use crate::api::types::{ApiError, default_limit, validate_limit};
use crate::data::EventStore;
use crate::data::types::FilterRow;

pub fn routes(store: Arc<EventStore>) -> Router {
    Router::new()
        .route("/filters", get(list_filters))
        .route("/filters/{id}", delete(delete_filter))
        .with_state(store)
}

/// Query params for listing remembered filters
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct ListFiltersQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
    /// Return only the filter strings, unpaged (for autocomplete)
    #[serde(default)]
    pub text_only: bool,
}

/// Remembered filters, most recently used first
#[utoipa::path(
    get,
    path = "/api/filters",
    tag = "filters",
    params(ListFiltersQuery),
    responses(
        (status = 200, description = "Filter rows, or plain strings with text_only", body = Vec<FilterRow>)
    )
)]
pub async fn list_filters(
    State(store): State<Arc<EventStore>>,
    ValidatedQuery(query): ValidatedQuery<ListFiltersQuery>,
) -> Result<Response, ApiError> {
    if query.text_only {
        return Ok(Json(store.filter_texts().await?).into_response());
    }
    Ok(Json(store.filters(query.skip, query.limit).await?).into_response())
}

/// Forget a remembered filter
#[utoipa::path(
    delete,
    path = "/api/filters/{id}",
    tag = "filters",
    params(("id" = i64, Path, description = "Filter id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such filter", body = crate::api::types::ErrorBody)
    )
)]
pub async fn delete_filter(
    State(store): State<Arc<EventStore>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if store.delete_filter(id).await? {
        tracing::debug!(id, "Deleted filter");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(
            "FILTER_NOT_FOUND",
            format!("Filter {} not found", id),
        ))
    }
}
