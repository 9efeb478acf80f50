//! Event API types

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::api::types::{default_limit, validate_limit};

/// Query params for listing events
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct ListEventsQuery {
    /// Filter expression, e.g. `http.status >= 500 AND service_name = 'api'`
    #[serde(default)]
    #[validate(length(max = 4096, message = "Filter must be at most 4096 characters"))]
    pub filter: Option<String>,
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
}
