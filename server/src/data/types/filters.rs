//! Filter memory rows

use serde::Serialize;
use utoipa::ToSchema;

/// A previously used filter expression
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FilterRow {
    pub id: i64,
    pub filter: String,
    /// Unix seconds
    pub last_used: i64,
}
