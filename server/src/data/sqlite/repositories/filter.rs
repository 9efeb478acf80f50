//! Filter memory repository for SQLite operations
//!
//! Remembers filter expressions that compiled successfully, most recently
//! used first, for search-box autocomplete.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::FilterRow;

/// Remember a filter, or bump its `last_used` if already known
/// Returns the filter id
pub async fn record_filter(pool: &SqlitePool, filter: &str) -> Result<i64, SqliteError> {
    record_filter_at(pool, filter, chrono::Utc::now().timestamp()).await
}

async fn record_filter_at(pool: &SqlitePool, filter: &str, now: i64) -> Result<i64, SqliteError> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO filters (filter, last_used)
        VALUES (?, ?)
        ON CONFLICT(filter) DO UPDATE SET last_used = excluded.last_used
        RETURNING id
        "#,
    )
    .bind(filter)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List remembered filters, most recently used first
pub async fn list_filters(
    pool: &SqlitePool,
    skip: u32,
    limit: u32,
) -> Result<Vec<FilterRow>, SqliteError> {
    let rows: Vec<(i64, String, i64)> = sqlx::query_as(
        r#"
        SELECT id, filter, last_used
        FROM filters
        ORDER BY last_used DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, filter, last_used)| FilterRow {
            id,
            filter,
            last_used,
        })
        .collect())
}

/// Filter texts only, most recently used first
pub async fn list_filter_texts(pool: &SqlitePool) -> Result<Vec<String>, SqliteError> {
    let texts = sqlx::query_scalar("SELECT filter FROM filters ORDER BY last_used DESC, id DESC")
        .fetch_all(pool)
        .await?;
    Ok(texts)
}

/// Forget a filter (idempotent)
/// Returns true if removed, false if it didn't exist
pub async fn delete_filter(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM filters WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
