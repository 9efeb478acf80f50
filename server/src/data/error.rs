//! Error type for the data layer
//!
//! Wraps store failures and filter compilation failures so callers can tell
//! a bad request (invalid filter) from a storage problem.

use thiserror::Error;

use super::filters::FilterError;
use super::sqlite::SqliteError;

/// Error type for event store operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    /// Stored JSON could not be decoded
    #[error("Corrupt stored data: {0}")]
    Corrupt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The filter expression did not compile
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),
}

impl DataError {
    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                true
            }
            // SQLITE_BUSY / SQLITE_LOCKED, including their extended codes
            Self::Sqlite(sqlx::Error::Database(e)) => e
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| matches!(code & 0xff, 5 | 6)),
            _ => false,
        }
    }
}

impl From<SqliteError> for DataError {
    fn from(e: SqliteError) -> Self {
        match e {
            SqliteError::Database(e) => Self::Sqlite(e),
            SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                version,
                name,
                error,
            },
            SqliteError::Io(e) => Self::Io(e),
            SqliteError::Json(e) => Self::Corrupt(e.to_string()),
        }
    }
}
