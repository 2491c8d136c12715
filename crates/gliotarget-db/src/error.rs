//! Database error types.

use gliotarget_common::ApiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Delimited text error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: u64, message: String },

    #[error("Invalid column name: {0:?}")]
    InvalidColumn(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl DbError {
    /// True for failures caused by the caller's input rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DbError::Csv(_)
                | DbError::MalformedInput { .. }
                | DbError::InvalidColumn(_)
                | DbError::UnknownTable(_)
                | DbError::InvalidQuery(_)
        )
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => ApiError::NotFound(what),
            e if e.is_client_error() => ApiError::BadRequest(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}
