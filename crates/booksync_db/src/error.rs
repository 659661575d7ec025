//! Error types for the token store

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Connecting or preparing the schema took longer than allowed
    #[error("Database initialization timed out after {0:?}")]
    InitTimeout(Duration),

    /// The backing medium cannot be reached
    #[error("Token store unavailable: {0}")]
    Unavailable(String),
}

impl From<DbError> for booksync_common::BooksyncError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InitTimeout(_) => booksync_common::BooksyncError::TimeoutError(err.to_string()),
            DbError::ConfigError(msg) | DbError::UrlError(msg) => {
                booksync_common::BooksyncError::ConfigError(msg)
            }
            other => booksync_common::BooksyncError::DatabaseError(other.to_string()),
        }
    }
}
