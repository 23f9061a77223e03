//! Error types for the database module.

use safecase_core::SafecaseError;
use thiserror::Error;

/// Errors that can occur when talking to PostgreSQL.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database connection failed
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(String),

    /// SQL query execution failed
    #[error("Query error: {0}")]
    Query(String),

    /// A stored row could not be mapped back to a domain value
    #[error("Corrupt row: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        Self::Query(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(e.to_string())
    }
}

impl From<DbError> for SafecaseError {
    fn from(e: DbError) -> Self {
        SafecaseError::PersistenceFailure(e.to_string())
    }
}
