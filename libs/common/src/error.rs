//! Custom error types for the common library
//!
//! This module defines the storage error type shared by every crate that
//! talks to PostgreSQL.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// PostgreSQL error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A uniqueness rule rejected the write outside of PostgreSQL
    #[error("Duplicate record: {0}")]
    Duplicate(String),
}

impl DatabaseError {
    /// True when the query was rejected by a unique index or constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Query(SqlxError::Database(db_err)) => {
                db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
            }
            DatabaseError::Duplicate(_) => true,
            _ => false,
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_is_not_a_unique_violation() {
        let err = DatabaseError::Configuration("bad url".to_string());
        assert!(!err.is_unique_violation());
        assert_eq!(err.to_string(), "Database configuration error: bad url");
    }

    #[test]
    fn row_not_found_is_not_a_unique_violation() {
        let err = DatabaseError::Query(SqlxError::RowNotFound);
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn duplicate_is_a_unique_violation() {
        let err = DatabaseError::Duplicate("movie title".to_string());
        assert!(err.is_unique_violation());
    }
}
