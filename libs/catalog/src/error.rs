//! Catalog error types

use common::error::DatabaseError;
use thiserror::Error;

/// Errors surfaced by catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The movie does not exist, is deleted, or belongs to someone else
    #[error("Movie not found")]
    NotFound,

    /// Another live movie of the same owner already uses the title
    #[error("A movie with this title already exists.")]
    Conflict,

    /// Rejected input
    #[error("{0}")]
    Validation(String),

    /// Storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::Storage(DatabaseError::Query(err))
    }
}

/// Type alias for catalog results
pub type CatalogResult<T> = Result<T, CatalogError>;
