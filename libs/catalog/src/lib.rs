//! Personal movie catalog
//!
//! Owner-scoped movie records with soft delete, a compact filter encoding for
//! listings, and the storage seam shared by the HTTP API and the reminder job.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use catalog::{CatalogService, InMemoryMovieStore, ListQuery, filters::FilterSource};
//! use common::clock::SystemClock;
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), catalog::CatalogError> {
//! let service = CatalogService::new(Arc::new(InMemoryMovieStore::new()), Arc::new(SystemClock));
//!
//! let page = service
//!     .list(
//!         Uuid::new_v4(),
//!         ListQuery {
//!             filters: FilterSource::Segments(vec!["dur-gte-90".into(), "genre-drama".into()]),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! assert_eq!(page.total, 0);
//! # Ok(())
//! # }
//! ```

pub mod dates;
pub mod error;
pub mod filters;
pub mod genres;
pub mod mapper;
pub mod models;
pub mod repositories;
pub mod service;
pub mod validation;

pub use error::{CatalogError, CatalogResult};
pub use repositories::{InMemoryMovieStore, MovieStore, PgMovieStore};
pub use service::{CatalogService, ListQuery};
