//! Movie persistence
//!
//! [`MovieStore`] is the seam between the catalog service and storage.
//! [`PgMovieStore`] backs production; [`InMemoryMovieStore`] mirrors its
//! semantics for tests and local runs.

pub mod memory;
pub mod movie;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::{
    filters::FilterSet,
    models::{DueReminder, Movie, MovieChanges, NewMovie},
};

pub use memory::InMemoryMovieStore;
pub use movie::PgMovieStore;

/// Scoped, paginated listing request
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub owner_id: Uuid,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
    pub filters: Option<FilterSet>,
}

impl ListParams {
    /// Rows to skip before the requested page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

/// Storage operations on movies. Every read except [`MovieStore::update`]'s
/// target lookup ignores soft-deleted rows.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Live movie `id` owned by `owner_id`.
    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> DatabaseResult<Option<Movie>>;

    /// Live movie of `owner_id` whose title equals `title` ignoring case,
    /// other than `exclude_id`.
    async fn find_by_title(
        &self,
        title: &str,
        owner_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> DatabaseResult<Option<Movie>>;

    /// One page of live movies, newest first, and the total match count.
    async fn list(&self, params: &ListParams) -> DatabaseResult<(Vec<Movie>, i64)>;

    async fn create(&self, movie: &NewMovie) -> DatabaseResult<Movie>;

    /// Apply `changes` and bump `updated_at`.
    async fn update(&self, id: Uuid, changes: &MovieChanges) -> DatabaseResult<Movie>;

    /// Stamp `deleted_at`; the row is kept.
    async fn soft_delete(&self, id: Uuid) -> DatabaseResult<()>;

    /// Raw genre tokens used by the owner's live movies.
    async fn distinct_genres(&self, owner_id: Uuid) -> DatabaseResult<Vec<String>>;

    /// Live, un-reminded movies releasing within `[day_start, day_end]`,
    /// joined with their owner's email.
    async fn find_due_for_reminder(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> DatabaseResult<Vec<DueReminder>>;

    async fn mark_reminder_sent(&self, id: Uuid) -> DatabaseResult<()>;
}
