//! Catalog operations scoped to a single owner

use std::sync::Arc;

use common::{clock::Clock, error::DatabaseError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{CatalogError, CatalogResult},
    filters::{FilterSource, with_fallback_search},
    genres::display_genres,
    mapper,
    models::{Movie, MovieInput, MoviePage, MoviePatch},
    repositories::{ListParams, MovieStore},
    validation,
};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 50;

/// Listing request as received from a client
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Free-text search given next to the encoded filter
    pub search: Option<String>,
    pub filters: FilterSource,
}

/// Movie catalog service
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn MovieStore>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    /// Create a new catalog service
    pub fn new(store: Arc<dyn MovieStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// One page of the owner's movies, newest first.
    ///
    /// A filter that cannot be read is treated as no filter; only the page
    /// window is validated.
    pub async fn list(&self, owner_id: Uuid, query: ListQuery) -> CatalogResult<MoviePage> {
        let page = query.page.unwrap_or(DEFAULT_PAGE);
        let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);

        if page < 1 {
            return Err(CatalogError::Validation(
                "Page must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(CatalogError::Validation(format!(
                "Per page must be between 1 and {MAX_PER_PAGE}"
            )));
        }

        let filters = with_fallback_search(query.filters.parse(), query.search.as_deref());

        let params = ListParams {
            owner_id,
            page,
            per_page,
            filters,
        };
        let (items, total) = self.store.list(&params).await?;

        Ok(MoviePage {
            items,
            page,
            per_page,
            total,
        })
    }

    /// The owner's live movie `id`.
    pub async fn get(&self, id: Uuid, owner_id: Uuid) -> CatalogResult<Movie> {
        self.store
            .find_by_id(id, owner_id)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    pub async fn create(&self, owner_id: Uuid, input: MovieInput) -> CatalogResult<Movie> {
        validation::validate_input(&input).map_err(CatalogError::Validation)?;

        let movie = mapper::new_movie(owner_id, input);
        self.ensure_title_free(&movie.title, owner_id, None).await?;

        let created = self.store.create(&movie).await.map_err(conflict_or_storage)?;

        info!(movie_id = %created.id, owner_id = %owner_id, "Movie created");
        Ok(created)
    }

    /// Change only the supplied fields of the owner's movie `id`.
    pub async fn update(&self, id: Uuid, owner_id: Uuid, patch: MoviePatch) -> CatalogResult<Movie> {
        validation::validate_patch(&patch).map_err(CatalogError::Validation)?;

        let existing = self.get(id, owner_id).await?;
        let changes = mapper::movie_changes(patch, &existing, self.clock.now());

        if let Some(title) = &changes.title {
            self.ensure_title_free(title, owner_id, Some(id)).await?;
        }

        if changes.is_empty() {
            return Ok(existing);
        }

        let updated = self
            .store
            .update(id, &changes)
            .await
            .map_err(conflict_or_storage)?;

        if let Some(reminder_sent) = changes.reminder_sent {
            info!(
                movie_id = %id,
                owner_id = %owner_id,
                reminder_sent,
                "Release date changed, reminder flag updated"
            );
        } else {
            info!(movie_id = %id, owner_id = %owner_id, "Movie updated");
        }

        Ok(updated)
    }

    /// Soft-delete the owner's movie `id`.
    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> CatalogResult<()> {
        self.get(id, owner_id).await?;

        self.store.soft_delete(id).await.map_err(|err| match err {
            DatabaseError::Query(sqlx::Error::RowNotFound) => CatalogError::NotFound,
            other => CatalogError::Storage(other),
        })?;

        info!(movie_id = %id, owner_id = %owner_id, "Movie deleted");
        Ok(())
    }

    /// Distinct genres of the owner's live movies, ready for display.
    pub async fn genres(&self, owner_id: Uuid) -> CatalogResult<Vec<String>> {
        let raw = self.store.distinct_genres(owner_id).await?;
        Ok(display_genres(raw))
    }

    async fn ensure_title_free(
        &self,
        title: &str,
        owner_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> CatalogResult<()> {
        match self.store.find_by_title(title, owner_id, exclude_id).await? {
            Some(existing) => {
                warn!(
                    movie_id = %existing.id,
                    owner_id = %owner_id,
                    "Rejected duplicate movie title"
                );
                Err(CatalogError::Conflict)
            }
            None => Ok(()),
        }
    }
}

/// A write that lost a race on the title index is still a conflict.
fn conflict_or_storage(err: DatabaseError) -> CatalogError {
    if err.is_unique_violation() {
        CatalogError::Conflict
    } else {
        CatalogError::Storage(err)
    }
}
