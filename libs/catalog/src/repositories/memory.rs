//! In-memory movie store
//!
//! Mirrors [`super::PgMovieStore`]: the same alive rule, ordering, filters and
//! title comparison. Used by tests and by local runs without PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ListParams, MovieStore};
use crate::models::{DueReminder, Movie, MovieChanges, NewMovie, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    movies: Vec<Movie>,
}

/// Movie store kept in process memory
#[derive(Default)]
pub struct InMemoryMovieStore {
    tables: RwLock<Tables>,
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a movie owner so reminder scans can resolve the email.
    pub async fn add_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    /// Insert a fully formed row, bypassing normalization. Handy for
    /// seeding soft-deleted or already-reminded movies.
    pub async fn insert_movie(&self, movie: Movie) {
        self.tables.write().await.movies.push(movie);
    }

    /// Current row for `id`, deleted or not.
    pub async fn snapshot(&self, id: Uuid) -> Option<Movie> {
        self.tables
            .read()
            .await
            .movies
            .iter()
            .find(|movie| movie.id == id)
            .cloned()
    }
}

fn not_found() -> DatabaseError {
    DatabaseError::Query(sqlx::Error::RowNotFound)
}

#[async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> DatabaseResult<Option<Movie>> {
        let tables = self.tables.read().await;
        Ok(tables
            .movies
            .iter()
            .find(|movie| movie.is_alive() && movie.id == id && movie.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_title(
        &self,
        title: &str,
        owner_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> DatabaseResult<Option<Movie>> {
        let title = title.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .movies
            .iter()
            .find(|movie| {
                movie.is_alive()
                    && movie.owner_id == owner_id
                    && Some(movie.id) != exclude_id
                    && movie.title.to_lowercase() == title
            })
            .cloned())
    }

    async fn list(&self, params: &ListParams) -> DatabaseResult<(Vec<Movie>, i64)> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&Movie> = tables
            .movies
            .iter()
            .filter(|movie| movie.is_alive() && movie.owner_id == params.owner_id)
            .filter(|movie| {
                params
                    .filters
                    .as_ref()
                    .is_none_or(|filters| filters.matches(movie))
            })
            .collect();

        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as i64;
        let offset = usize::try_from(params.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(params.per_page as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn create(&self, movie: &NewMovie) -> DatabaseResult<Movie> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        let title = movie.title.to_lowercase();
        let collides = tables.movies.iter().any(|existing| {
            existing.is_alive()
                && existing.owner_id == movie.owner_id
                && existing.title.to_lowercase() == title
        });
        if collides {
            return Err(DatabaseError::Duplicate(format!(
                "title {:?} for owner {}",
                movie.title, movie.owner_id
            )));
        }

        let created = Movie {
            id: Uuid::new_v4(),
            owner_id: movie.owner_id,
            title: movie.title.clone(),
            original_title: movie.original_title.clone(),
            tagline: movie.tagline.clone(),
            overview: movie.overview.clone(),
            release_date: movie.release_date,
            runtime: movie.runtime,
            genres: movie.genres.clone(),
            poster_url: movie.poster_url.clone(),
            backdrop_url: movie.backdrop_url.clone(),
            trailer: movie.trailer.clone(),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            budget: movie.budget,
            revenue: movie.revenue,
            reminder_sent: movie.reminder_sent,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        tables.movies.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: &MovieChanges) -> DatabaseResult<Movie> {
        let mut tables = self.tables.write().await;
        let movie = tables
            .movies
            .iter_mut()
            .find(|movie| movie.id == id)
            .ok_or_else(not_found)?;

        changes.apply_to(movie);
        movie.updated_at = Utc::now();
        Ok(movie.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        let movie = tables
            .movies
            .iter_mut()
            .find(|movie| movie.id == id && movie.is_alive())
            .ok_or_else(not_found)?;

        let now = Utc::now();
        movie.deleted_at = Some(now);
        movie.updated_at = now;
        Ok(())
    }

    async fn distinct_genres(&self, owner_id: Uuid) -> DatabaseResult<Vec<String>> {
        let tables = self.tables.read().await;
        let mut genres: Vec<String> = tables
            .movies
            .iter()
            .filter(|movie| movie.is_alive() && movie.owner_id == owner_id)
            .flat_map(|movie| movie.genres.iter().cloned())
            .collect();
        genres.sort();
        genres.dedup();
        Ok(genres)
    }

    async fn find_due_for_reminder(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> DatabaseResult<Vec<DueReminder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .movies
            .iter()
            .filter(|movie| movie.is_alive() && !movie.reminder_sent)
            .filter_map(|movie| {
                let release_date = movie
                    .release_date
                    .filter(|released| (day_start..=day_end).contains(released))?;
                let owner = tables
                    .users
                    .get(&movie.owner_id)
                    .filter(|owner| !owner.email.is_empty())?;

                Some(DueReminder {
                    movie_id: movie.id,
                    owner_id: movie.owner_id,
                    title: movie.title.clone(),
                    release_date,
                    email: owner.email.clone(),
                })
            })
            .collect())
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(movie) = tables.movies.iter_mut().find(|movie| movie.id == id) {
            movie.reminder_sent = true;
        }
        Ok(())
    }
}
