//! PostgreSQL movie store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{ListParams, MovieStore};
use crate::{
    filters::FilterSet,
    models::{DueReminder, Movie, MovieChanges, NewMovie},
};

const MOVIE_COLUMNS: &str = "movies.id, movies.owner_id, movies.title, movies.original_title, \
    movies.tagline, movies.overview, movies.release_date, movies.runtime, movies.genres, \
    movies.poster_url, movies.backdrop_url, movies.trailer, movies.vote_average, \
    movies.vote_count, movies.budget, movies.revenue, movies.reminder_sent, \
    movies.created_at, movies.updated_at, movies.deleted_at";

/// Predicate that keeps soft-deleted rows out of a read.
fn alive(table: &str) -> String {
    format!("{table}.deleted_at IS NULL")
}

/// Escape `ILIKE` wildcards so user text matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Owner scope, alive predicate and every supplied filter, ANDed.
fn push_scope(query: &mut QueryBuilder<'_, Postgres>, owner_id: Uuid, filters: Option<&FilterSet>) {
    query.push("movies.owner_id = ");
    query.push_bind(owner_id);
    query.push(" AND ");
    query.push(alive("movies"));

    let Some(filters) = filters else {
        return;
    };

    if let Some(term) = &filters.search {
        let pattern = format!("%{}%", escape_like(term));
        query.push(" AND (movies.title ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR movies.original_title ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    if let Some(min) = filters.duration_min {
        query.push(" AND movies.runtime >= ");
        query.push_bind(min);
    }

    if let Some(max) = filters.duration_max {
        query.push(" AND movies.runtime <= ");
        query.push_bind(max);
    }

    if let Some(start) = filters.released_start {
        query.push(" AND movies.release_date >= ");
        query.push_bind(start);
    }

    if let Some(end) = filters.released_end {
        query.push(" AND movies.release_date <= ");
        query.push_bind(end);
    }

    if !filters.genres.is_empty() {
        query.push(" AND movies.genres && ");
        query.push_bind(filters.genres.clone());
    }

    if let Some(vote) = filters.vote_min {
        query.push(" AND movies.vote_average >= ");
        query.push_bind(vote);
    }
}

/// Adds `column = $n` to a `SET` list when the change was supplied.
macro_rules! assign {
    ($set:ident, $column:literal, $value:expr) => {
        if let Some(value) = &$value {
            $set.push(concat!($column, " = "));
            $set.push_bind_unseparated(value.clone());
        }
    };
}

/// Movie store backed by PostgreSQL
#[derive(Clone)]
pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    /// Create a new movie store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn find_by_id(&self, id: Uuid, owner_id: Uuid) -> DatabaseResult<Option<Movie>> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE movies.id = $1 AND movies.owner_id = $2 AND {}",
            alive("movies")
        );

        sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn find_by_title(
        &self,
        title: &str,
        owner_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> DatabaseResult<Option<Movie>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE "));
        push_scope(&mut query, owner_id, None);
        query.push(" AND lower(movies.title) = lower(");
        query.push_bind(title.to_string());
        query.push(")");

        if let Some(exclude_id) = exclude_id {
            query.push(" AND movies.id <> ");
            query.push_bind(exclude_id);
        }

        query.push(" LIMIT 1");

        query
            .build_query_as::<Movie>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn list(&self, params: &ListParams) -> DatabaseResult<(Vec<Movie>, i64)> {
        let filters = params.filters.as_ref();

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE "));
        push_scope(&mut query, params.owner_id, filters);
        query.push(" ORDER BY movies.created_at DESC, movies.id DESC LIMIT ");
        query.push_bind(i64::from(params.per_page));
        query.push(" OFFSET ");
        query.push_bind(params.offset());

        let items = query
            .build_query_as::<Movie>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies WHERE ");
        push_scope(&mut count, params.owner_id, filters);

        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        debug!(
            owner_id = %params.owner_id,
            page = params.page,
            returned = items.len(),
            total,
            "Listed movies"
        );

        Ok((items, total))
    }

    async fn create(&self, movie: &NewMovie) -> DatabaseResult<Movie> {
        let sql = format!(
            r#"
            INSERT INTO movies (
                id, owner_id, title, original_title, tagline, overview, release_date,
                runtime, genres, poster_url, backdrop_url, trailer, vote_average,
                vote_count, budget, revenue, reminder_sent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {MOVIE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Movie>(&sql)
            .bind(Uuid::new_v4())
            .bind(movie.owner_id)
            .bind(&movie.title)
            .bind(&movie.original_title)
            .bind(&movie.tagline)
            .bind(&movie.overview)
            .bind(movie.release_date)
            .bind(movie.runtime)
            .bind(&movie.genres)
            .bind(&movie.poster_url)
            .bind(&movie.backdrop_url)
            .bind(&movie.trailer)
            .bind(movie.vote_average)
            .bind(movie.vote_count)
            .bind(movie.budget)
            .bind(movie.revenue)
            .bind(movie.reminder_sent)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn update(&self, id: Uuid, changes: &MovieChanges) -> DatabaseResult<Movie> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE movies SET ");
        {
            let mut set = query.separated(", ");
            assign!(set, "title", changes.title);
            assign!(set, "original_title", changes.original_title);
            assign!(set, "tagline", changes.tagline);
            assign!(set, "overview", changes.overview);
            assign!(set, "release_date", changes.release_date);
            assign!(set, "runtime", changes.runtime);
            assign!(set, "genres", changes.genres);
            assign!(set, "poster_url", changes.poster_url);
            assign!(set, "backdrop_url", changes.backdrop_url);
            assign!(set, "trailer", changes.trailer);
            assign!(set, "vote_average", changes.vote_average);
            assign!(set, "vote_count", changes.vote_count);
            assign!(set, "budget", changes.budget);
            assign!(set, "revenue", changes.revenue);
            assign!(set, "reminder_sent", changes.reminder_sent);
            set.push("updated_at = NOW()");
        }
        query.push(" WHERE movies.id = ");
        query.push_bind(id);
        query.push(" RETURNING ");
        query.push(MOVIE_COLUMNS);

        query
            .build_query_as::<Movie>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?
            .ok_or(DatabaseError::Query(sqlx::Error::RowNotFound))
    }

    async fn soft_delete(&self, id: Uuid) -> DatabaseResult<()> {
        let sql = format!(
            "UPDATE movies SET deleted_at = NOW(), updated_at = NOW() WHERE movies.id = $1 AND {}",
            alive("movies")
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::Query(sqlx::Error::RowNotFound));
        }

        Ok(())
    }

    async fn distinct_genres(&self, owner_id: Uuid) -> DatabaseResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT unnest(movies.genres) FROM movies WHERE movies.owner_id = $1 AND {}",
            alive("movies")
        );

        sqlx::query_scalar::<_, String>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn find_due_for_reminder(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> DatabaseResult<Vec<DueReminder>> {
        let sql = format!(
            r#"
            SELECT movies.id AS movie_id, movies.owner_id, movies.title, movies.release_date,
                   users.email
            FROM movies
            JOIN users ON users.id = movies.owner_id
            WHERE movies.release_date BETWEEN $1 AND $2
              AND movies.reminder_sent = FALSE
              AND {}
              AND users.email <> ''
            "#,
            alive("movies")
        );

        sqlx::query_as::<_, DueReminder>(&sql)
            .bind(day_start)
            .bind(day_end)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn mark_reminder_sent(&self, id: Uuid) -> DatabaseResult<()> {
        sqlx::query("UPDATE movies SET reminder_sent = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_real\\"), "100\\%\\_real\\\\");
        assert_eq!(escape_like("Amélie"), "Amélie");
    }

    #[test]
    fn scope_binds_every_filter() {
        let filters = FilterSet {
            search: Some("alien".to_string()),
            duration_min: Some(90),
            genres: vec!["horror".to_string()],
            vote_min: Some(7.0),
            ..Default::default()
        };

        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies WHERE ");
        push_scope(&mut query, Uuid::nil(), Some(&filters));

        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM movies WHERE movies.owner_id = $1 AND movies.deleted_at IS NULL \
             AND (movies.title ILIKE $2 OR movies.original_title ILIKE $3) \
             AND movies.runtime >= $4 AND movies.genres && $5 AND movies.vote_average >= $6"
        );
    }

    #[test]
    fn scope_without_filters_only_limits_owner_and_liveness() {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies WHERE ");
        push_scope(&mut query, Uuid::nil(), None);

        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM movies WHERE movies.owner_id = $1 AND movies.deleted_at IS NULL"
        );
    }

    /// Requires a running PostgreSQL with `DATABASE_URL` set
    #[tokio::test]
    #[ignore]
    async fn soft_deleted_rows_disappear_from_reads() {
        let config = common::database::DatabaseConfig::from_env().unwrap();
        let pool = common::database::init_pool(&config).await.unwrap();
        common::database::run_migrations(&pool).await.unwrap();

        let owner = crate::models::User::new(&format!("{}@example.com", Uuid::new_v4()), "Test");
        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash) VALUES ($1, $2, $3, 'x')",
        )
        .bind(owner.id)
        .bind(&owner.email)
        .bind(&owner.name)
        .execute(&pool)
        .await
        .unwrap();

        let store = PgMovieStore::new(pool);
        let movie = store
            .create(&crate::mapper::new_movie(
                owner.id,
                crate::models::MovieInput {
                    title: "Alien".to_string(),
                    genres: Some(vec!["Horror".to_string()]),
                    ..Default::default()
                },
            ))
            .await
            .unwrap();

        assert!(store.find_by_id(movie.id, owner.id).await.unwrap().is_some());
        assert_eq!(store.distinct_genres(owner.id).await.unwrap(), vec!["horror"]);

        store.soft_delete(movie.id).await.unwrap();

        assert!(store.find_by_id(movie.id, owner.id).await.unwrap().is_none());
        assert!(store.find_by_title("ALIEN", owner.id, None).await.unwrap().is_none());
        assert!(store.distinct_genres(owner.id).await.unwrap().is_empty());
    }
}
