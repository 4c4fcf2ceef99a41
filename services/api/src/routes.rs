//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{
        OriginalUri, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use catalog::models::{MovieInput, MoviePatch};
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::ListMoviesQuery,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/filter/*segments", get(list_movies_by_segments))
        .route(
            "/movies/:id",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
        .route("/genres", get(list_genres))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

fn bad_query(rejection: QueryRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// Anything that is not a movie id cannot name a movie.
fn movie_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::NotFound("Movie not found".to_string()))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "movie-catalog-api"
    }))
}

/// List movies, filter given as an embedded query string
pub async fn list_movies(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListMoviesQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query.map_err(bad_query)?;
    let page = state.catalog.list(user.id, query.into_list_query()).await?;
    Ok(Json(page))
}

const FILTER_PREFIX: &str = "/movies/filter/";

/// List movies, filter given as path segments
///
/// Segments are read from the raw request path so each one is decoded once,
/// by the filter parser.
pub async fn list_movies_by_segments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<ListMoviesQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query.map_err(bad_query)?;
    let segments = uri.path().strip_prefix(FILTER_PREFIX).unwrap_or_default();
    let page = state
        .catalog
        .list(user.id, query.into_segment_query(segments))
        .await?;
    Ok(Json(page))
}

/// Get a movie by ID
pub async fn get_movie(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let movie = state.catalog.get(movie_id(path)?, user.id).await?;
    Ok(Json(movie))
}

/// Create a movie
pub async fn create_movie(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload.map_err(bad_body)?;
    let movie = state.catalog.create(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Update the supplied fields of a movie
pub async fn update_movie(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<MoviePatch>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = movie_id(path)?;
    let Json(patch) = payload.map_err(bad_body)?;
    let movie = state.catalog.update(id, user.id, patch).await?;
    Ok(Json(movie))
}

/// Soft-delete a movie
pub async fn delete_movie(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    state.catalog.delete(movie_id(path)?, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Distinct genres of the caller's movies
pub async fn list_genres(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let genres = state.catalog.genres(user.id).await?;
    Ok(Json(genres))
}
