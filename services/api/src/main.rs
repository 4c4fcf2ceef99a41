use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod models;
mod routes;
mod settings;
mod state;

use catalog::{CatalogService, PgMovieStore};
use common::{
    clock::SystemClock,
    database::{DatabaseConfig, init_pool, run_migrations},
};
use tokio::net::TcpListener;

use crate::{settings::ApiSettings, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting movie catalog API");

    let settings = ApiSettings::from_env()?;
    let decoding_key = middleware::load_decoding_key().map_err(anyhow::Error::msg)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let catalog = CatalogService::new(
        Arc::new(PgMovieStore::new(pool)),
        Arc::new(SystemClock),
    );

    let app_state = AppState {
        catalog,
        decoding_key: Arc::new(decoding_key),
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("API service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
