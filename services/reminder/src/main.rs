use std::sync::Arc;

use anyhow::Result;
use catalog::PgMovieStore;
use common::{
    clock::SystemClock,
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use reminder::{EmailConfig, ReminderJob, ReminderScheduler, ReminderSettings, ResendEmailSender};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting reminder service");

    let settings = ReminderSettings::from_env()?;
    let email_config = EmailConfig::from_env()?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if !health_check(&pool).await? {
        anyhow::bail!("Failed to connect to database");
    }
    run_migrations(&pool).await?;

    let job = ReminderJob::new(
        Arc::new(PgMovieStore::new(pool)),
        Arc::new(ResendEmailSender::new(email_config)),
        Arc::new(SystemClock),
        settings.send_timeout(),
    );

    let scheduler = ReminderScheduler::new(job, settings.schedule);
    scheduler.start().await?;

    info!("Reminder service started successfully");

    // Keep the service running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down reminder service");

    Ok(())
}
