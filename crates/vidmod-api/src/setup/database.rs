//! Database setup and initialization

use crate::state::DbState;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vidmod_core::Config;
use vidmod_db::{
    InMemoryJobRepository, InMemoryOrganizationRepository, InMemoryUserRepository,
    InMemoryVideoRepository, PostgresJobRepository, PostgresOrganizationRepository,
    PostgresUserRepository, PostgresVideoRepository,
};

/// Postgres-backed repositories when `DATABASE_URL` is set, in-memory ones otherwise.
pub async fn setup_database(config: &Config) -> Result<DbState> {
    match config.database_url() {
        Some(url) => {
            let pool = connect(config, url).await?;
            Ok(postgres_state(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory repositories; data is lost on restart");
            Ok(in_memory_state())
        }
    }
}

/// Connect and run pending migrations
async fn connect(config: &Config, url: &str) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    // Workspace migrations/ relative to this crate
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

pub fn postgres_state(pool: PgPool) -> DbState {
    DbState {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        videos: Arc::new(PostgresVideoRepository::new(pool.clone())),
        organizations: Arc::new(PostgresOrganizationRepository::new(pool.clone())),
        jobs: Arc::new(PostgresJobRepository::new(pool.clone())),
        pool: Some(pool),
    }
}

pub fn in_memory_state() -> DbState {
    DbState {
        pool: None,
        users: Arc::new(InMemoryUserRepository::new()),
        videos: Arc::new(InMemoryVideoRepository::new()),
        organizations: Arc::new(InMemoryOrganizationRepository::new()),
        jobs: Arc::new(InMemoryJobRepository::new()),
    }
}
