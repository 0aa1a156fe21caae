//! Pool construction and schema migrations

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tender_core::Config;

/// Schema files shared by the workspace, relative to this crate.
fn migrations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations")
}

/// Connect to PostgreSQL and bring the schema up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = connect(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn connect(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .connect(config.database_url())
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database ({} environment)",
                config.environment()
            )
        })?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        acquire_timeout_secs = config.db_timeout_seconds(),
        "Database pool ready"
    );
    Ok(pool)
}

async fn run_migrations(pool: &PgPool) -> Result<()> {
    let dir = migrations_dir();
    let migrator = Migrator::new(dir.clone())
        .await
        .with_context(|| format!("Failed to load migrations from {}", dir.display()))?;
    let known = migrator.iter().count();

    migrator
        .run(pool)
        .await
        .context("Failed to apply tender schema migrations")?;

    tracing::info!(migrations = known, "Tender schema up to date");
    Ok(())
}
