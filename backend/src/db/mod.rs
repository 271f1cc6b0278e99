//! Database connection and start-up preparation

pub mod schema_sync;
pub mod seed;

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, warn};

use crate::orm::EntityRegistry;

pub use schema_sync::{SchemaSyncResult, sync_all_entity_schemas};
pub use seed::{SeedResult, run_seeds};

/// Create the SQLite connection pool.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    if let Some(path) = url
        .strip_prefix("sqlite:")
        .map(|p| p.trim_start_matches("//"))
        .and_then(|p| p.split('?').next())
        .filter(|p| !p.is_empty() && !p.starts_with(':'))
        && let Some(parent) = std::path::Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(url)
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;

    Ok(pool)
}

/// Single-connection in-memory database, used by tests.
///
/// The connection is never recycled; dropping it would drop the database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("Failed to open in-memory database")?;
    Ok(pool)
}

/// Create or extend every registered table, then optionally seed.
pub async fn prepare(pool: &SqlitePool, registry: &EntityRegistry, seed: bool) -> Result<()> {
    let sync = sync_all_entity_schemas(pool, registry).await;
    if !sync.tables_created.is_empty() || !sync.columns_added.is_empty() {
        info!(
            tables_created = ?sync.tables_created,
            columns_added = ?sync.columns_added,
            "Schema synchronized"
        );
    }
    if !sync.errors.is_empty() {
        for error in &sync.errors {
            warn!(error = %error, "Schema sync error");
        }
        anyhow::bail!("Schema sync failed with {} error(s)", sync.errors.len());
    }

    if seed {
        let seeded = run_seeds(pool).await;
        for error in &seeded.errors {
            warn!(error = %error, "Seed error");
        }
        if !seeded.tables_seeded.is_empty() {
            info!(tables = ?seeded.tables_seeded, "Seed data inserted");
        }
    }

    Ok(())
}
