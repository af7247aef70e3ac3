use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/taskplan-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Create a connection pool with sensible defaults.
///
/// Creates the database file (and its parent directory) if missing, and
/// enables foreign-key enforcement so `ON DELETE CASCADE` applies.
pub async fn create_pool(config: &DbConfig) -> Result<SqlitePool> {
    ensure_parent_dir(&config.database_url)?;

    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("invalid database URL: {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database at {}", config.database_url))?;
    Ok(pool)
}

/// Run all pending embedded migrations against the pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    info!("migrations applied successfully");
    Ok(())
}

/// Return the row count for the `plans` and `tasks` tables.
///
/// Useful for the `taskplan db-init` success message.
pub async fn table_counts(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let mut counts = Vec::with_capacity(2);
    for table in ["plans", "tasks"] {
        // Table names are fixed identifiers, safe to format in.
        let query = format!("SELECT COUNT(*) FROM {table}");
        let count: (i64,) = sqlx::query_as(&query)
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to count rows in {table}"))?;
        counts.push((table.to_string(), count.0));
    }
    Ok(counts)
}

/// Create the parent directory of a file-backed store if it does not exist.
fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let path = database_url
        .strip_prefix("sqlite://")
        .unwrap_or(database_url);
    if path.starts_with(':') || path.contains("mode=memory") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_creates_file_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("t.db").display());
        let pool = create_pool(&DbConfig::new(url)).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let counts = table_counts(&pool).await.unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|(_, n)| *n == 0));
        pool.close().await;
    }

    #[tokio::test]
    async fn pool_creates_missing_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("nested/deep/t.db").display());
        let pool = create_pool(&DbConfig::new(url)).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool.close().await;
    }
}
