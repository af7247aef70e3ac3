//! Shared test utilities for taskplan integration tests.
//!
//! Each test gets its own temporary SQLite database file with migrations
//! applied. The returned [`TempDir`] must be kept alive for the duration of
//! the test; dropping it removes the database file.

use sqlx::SqlitePool;
use tempfile::TempDir;

use taskplan_db::config::DbConfig;
use taskplan_db::pool;

/// Create a temporary database with migrations applied.
///
/// Returns `(pool, dir)`. The pool connects to a database file inside `dir`.
pub async fn create_test_db() -> (SqlitePool, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());

    let pool = pool::create_pool(&DbConfig::new(url))
        .await
        .expect("failed to open test database");
    pool::run_migrations(&pool)
        .await
        .expect("migrations should succeed");

    (pool, dir)
}
