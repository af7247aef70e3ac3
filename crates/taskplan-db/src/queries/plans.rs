//! Database query functions for the `plans` table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::models::Plan;

/// Insert a new plan row with a freshly generated id.
///
/// SQLite has no server-side id or timestamp generation, so both are supplied
/// by the caller's side: the id here, the timestamp by the plan assembler.
/// Takes any executor so it can run inside an aggregate transaction.
pub async fn insert_plan<'e>(
    executor: impl SqliteExecutor<'e>,
    goal: &str,
    created_at: DateTime<Utc>,
) -> Result<Plan> {
    let plan = sqlx::query_as::<_, Plan>(
        "INSERT INTO plans (id, goal, created_at) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(goal)
    .bind(created_at)
    .fetch_one(executor)
    .await
    .context("failed to insert plan")?;

    Ok(plan)
}

/// Fetch a plan by its ID.
pub async fn get_plan(pool: &SqlitePool, id: Uuid) -> Result<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan")?;

    Ok(plan)
}

/// List all plans, ordered by creation time (newest first).
pub async fn list_plans(pool: &SqlitePool) -> Result<Vec<Plan>> {
    let plans = sqlx::query_as::<_, Plan>("SELECT * FROM plans ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .context("failed to list plans")?;

    Ok(plans)
}

/// Delete a plan. Tasks cascade via the foreign key.
///
/// Returns `true` if a row was deleted, `false` if the plan did not exist.
pub async fn delete_plan(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete plan")?;

    Ok(result.rows_affected() > 0)
}
