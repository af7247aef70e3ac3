//! Database query functions for the `tasks` table.

use anyhow::{Context, Result};
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::models::Task;

/// Insert a task row for an existing plan.
///
/// `position` fixes the task's place within the plan's ordered collection.
/// Takes any executor so it can run inside an aggregate transaction.
pub async fn insert_task<'e>(
    executor: impl SqliteExecutor<'e>,
    plan_id: Uuid,
    position: i64,
    description: &str,
    duration: &str,
    dependencies: &str,
) -> Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (id, plan_id, position, description, duration, dependencies) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(plan_id)
    .bind(position)
    .bind(description)
    .bind(duration)
    .bind(dependencies)
    .fetch_one(executor)
    .await
    .context("failed to insert task")?;

    Ok(task)
}

/// List a plan's tasks in their stored order.
pub async fn list_tasks_for_plan(pool: &SqlitePool, plan_id: Uuid) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks WHERE plan_id = $1 ORDER BY position",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list tasks for plan")?;

    Ok(tasks)
}

/// Count tasks belonging to a plan.
pub async fn count_tasks_for_plan(pool: &SqlitePool, plan_id: Uuid) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE plan_id = $1")
        .bind(plan_id)
        .fetch_one(pool)
        .await
        .context("failed to count tasks for plan")?;

    Ok(count.0)
}
