//! Plan service layer.
//!
//! Runs the full pipeline for one request -- build prompt, call provider,
//! parse, assemble -- then persists the aggregate (plan row plus task rows)
//! within a single database transaction.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use taskplan_db::models::{Plan, Task};
use taskplan_db::queries::{plans as plan_queries, tasks as task_queries};

use super::assemble::{NewPlan, assemble};
use super::parse::parse_tasks;
use super::prompt::build_prompt;
use super::provider::{ProviderError, TextGenerator};

/// A plan together with its ordered tasks, as served to API and CLI
/// consumers.
#[derive(Debug, Clone, Serialize)]
pub struct PlanWithTasks {
    #[serde(flatten)]
    pub plan: Plan,
    pub tasks: Vec<Task>,
}

/// Failures that abort plan creation.
///
/// Malformed model *output* is not represented here: it degrades to a plan
/// with zero tasks and creation still succeeds.
#[derive(Debug, Error)]
pub enum CreatePlanError {
    /// The provider call itself failed; visible and retriable by the caller.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The plan could not be stored.
    #[error("failed to store plan: {0:#}")]
    Store(anyhow::Error),
}

/// Run the goal-to-plan pipeline and persist the result.
///
/// Provider failures propagate; anything wrong with the generated content
/// degrades to an empty task list, so once the provider call succeeds a plan
/// record always exists.
pub async fn create_plan_from_goal(
    pool: &SqlitePool,
    provider: &dyn TextGenerator,
    goal: &str,
) -> Result<PlanWithTasks, CreatePlanError> {
    let prompt = build_prompt(goal);
    let raw = provider.generate(&prompt).await?;
    let drafts = parse_tasks(&raw);
    let new_plan = assemble(goal, drafts);

    let stored = store_plan(pool, &new_plan)
        .await
        .map_err(CreatePlanError::Store)?;
    info!(
        plan_id = %stored.plan.id,
        tasks = stored.tasks.len(),
        "plan created"
    );
    Ok(stored)
}

/// Insert a plan and all its tasks inside a single transaction.
///
/// If any insert fails the whole aggregate is rolled back; a plan is never
/// persisted with a partial task list.
async fn store_plan(pool: &SqlitePool, new_plan: &NewPlan) -> Result<PlanWithTasks> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let plan = plan_queries::insert_plan(&mut *tx, &new_plan.goal, new_plan.created_at).await?;

    let mut tasks = Vec::with_capacity(new_plan.tasks.len());
    for (position, draft) in new_plan.tasks.iter().enumerate() {
        let task = task_queries::insert_task(
            &mut *tx,
            plan.id,
            position as i64,
            &draft.description,
            &draft.duration,
            &draft.dependencies,
        )
        .await?;
        tasks.push(task);
    }

    tx.commit().await.context("failed to commit plan")?;

    Ok(PlanWithTasks { plan, tasks })
}

/// Fetch a plan and its tasks by id. Returns `None` if the plan is absent.
pub async fn get_plan_with_tasks(pool: &SqlitePool, id: Uuid) -> Result<Option<PlanWithTasks>> {
    let Some(plan) = plan_queries::get_plan(pool, id).await? else {
        return Ok(None);
    };
    let tasks = task_queries::list_tasks_for_plan(pool, id)
        .await
        .with_context(|| format!("failed to load tasks for plan {id}"))?;
    Ok(Some(PlanWithTasks { plan, tasks }))
}
