//! Operator CLI handlers for `taskplan plan` subcommands.
//!
//! Implements:
//! - `taskplan plan new <goal>`     -- decompose a goal and persist the plan
//! - `taskplan plan show [plan-id]` -- show plan details or list all plans
//! - `taskplan plan delete <plan-id>` -- delete a plan (tasks cascade)

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use taskplan_core::planner::{PlanWithTasks, TextGenerator, create_plan_from_goal, get_plan_with_tasks};
use taskplan_db::queries::plans as plan_queries;

use crate::PlanCommands;

/// Dispatch a `PlanCommands` variant to the appropriate handler.
///
/// `provider` is only required for `plan new`; read-only commands pass `None`.
pub async fn run_plan_command(
    command: PlanCommands,
    pool: &SqlitePool,
    provider: Option<&dyn TextGenerator>,
) -> Result<()> {
    match command {
        PlanCommands::New { goal } => {
            let provider = provider.context("plan new requires a configured provider")?;
            cmd_new(pool, provider, &goal).await
        }
        PlanCommands::Show { plan_id } => match plan_id {
            Some(id) => cmd_show_one(pool, &id).await,
            None => cmd_show_all(pool).await,
        },
        PlanCommands::Delete { plan_id } => cmd_delete(pool, &plan_id).await,
    }
}

// -----------------------------------------------------------------------
// taskplan plan new <goal>
// -----------------------------------------------------------------------

async fn cmd_new(pool: &SqlitePool, provider: &dyn TextGenerator, goal: &str) -> Result<()> {
    let created = create_plan_from_goal(pool, provider, goal)
        .await
        .context("failed to create plan")?;

    println!("Plan created successfully.");
    println!();
    print_plan(&created);

    if created.tasks.is_empty() {
        println!();
        println!("The model reply yielded no tasks; the plan was stored empty.");
    }

    Ok(())
}

// -----------------------------------------------------------------------
// taskplan plan show [plan-id]
// -----------------------------------------------------------------------

async fn cmd_show_one(pool: &SqlitePool, plan_id: &str) -> Result<()> {
    let id = Uuid::parse_str(plan_id).with_context(|| format!("invalid plan ID: {plan_id}"))?;

    let plan = get_plan_with_tasks(pool, id)
        .await?
        .with_context(|| format!("plan {plan_id} not found"))?;

    print_plan(&plan);
    Ok(())
}

async fn cmd_show_all(pool: &SqlitePool) -> Result<()> {
    let plans = plan_queries::list_plans(pool).await?;

    if plans.is_empty() {
        println!("No plans found.");
        return Ok(());
    }

    for plan in &plans {
        println!(
            "{}  {}  {}",
            plan.id,
            plan.created_at.format("%Y-%m-%d %H:%M UTC"),
            plan.goal
        );
    }
    Ok(())
}

// -----------------------------------------------------------------------
// taskplan plan delete <plan-id>
// -----------------------------------------------------------------------

async fn cmd_delete(pool: &SqlitePool, plan_id: &str) -> Result<()> {
    let id = Uuid::parse_str(plan_id).with_context(|| format!("invalid plan ID: {plan_id}"))?;

    let deleted = plan_queries::delete_plan(pool, id).await?;
    if deleted {
        println!("Plan {plan_id} deleted.");
    } else {
        anyhow::bail!("plan {plan_id} not found");
    }
    Ok(())
}

// -----------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------

fn print_plan(plan: &PlanWithTasks) {
    println!("  Plan ID:  {}", plan.plan.id);
    println!("  Goal:     {}", plan.plan.goal);
    println!(
        "  Created:  {}",
        plan.plan.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Tasks:    {}", plan.tasks.len());

    for (i, task) in plan.tasks.iter().enumerate() {
        println!();
        println!("    {}. {} ({})", i + 1, task.description, task.duration);
        if task.dependencies.is_empty() {
            println!("       depends on: -");
        } else {
            println!("       depends on: {}", task.dependencies);
        }
    }
}
