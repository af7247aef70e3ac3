use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A plan -- one submitted goal plus its decomposed tasks.
///
/// `created_at` is stamped by the assembler at plan-assembly time (UTC), not
/// by the store.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub goal: String,
    pub created_at: DateTime<Utc>,
}

/// A task -- one actionable step within a plan.
///
/// `plan_id` is the owning plan; it is excluded from outward serialization so
/// the plan/task aggregate never renders as a cycle. `position` preserves the
/// order the model produced the tasks in.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub plan_id: Uuid,
    #[serde(skip_serializing)]
    pub position: i64,
    pub description: String,
    pub duration: String,
    pub dependencies: String,
}
