//! Plan assembly: wrap a goal and its parsed tasks into an aggregate ready
//! for persistence.

use chrono::{DateTime, Utc};

use super::parse::TaskDraft;

/// A fully assembled plan that has not been persisted yet.
///
/// The plan owns its tasks as an ordered collection; tasks carry no stored
/// back-pointer. The persistence layer stamps ids and the `plan_id` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlan {
    pub goal: String,
    /// Assembly time, UTC.
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<TaskDraft>,
}

/// Assemble a plan aggregate from a goal and its task drafts.
///
/// Stamps the creation time with `Utc::now()`. No validation: an empty task
/// list is a legal (if unhelpful) plan.
pub fn assemble(goal: &str, tasks: Vec<TaskDraft>) -> NewPlan {
    NewPlan {
        goal: goal.to_string(),
        created_at: Utc::now(),
        tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(description: &str) -> TaskDraft {
        TaskDraft {
            description: description.to_string(),
            duration: "1h".to_string(),
            dependencies: String::new(),
        }
    }

    #[test]
    fn assemble_keeps_goal_and_task_order() {
        let plan = assemble("Bake a cake", vec![draft("Preheat oven"), draft("Mix batter")]);
        assert_eq!(plan.goal, "Bake a cake");
        assert_eq!(plan.tasks[0].description, "Preheat oven");
        assert_eq!(plan.tasks[1].description, "Mix batter");
    }

    #[test]
    fn assemble_stamps_a_recent_utc_timestamp() {
        let before = Utc::now();
        let plan = assemble("goal", vec![]);
        let after = Utc::now();
        assert!(plan.created_at >= before && plan.created_at <= after);
    }

    #[test]
    fn empty_task_list_is_legal() {
        let plan = assemble("goal with no tasks", vec![]);
        assert!(plan.tasks.is_empty());
    }
}
