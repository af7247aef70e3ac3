//! Goal-to-plan pipeline: prompt building, provider call, tolerant parsing,
//! assembly, and the service layer that persists the result.

pub mod assemble;
pub mod extract;
pub mod parse;
pub mod prompt;
pub mod provider;
pub mod service;

pub use assemble::{NewPlan, assemble};
pub use extract::extract_first_json_array;
pub use parse::{ParseFailure, TaskDraft, parse_tasks, try_parse_tasks};
pub use prompt::build_prompt;
pub use provider::{GeminiClient, GeminiConfig, ProviderError, TextGenerator};
pub use service::{CreatePlanError, PlanWithTasks, create_plan_from_goal, get_plan_with_tasks};
