//! Prompt construction for goal decomposition.
//!
//! Pure string assembly; escaping for transport is the provider client's
//! concern, so the goal is embedded verbatim.

/// Expected shape of each task object in the model's reply.
const TASK_SCHEMA_LINE: &str =
    r#"{"description":"string","duration":"string","dependencies":"string or empty"}"#;

/// Build the instruction prompt for decomposing `goal` into tasks.
///
/// The prompt is kept explicit so the model returns clean JSON: a
/// role-setting sentence, the goal quoted back, the task object schema, and a
/// directive to return only a JSON array with no prose or markdown fencing.
pub fn build_prompt(goal: &str) -> String {
    format!(
        "You are a task planning assistant.\n\
         Break down this goal into actionable tasks with an estimated duration \
         and dependencies (which tasks must be done first).\n\
         Goal: \"{goal}\"\n\n\
         Return ONLY a valid JSON array (no prose, no markdown), where each object has:\n\
         {TASK_SCHEMA_LINE}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_goal_verbatim() {
        let prompt = build_prompt("Bake a cake");
        assert!(prompt.contains("Goal: \"Bake a cake\""));
    }

    #[test]
    fn prompt_names_all_three_fields() {
        let prompt = build_prompt("anything");
        assert!(prompt.contains("description"));
        assert!(prompt.contains("duration"));
        assert!(prompt.contains("dependencies"));
    }

    #[test]
    fn prompt_forbids_prose_and_markdown() {
        let prompt = build_prompt("anything");
        assert!(prompt.contains("ONLY a valid JSON array"));
        assert!(prompt.contains("no prose, no markdown"));
    }

    #[test]
    fn empty_goal_is_accepted() {
        let prompt = build_prompt("");
        assert!(prompt.contains("Goal: \"\""));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt("same goal"), build_prompt("same goal"));
    }

    #[test]
    fn goal_with_quotes_is_embedded_verbatim() {
        // Escaping is the provider client's job, not the builder's.
        let prompt = build_prompt(r#"say "hi""#);
        assert!(prompt.contains(r#"Goal: "say "hi"""#));
    }
}
