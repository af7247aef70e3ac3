//! Core goal-to-plan pipeline: prompt construction, provider client, tolerant
//! response parsing, and plan assembly/persistence.

pub mod planner;
