//! Tolerant parsing of the provider's response envelope into task drafts.
//!
//! The generated content is unreliable free text, not a strict machine
//! interface: every navigation step degrades to an empty task list instead of
//! failing the request. The degradation reason is surfaced as a
//! [`ParseFailure`] and logged, so a provider regression stays observable.

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::warn;

use super::extract::extract_first_json_array;

/// A task as decoded from the model's JSON array, before it has an identity
/// or an owning plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskDraft {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub duration: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub dependencies: String,
}

/// Decode a string field, mapping both a missing field and an explicit
/// `null` to the empty string. Task fields are always-present strings.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reasons the provider response failed to yield any tasks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("empty provider response")]
    EmptyResponse,

    #[error("provider response is not valid JSON: {0}")]
    InvalidEnvelope(String),

    #[error("no candidates in provider response")]
    NoCandidates,

    #[error("no content parts in first candidate")]
    NoParts,

    #[error("empty text in first part")]
    EmptyText,

    #[error("no JSON array found in model output")]
    NoJsonArray,

    #[error("task array failed to decode: {0}")]
    TaskDecode(String),
}

/// Parse a raw provider response body into task drafts, or the reason none
/// could be recovered.
///
/// Navigates the envelope `candidates[0].content.parts[0].text`, extracts the
/// first JSON array from the generated text (falling back to the trimmed text
/// itself when it already starts with `[`), and decodes it.
pub fn try_parse_tasks(raw: &str) -> Result<Vec<TaskDraft>, ParseFailure> {
    if raw.trim().is_empty() {
        return Err(ParseFailure::EmptyResponse);
    }

    let root: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ParseFailure::InvalidEnvelope(e.to_string()))?;

    let candidates = root
        .get("candidates")
        .and_then(serde_json::Value::as_array)
        .filter(|c| !c.is_empty())
        .ok_or(ParseFailure::NoCandidates)?;

    let parts = candidates[0]
        .pointer("/content/parts")
        .and_then(serde_json::Value::as_array)
        .filter(|p| !p.is_empty())
        .ok_or(ParseFailure::NoParts)?;

    let text = parts[0]
        .get("text")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("");
    if text.is_empty() {
        return Err(ParseFailure::EmptyText);
    }

    let array = match extract_first_json_array(text) {
        Some(array) => array,
        None => {
            // The extractor can miss pathological input; if the text itself
            // is already a bare array, take it verbatim.
            let trimmed = text.trim();
            if trimmed.starts_with('[') {
                trimmed
            } else {
                return Err(ParseFailure::NoJsonArray);
            }
        }
    };

    serde_json::from_str::<Vec<TaskDraft>>(array)
        .map_err(|e| ParseFailure::TaskDecode(e.to_string()))
}

/// Parse a raw provider response into task drafts, degrading to an empty
/// list on any anomaly. Never fails.
pub fn parse_tasks(raw: &str) -> Vec<TaskDraft> {
    match try_parse_tasks(raw) {
        Ok(tasks) => tasks,
        Err(reason) => {
            warn!(%reason, "degrading malformed model output to empty task list");
            Vec::new()
        }
    }
}
