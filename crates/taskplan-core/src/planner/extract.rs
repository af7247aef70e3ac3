//! Recovery of a JSON array embedded in free-form model output.
//!
//! Generative models frequently wrap their reply in prose or a markdown code
//! fence despite being told not to. This module finds the first
//! syntactically balanced JSON array in such text without fully parsing it.

/// Extract the first balanced JSON array substring from `text`.
///
/// Handles a leading markdown fence (optionally tagged ` ```json `) and
/// arbitrary prose before the array. The bracket-depth walk tracks quoted
/// strings, so `[` or `]` inside a string value does not corrupt the count.
///
/// Returns `None` if no `[` exists or the array is unterminated.
pub fn extract_first_json_array(text: &str) -> Option<&str> {
    let cleaned = strip_code_fence(text);

    let start = cleaned.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in cleaned.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&cleaned[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Strip a surrounding markdown code fence, if present.
///
/// Removes the opening fence line (with an optional language tag) and
/// truncates at the last closing fence. Returns the trimmed inner text.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the remainder of the fence line (language tag such as "json").
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    let rest = match rest.rfind("```") {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    rest.trim()
}
