//! Reasoning Output Parser
//!
//! Extracts `GraphSuggestions` from free-form tool output. Extraction is
//! lenient about where the JSON sits but strict about the JSON itself:
//!
//! 1. The first fenced ```` ```json ```` block, if present
//! 2. Otherwise the span from the first `{` to the last `}` of the trimmed output
//! 3. Otherwise an empty result
//!
//! A candidate that is not valid JSON is a `ReasoningError::Parse`.
//!
//! The CLI's JSON output mode wraps the model answer in an envelope object
//! whose `result` field holds the answer text. Such envelopes are unwrapped
//! and the inner text is parsed with the same rules.

use crate::models::GraphSuggestions;
use crate::services::error::ReasoningError;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Maximum nesting of CLI envelopes unwrapped before parsing
const MAX_ENVELOPE_DEPTH: usize = 4;

/// First fenced json block; the capture is the block body
const FENCED_JSON_PATTERN: &str = r"(?s)```json\s*\n(.*?)\n\s*```";

/// Parse raw tool output into graph suggestions
///
/// Returns an empty `GraphSuggestions` when no JSON candidate is found.
pub fn parse_reasoning_output(output: &str) -> Result<GraphSuggestions, ReasoningError> {
    parse_with_depth(output, 0)
}

fn parse_with_depth(output: &str, depth: usize) -> Result<GraphSuggestions, ReasoningError> {
    let Some(candidate) = extract_json_candidate(output) else {
        tracing::debug!("No JSON found in reasoning output ({} bytes)", output.len());
        return Ok(GraphSuggestions::default());
    };

    let value: Value = serde_json::from_str(candidate)?;

    if depth < MAX_ENVELOPE_DEPTH {
        if let Some(inner) = envelope_result(&value) {
            return parse_with_depth(inner, depth + 1);
        }
    }

    Ok(serde_json::from_value(value)?)
}

/// Locate the JSON text inside the output, without validating it
fn extract_json_candidate(output: &str) -> Option<&str> {
    static FENCED_REGEX: OnceLock<Regex> = OnceLock::new();
    let fenced_regex = FENCED_REGEX.get_or_init(|| Regex::new(FENCED_JSON_PATTERN).unwrap());

    if let Some(captures) = fenced_regex.captures(output) {
        return captures.get(1).map(|m| m.as_str());
    }

    let trimmed = output.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

/// The answer text of a CLI envelope, when `value` is one
fn envelope_result(value: &Value) -> Option<&str> {
    let object = value.as_object()?;
    if object.contains_key("nodes") {
        return None;
    }
    object.get("result")?.as_str()
}
