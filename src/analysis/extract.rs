use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::result::{AnalysisResult, ErrorRecord};

/// Error marker for replies that no strategy could parse.
pub const PARSE_FAILURE: &str = "JSON parse failure";

/// Characters of the raw reply kept in a parse-failure record.
const RAW_RESPONSE_LIMIT: usize = 500;

/// First ```json fenced block; group 1 is the trimmed body.
static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("fenced pattern is valid"));

/// Greedy span from the first `{` to the last `}`.
///
/// Known brittleness: when the reply contains several objects, or stray braces
/// after the payload, the span covers all of them and usually fails to parse.
static BRACE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("brace pattern is valid"));

/// A named way of turning free-form text into JSON.
pub struct Strategy<T> {
    pub name: &'static str,
    pub attempt: fn(&str) -> Option<T>,
}

/// Runs strategies in order and returns the first success with its name.
///
/// Every strategy sees the original input; later ones are not tried once one succeeds.
pub fn first_success<T>(input: &str, strategies: &[Strategy<T>]) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|s| (s.attempt)(input).map(|value| (s.name, value)))
}

fn parse_direct(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_fenced_block(text: &str) -> Option<Value> {
    let caps = FENCED_JSON.captures(text)?;
    serde_json::from_str(caps.get(1)?.as_str()).ok()
}

fn parse_brace_span(text: &str) -> Option<Value> {
    let span = BRACE_SPAN.find(text)?;
    serde_json::from_str(span.as_str()).ok()
}

/// Extraction order for model replies.
pub const STRATEGIES: [Strategy<Value>; 3] = [
    Strategy { name: "direct", attempt: parse_direct },
    Strategy { name: "fenced", attempt: parse_fenced_block },
    Strategy { name: "brace-span", attempt: parse_brace_span },
];

/// Truncates to the first 500 characters, appending "..." only when something was cut.
pub fn truncate_raw_response(text: &str) -> String {
    match text.char_indices().nth(RAW_RESPONSE_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Extracts JSON from a model reply.
///
/// Tries, in order: the whole text, the first ```json fenced block, and the
/// span from the first `{` to the last `}`. Any syntactically valid JSON is
/// accepted; the section schema is not checked. If nothing parses, returns a
/// parse-failure record holding a truncated copy of the reply.
pub fn extract_json(response_text: &str) -> AnalysisResult {
    match first_success(response_text, &STRATEGIES) {
        Some((strategy, value)) => {
            if strategy != "direct" {
                crate::log(&format!("Extracted JSON using {} strategy", strategy));
            }
            AnalysisResult::Parsed(value)
        }
        None => {
            crate::log(&format!(
                "No JSON found in response ({} chars)",
                response_text.chars().count()
            ));
            AnalysisResult::Failed(ErrorRecord {
                error: PARSE_FAILURE.to_string(),
                raw_response: Some(truncate_raw_response(response_text)),
            })
        }
    }
}
