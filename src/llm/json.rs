//! JSON extraction from free-form model output.
//!
//! Gemini inconsistently wraps structured output in markdown fences, sometimes
//! returns clean JSON, and sometimes mixes JSON with commentary. Extraction
//! never fails; whether the result decodes is left to the caller.

use std::sync::LazyLock;

use regex_lite::Regex;

/// ` ```json ` fence around a brace-delimited body (lazy, spans newlines).
static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("fenced JSON pattern is valid")
});

/// Extract the most plausible JSON object substring from a model response.
///
/// Tries, in order, first match wins:
/// 1. A ` ```json ... ``` ` fenced block; returns the braces and their content
/// 2. The whole input, unchanged, if it already parses as JSON
/// 3. The span from the first `{` to the last `}`
/// 4. The input with surrounding whitespace trimmed
///
/// Step 3 is greedy: with two independent objects in the text, e.g.
/// `{"a":1} junk {"b":2}`, it returns the whole span including the junk.
/// That result will not decode; the caller decides what to do with it.
pub fn extract_json(text: &str) -> String {
    if let Some(body) = FENCED_JSON.captures(text).and_then(|c| c.get(1)) {
        return body.as_str().to_string();
    }

    if serde_json::from_str::<serde_json::Value>(text).is_ok() {
        return text.to_string();
    }

    if let Some(span) = outer_brace_span(text) {
        return span.to_string();
    }

    text.trim().to_string()
}

/// First `{` through last `}`, when the closing brace comes after the opening one.
fn outer_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
