//! Overall-score extraction
//!
//! A heuristic, order-dependent, first-match token scan over the free-form
//! reviewer output. The exact acceptance predicate is load-bearing for
//! output compatibility: first whitespace-delimited token that contains
//! "/10" or is a bare numeral, with a "/10" suffix stripped before
//! parsing, accepted when the value falls in (0, 10]. Known-fragile by
//! design (e.g. "8.5 out of 10" matches "8.5" only because it comes
//! first); do not tighten it.

use serde_json::Value as JsonValue;

/// Returned when no token qualifies.
pub const DEFAULT_SCORE: f64 = 7.5;

/// Extract a single numeric score from arbitrary reviewer output.
///
/// Lists are joined element-wise, maps as `key: value` pairs; the first
/// qualifying token wins. Result is rounded to 2 decimal places.
pub fn extract_score(value: &JsonValue) -> f64 {
    let text = flatten(value);
    for token in text.split_whitespace() {
        if !token.contains("/10") && !is_bare_numeral(token) {
            continue;
        }
        let stripped = token.strip_suffix("/10").unwrap_or(token);
        if let Ok(val) = stripped.parse::<f64>() {
            if val > 0.0 && val <= 10.0 {
                return (val * 100.0).round() / 100.0;
            }
        }
    }
    DEFAULT_SCORE
}

/// Flatten text/list/map output to a single string.
fn flatten(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(flatten)
            .collect::<Vec<_>>()
            .join(" "),
        JsonValue::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, flatten(v)))
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

/// Digits with at most one dot.
fn is_bare_numeral(token: &str) -> bool {
    let replaced = token.replacen('.', "", 1);
    !replaced.is_empty() && replaced.chars().all(|c| c.is_ascii_digit())
}
