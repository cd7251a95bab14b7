//! Report composition
//!
//! Turns the ordered suggestion list into rendering-ready sections:
//! a fixed header lookup per suggestion kind (title-cased fallback for
//! kinds without an entry), with fenced code excerpts extracted from the
//! body so both render modes share one composition pass.

pub mod pdf;
pub mod score;

pub use pdf::{PdfRenderer, RenderMode};
pub use score::{extract_score, DEFAULT_SCORE};

use crate::models::{Suggestion, SuggestionKind};
use regex::Regex;
use std::sync::OnceLock;

/// A rendering-ready grouping: one suggestion under a titled heading with
/// extracted code blocks. Derived, not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub header: String,
    pub file: String,
    pub line: u32,
    pub message: String,
    pub body: String,
    pub code_blocks: Vec<String>,
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:python)?(.*?)```").expect("valid fence regex"))
}

/// Section header for a suggestion kind. Kinds without a fixed entry get
/// a title-cased generic header, never a failure.
pub fn section_header(kind: SuggestionKind) -> String {
    match kind {
        SuggestionKind::Static => "Static Analysis Findings".to_string(),
        SuggestionKind::Review => "AI Code Review & Recommendations".to_string(),
        SuggestionKind::Summary => "Final Summary & Health Score".to_string(),
        other => title_case(other.as_str()),
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Section".to_string(),
    }
}

/// Extract fenced code excerpts from a suggestion body. Returns the body
/// with fences removed, and the trimmed excerpt list.
pub fn extract_code_blocks(text: &str) -> (String, Vec<String>) {
    let blocks: Vec<String> = fence_regex()
        .captures_iter(text)
        .filter_map(|cap| {
            let block = cap.get(1)?.as_str().trim();
            (!block.is_empty()).then(|| block.to_string())
        })
        .collect();
    let clean = fence_regex().replace_all(text, "").trim().to_string();
    (clean, blocks)
}

/// Map suggestions into sections, preserving order as-given.
pub fn compose_sections(suggestions: &[Suggestion]) -> Vec<Section> {
    suggestions
        .iter()
        .map(|s| {
            let (body, code_blocks) = extract_code_blocks(&s.suggestion);
            Section {
                header: section_header(s.kind),
                file: s.file.clone(),
                line: s.line,
                message: s.message.clone(),
                body,
                code_blocks,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(kind: SuggestionKind, text: &str) -> Suggestion {
        Suggestion {
            kind,
            file: "app.py".to_string(),
            line: 3,
            message: "msg".to_string(),
            suggestion: text.to_string(),
        }
    }

    #[test]
    fn test_fixed_headers() {
        assert_eq!(
            section_header(SuggestionKind::Static),
            "Static Analysis Findings"
        );
        assert_eq!(
            section_header(SuggestionKind::Review),
            "AI Code Review & Recommendations"
        );
        assert_eq!(
            section_header(SuggestionKind::Summary),
            "Final Summary & Health Score"
        );
    }

    #[test]
    fn test_fallback_headers_are_title_cased() {
        assert_eq!(section_header(SuggestionKind::Pylint), "Pylint");
        assert_eq!(section_header(SuggestionKind::Bandit), "Bandit");
        assert_eq!(section_header(SuggestionKind::Radon), "Radon");
    }

    #[test]
    fn test_code_block_extraction() {
        let text = "Use a context manager.\n```python\nwith open(p) as f:\n    data = f.read()\n```\nDone.";
        let (body, blocks) = extract_code_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].starts_with("with open"));
        assert!(!body.contains("```"));
        assert!(body.contains("Use a context manager."));
    }

    #[test]
    fn test_untagged_fence_and_no_fence() {
        let (_, blocks) = extract_code_blocks("```\nx = 1\n```");
        assert_eq!(blocks, vec!["x = 1".to_string()]);

        let (body, blocks) = extract_code_blocks("no code here");
        assert!(blocks.is_empty());
        assert_eq!(body, "no code here");
    }

    #[test]
    fn test_compose_preserves_order() {
        let suggestions = vec![
            suggestion(SuggestionKind::Pylint, "first"),
            suggestion(SuggestionKind::Bandit, "second"),
            suggestion(SuggestionKind::Summary, "third"),
        ];
        let sections = compose_sections(&suggestions);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].header, "Pylint");
        assert_eq!(sections[0].body, "first");
        assert_eq!(sections[1].header, "Bandit");
        assert_eq!(sections[2].header, "Final Summary & Health Score");
    }
}
