//! Core data models for DevMate
//!
//! These models are used throughout the codebase for representing
//! analyzer findings, reviewer suggestions, and persisted analysis runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// Which analyzer pass produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    #[default]
    StaticLint,
    Security,
    Complexity,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingKind::StaticLint => write!(f, "static-lint"),
            FindingKind::Security => write!(f, "security"),
            FindingKind::Complexity => write!(f, "complexity"),
        }
    }
}

/// A single issue instance emitted by a static-analysis tool.
///
/// Immutable once created; the reasoner consumes findings and never
/// mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Finding {
    #[serde(default)]
    pub kind: FindingKind,
    #[serde(default)]
    pub file: PathBuf,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub message: String,
    /// Pylint symbol, bandit test name, or radon rank.
    #[serde(default)]
    pub symbol: String,
    /// Raw tool payload, kept for downstream inspection.
    #[serde(default)]
    pub raw: JsonValue,
}

/// Source of a suggestion, used to pick its report section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Pylint,
    Bandit,
    Radon,
    Static,
    Review,
    Summary,
}

impl SuggestionKind {
    /// Lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Pylint => "pylint",
            SuggestionKind::Bandit => "bandit",
            SuggestionKind::Radon => "radon",
            SuggestionKind::Static => "static",
            SuggestionKind::Review => "review",
            SuggestionKind::Summary => "summary",
        }
    }
}

impl std::fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finding enriched with a human-readable explanation, either
/// model-generated or rule-based. Created once, read-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub file: String,
    pub line: u32,
    pub message: String,
    pub suggestion: String,
}

impl Suggestion {
    pub fn from_finding(finding: &Finding, kind: SuggestionKind, suggestion: String) -> Self {
        Self {
            kind,
            file: finding.file.to_string_lossy().to_string(),
            line: finding.line,
            message: finding.message.clone(),
            suggestion,
        }
    }
}

/// Lifecycle of a persisted analysis run.
///
/// `Pending` is written before document rendering starts; the record is
/// updated to `Complete` or `Failed` afterwards, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    #[default]
    Pending,
    Complete,
    Failed,
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordState::Pending => write!(f, "pending"),
            RecordState::Complete => write!(f, "complete"),
            RecordState::Failed => write!(f, "failed"),
        }
    }
}

/// One persisted analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub repository: String,
    /// Overall quality score in (0, 10].
    pub score: f64,
    pub state: RecordState,
    /// Relative report path (`reports/<filename>`), set on completion.
    pub report_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Create a new placeholder record in `Pending` state.
    pub fn pending(repository: impl Into<String>, score: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            repository: repository.into(),
            score,
            state: RecordState::Pending,
            report_path: None,
            created_at: Utc::now(),
        }
    }
}
