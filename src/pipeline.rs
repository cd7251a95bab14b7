//! Full review pipeline
//!
//! Orchestrates one analysis run, fully sequential:
//! 1. Clone the repository (shallow)
//! 2. Run the three static analyzers
//! 3. Reason over findings (budgeted model calls or rule-based hints)
//! 4. Compose sections and extract the overall score
//! 5. Insert the placeholder record
//! 6. Render the PDF and finalize the record
//!
//! Every stage before the record insert degrades rather than fails; a
//! rendering failure marks the record `Failed` instead of deleting it.

use crate::ai::{ChatClient, ChatConfig, FindingReasoner, SuggestionProvider};
use crate::analyzers::{self, ReportStats};
use crate::config::DevmateConfig;
use crate::git;
use crate::models::AnalysisRecord;
use crate::report::{compose_sections, extract_score, PdfRenderer};
use crate::store::RecordStore;
use anyhow::Result;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Title line of every generated report.
pub const REPORT_TITLE: &str = "DevMate - AI Code Review Report";

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub record_id: String,
    pub score: f64,
    /// Relative report path; `None` when rendering failed (the record is
    /// then in `Failed` state).
    pub report_path: Option<String>,
    pub suggestions: usize,
    /// Temporary checkout, present only when the pipeline cloned. Left on
    /// disk; callers decide whether to clean it.
    pub checkout: Option<PathBuf>,
}

/// One-shot review pipeline.
pub struct ReviewPipeline {
    config: DevmateConfig,
    offline: bool,
    budget: Option<u32>,
    font_candidates: Option<Vec<PathBuf>>,
}

impl ReviewPipeline {
    pub fn new(config: DevmateConfig) -> Self {
        Self {
            config,
            offline: false,
            budget: None,
            font_candidates: None,
        }
    }

    /// Skip the reviewer model entirely; every finding gets a rule hint.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Override the configured model-call budget.
    pub fn with_budget(mut self, budget: u32) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Override the renderer's Unicode font search list.
    pub fn with_font_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.font_candidates = Some(candidates);
        self
    }

    /// Clone the repository, then review the checkout. The checkout is
    /// returned in the outcome and never cleaned here.
    pub fn run(&self, repo_url: &str) -> Result<PipelineOutcome> {
        let checkout = git::clone_repository(repo_url)?;
        let mut outcome = self.run_checkout(repo_url, &checkout)?;
        outcome.checkout = Some(checkout);
        Ok(outcome)
    }

    /// Review an existing checkout (also the entry point for local paths).
    pub fn run_checkout(&self, repository: &str, checkout: &Path) -> Result<PipelineOutcome> {
        let store = RecordStore::open(&self.config.database)?;

        let report = analyzers::analyze_checkout(checkout);
        let stats = report.stats();

        let client = self.make_client();
        let provider = client.as_ref().map(|c| c as &dyn SuggestionProvider);
        let budget = self.budget.unwrap_or(self.config.max_llm_calls);

        let mut reasoner = FindingReasoner::new(provider).with_budget(budget);
        let mut suggestions = reasoner.reason(&report);
        suggestions.push(reasoner.summarize(repository, &stats));
        let calls = reasoner.calls_attempted();

        let texts: Vec<JsonValue> = suggestions
            .iter()
            .map(|s| JsonValue::String(s.suggestion.clone()))
            .collect();
        let score = extract_score(&JsonValue::Array(texts));
        info!("Extracted score {:.2} from {} suggestions", score, suggestions.len());

        // Phase one: placeholder record before any rendering starts.
        let record = AnalysisRecord::pending(repository, score);
        store.insert(&record)?;

        let sections = compose_sections(&suggestions);
        let run_log = run_log(repository, &stats, calls, budget, score);

        let mut renderer = PdfRenderer::new(&self.config.reports_dir);
        if let Some(candidates) = &self.font_candidates {
            renderer = renderer.with_font_candidates(candidates.clone());
        }

        // Phase two: finalize the record either way.
        match renderer.render(REPORT_TITLE, repository, &sections, Some(&run_log)) {
            Ok(path) => {
                store.mark_complete(&record.id, &path)?;
                Ok(PipelineOutcome {
                    record_id: record.id,
                    score,
                    report_path: Some(path),
                    suggestions: suggestions.len(),
                    checkout: None,
                })
            }
            Err(e) => {
                warn!("Report generation failed: {}", e);
                store.mark_failed(&record.id)?;
                Ok(PipelineOutcome {
                    record_id: record.id,
                    score,
                    report_path: None,
                    suggestions: suggestions.len(),
                    checkout: None,
                })
            }
        }
    }

    fn make_client(&self) -> Option<ChatClient> {
        if self.offline {
            return None;
        }
        let chat_config = ChatConfig {
            api_url: self.config.api_url.clone(),
            model: self.config.model.clone(),
            ..Default::default()
        };
        match ChatClient::from_env(chat_config) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Reviewer model unavailable ({}); using rule-based hints", e);
                None
            }
        }
    }
}

/// Plain-text execution log appended to the report's final page.
fn run_log(repository: &str, stats: &ReportStats, calls: u32, budget: u32, score: f64) -> String {
    format!(
        "Repository: {}\n\
         Files scanned: {}\n\
         Lint issues: {}\n\
         Security issues: {}\n\
         Complexity hotspots: {}\n\
         Model calls attempted: {} of {}\n\
         Extracted score: {:.2}",
        repository,
        stats.files_scanned,
        stats.lint_issues,
        stats.security_issues,
        stats.complexity_hotspots,
        calls,
        budget,
        score
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_mentions_budget() {
        let stats = ReportStats {
            files_scanned: 2,
            lint_issues: 4,
            security_issues: 1,
            complexity_hotspots: 0,
        };
        let log = run_log("repo", &stats, 5, 8, 7.5);
        assert!(log.contains("Model calls attempted: 5 of 8"));
        assert!(log.contains("Extracted score: 7.50"));
    }
}
