//! Budgeted reasoning over analyzer findings
//!
//! For each finding, either query the reviewer model for an explanation and
//! fix, or fall back to a deterministic rule-based hint. Model calls share a
//! fixed budget across the whole pass and retry with exponential backoff
//! when rate-limited. Every finding yields exactly one suggestion; nothing
//! is dropped.

use crate::ai::AiResult;
use crate::analyzers::{AnalyzerReport, ReportStats};
use crate::models::{Finding, Suggestion, SuggestionKind};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum security findings explained per pass.
const SECURITY_CAP: usize = 3;
/// Maximum complexity files considered per pass.
const COMPLEXITY_FILE_CAP: usize = 3;
/// Maximum complexity findings explained per file.
const COMPLEXITY_PER_FILE_CAP: usize = 2;

/// Capability abstraction over the reviewer backend.
///
/// Two implementations exist: the networked [`ChatClient`] and the offline
/// [`RuleBasedSuggester`], so the reasoning pass is testable without a
/// network dependency.
///
/// [`ChatClient`]: crate::ai::ChatClient
pub trait SuggestionProvider {
    /// Explain a single finding and propose a fix.
    fn suggest(&self, finding: &Finding) -> AiResult<String>;

    /// Produce the final health summary, including an overall `<score>/10`.
    fn summarize(&self, repository: &str, stats: &ReportStats) -> AiResult<String>;
}

/// Backoff schedule for rate-limited reviewer calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per finding (first call included).
    pub attempts: u32,
    /// First delay, in seconds.
    pub base_delay: u64,
    /// Delay ceiling, in seconds.
    pub max_delay: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: 2,
            max_delay: 16,
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after the given zero-based failed attempt:
    /// base, base*2, base*4, ... capped at `max_delay`.
    pub fn delay_after(&self, attempt: u32) -> u64 {
        let shifted = self
            .base_delay
            .saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX));
        shifted.min(self.max_delay)
    }
}

/// Deterministic offline suggester keyed by message substrings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSuggester;

impl RuleBasedSuggester {
    /// Hint for a single finding message.
    pub fn hint(message: &str) -> String {
        let msg = message.to_lowercase();
        if msg.contains("line too long") {
            return "Keep lines at or under 100 characters. Break long expressions or strings."
                .to_string();
        }
        if msg.contains("missing module docstring") {
            return "Add a top-level docstring describing purpose and usage.".to_string();
        }
        if msg.contains("missing class docstring") {
            return "Add a short docstring summarizing the class.".to_string();
        }
        if msg.contains("wildcard import") {
            return "Avoid 'from X import *'; import only the names you need.".to_string();
        }
        if msg.contains("unable to import") {
            return "Install or correctly reference the missing module.".to_string();
        }
        "Review and refactor for clarity; follow style and security best practices.".to_string()
    }

    /// Arithmetic health summary used when no model is reachable. The score
    /// token is formatted as `<x.y>/10` so score extraction accepts it.
    pub fn summary(stats: &ReportStats) -> String {
        let penalty = 0.1 * stats.lint_issues as f64
            + 0.5 * stats.security_issues as f64
            + 0.3 * stats.complexity_hotspots as f64;
        let score = (10.0 - penalty).clamp(1.0, 10.0);
        format!(
            "Repository health summary (offline).\n\
             Lint issues: {}. Security issues: {}. Complexity hotspots: {}.\n\
             Overall code quality score: {:.1}/10",
            stats.lint_issues, stats.security_issues, stats.complexity_hotspots, score
        )
    }
}

impl SuggestionProvider for RuleBasedSuggester {
    fn suggest(&self, finding: &Finding) -> AiResult<String> {
        Ok(Self::hint(&finding.message))
    }

    fn summarize(&self, _repository: &str, stats: &ReportStats) -> AiResult<String> {
        Ok(Self::summary(stats))
    }
}

/// Single-pass reasoner over an [`AnalyzerReport`].
///
/// The call budget is threaded explicitly through the pass and decremented
/// on every attempt, successful or not. Lint findings are visited first
/// (bounded per file group by the initial budget), then up to three
/// security findings, then up to two complexity findings for each of up to
/// three files. The ordering and caps are a cost-control decision.
pub struct FindingReasoner<'a> {
    provider: Option<&'a dyn SuggestionProvider>,
    policy: RetryPolicy,
    initial_budget: u32,
    budget: u32,
    calls_attempted: u32,
    sleep: Box<dyn FnMut(u64) + 'a>,
}

impl<'a> FindingReasoner<'a> {
    /// Create a reasoner with the default budget of 8 model calls.
    /// `provider: None` sends every finding down the rule-based path.
    pub fn new(provider: Option<&'a dyn SuggestionProvider>) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
            initial_budget: 8,
            budget: 8,
            calls_attempted: 0,
            sleep: Box::new(|secs| std::thread::sleep(Duration::from_secs(secs))),
        }
    }

    /// Set the model-call budget.
    pub fn with_budget(mut self, budget: u32) -> Self {
        self.initial_budget = budget;
        self.budget = budget;
        self
    }

    /// Set the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the sleep function (tests observe delays without waiting).
    pub fn with_sleep(mut self, sleep: impl FnMut(u64) + 'a) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Model calls attempted so far, successful or not.
    pub fn calls_attempted(&self) -> u32 {
        self.calls_attempted
    }

    /// Budget remaining after the pass.
    pub fn remaining_budget(&self) -> u32 {
        self.budget
    }

    /// Produce one suggestion per eligible finding, in fixed order.
    pub fn reason(&mut self, report: &AnalyzerReport) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();
        let per_file_cap = self.initial_budget as usize;

        for entry in &report.lint {
            for finding in entry.findings.iter().take(per_file_cap) {
                let text = self.explain(finding);
                suggestions.push(Suggestion::from_finding(
                    finding,
                    SuggestionKind::Pylint,
                    text,
                ));
            }
        }

        for finding in report.security.iter().take(SECURITY_CAP) {
            let text = self.explain(finding);
            suggestions.push(Suggestion::from_finding(
                finding,
                SuggestionKind::Bandit,
                text,
            ));
        }

        for (_, findings) in report.complexity.iter().take(COMPLEXITY_FILE_CAP) {
            for finding in findings.iter().take(COMPLEXITY_PER_FILE_CAP) {
                let text = self.explain(finding);
                suggestions.push(Suggestion::from_finding(
                    finding,
                    SuggestionKind::Radon,
                    text,
                ));
            }
        }

        debug!(
            "Reasoning pass complete: {} suggestions, {} model calls attempted, {} budget left",
            suggestions.len(),
            self.calls_attempted,
            self.budget
        );
        suggestions
    }

    /// Append the final summary suggestion. One model call with the same
    /// retry policy, outside the per-finding budget; offline fallback
    /// derives the score from finding counts.
    pub fn summarize(&mut self, repository: &str, stats: &ReportStats) -> Suggestion {
        let text = match self.provider {
            Some(provider) => self
                .call_with_retry(|| provider.summarize(repository, stats))
                .unwrap_or_else(|| RuleBasedSuggester::summary(stats)),
            None => RuleBasedSuggester::summary(stats),
        };
        Suggestion {
            kind: SuggestionKind::Summary,
            file: repository.to_string(),
            line: 0,
            message: "Final Summary".to_string(),
            suggestion: text,
        }
    }

    /// Explain one finding: model call while budget remains, rule-based
    /// hint on exhaustion or on any non-rate error.
    fn explain(&mut self, finding: &Finding) -> String {
        let provider = match self.provider {
            Some(provider) if self.budget > 0 => provider,
            _ => return RuleBasedSuggester::hint(&finding.message),
        };

        for attempt in 0..self.policy.attempts {
            if self.budget == 0 {
                break;
            }
            self.budget -= 1;
            self.calls_attempted += 1;

            match provider.suggest(finding) {
                Ok(text) => return text,
                Err(e) if e.is_rate_limited() => {
                    warn!(
                        "Rate-limited on {} (attempt {}): {}",
                        finding.file.display(),
                        attempt + 1,
                        e
                    );
                    // Back off only when another attempt will actually run.
                    if attempt + 1 < self.policy.attempts && self.budget > 0 {
                        let delay = self.policy.delay_after(attempt);
                        (self.sleep)(delay);
                    }
                }
                Err(e) => {
                    warn!("Reviewer call failed on {}: {}", finding.file.display(), e);
                    break;
                }
            }
        }

        RuleBasedSuggester::hint(&finding.message)
    }

    /// Retry wrapper used for the summary call (no budget involved).
    fn call_with_retry(&mut self, mut call: impl FnMut() -> AiResult<String>) -> Option<String> {
        for attempt in 0..self.policy.attempts {
            match call() {
                Ok(text) => return Some(text),
                Err(e) if e.is_rate_limited() => {
                    warn!("Rate-limited on summary (attempt {}): {}", attempt + 1, e);
                    if attempt + 1 < self.policy.attempts {
                        let delay = self.policy.delay_after(attempt);
                        (self.sleep)(delay);
                    }
                }
                Err(e) => {
                    warn!("Summary call failed: {}", e);
                    return None;
                }
            }
        }
        None
    }
}
