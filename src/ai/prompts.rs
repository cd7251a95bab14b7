//! Prompt templates for the reviewer backend

use crate::analyzers::ReportStats;
use crate::models::{Finding, FindingKind};

/// Fixed system role for every reviewer call.
pub const SYSTEM_PROMPT: &str =
    "You are DevMate, a senior code reviewer. Reply with a short 'Why' and 'Fix'.";

/// Build the per-finding prompt. Each analyzer gets its own template
/// carrying file, line, message, and the tool-specific symbol or rank.
pub fn finding_prompt(finding: &Finding) -> String {
    let file = finding.file.to_string_lossy();
    match finding.kind {
        FindingKind::StaticLint => format!(
            "File: {}\nLine: {}\nIssue: {}\nSymbol: {}\n\n\
             Explain briefly why it is a problem and give a minimal safe fix.",
            file, finding.line, finding.message, finding.symbol
        ),
        FindingKind::Security => format!(
            "Security issue in {}:{}\n{}\nExplain risk + safe fix.",
            file, finding.line, finding.message
        ),
        FindingKind::Complexity => format!(
            "{}:{} has complexity rank {}. Suggest a refactor outline.",
            file, finding.line, finding.symbol
        ),
    }
}

/// Build the final summary prompt from aggregate analyzer counts.
pub fn summary_prompt(repository: &str, stats: &ReportStats) -> String {
    format!(
        "Repository: {}\n\
         Files scanned: {}\n\
         Lint issues: {}\n\
         Security issues: {}\n\
         Complexity hotspots: {}\n\n\
         Summarize repository health in plain text, list the most important \
         issues and recommendations, and assign an overall quality score as \
         '<score>/10'.",
        repository,
        stats.files_scanned,
        stats.lint_issues,
        stats.security_issues,
        stats.complexity_hotspots
    )
}
