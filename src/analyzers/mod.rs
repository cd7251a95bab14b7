//! Static analyzer passes
//!
//! Runs three independent analyzers sequentially against a checkout and
//! normalizes each tool's output into the common [`Finding`] shape:
//! - `pylint` - per-file lint issues
//! - `bandit` - tree-wide security issues
//! - `radon` - tree-wide cyclomatic complexity, grouped per file
//!
//! A failing analyzer degrades to an empty result for that analyzer only;
//! no analyzer failure aborts the pipeline.
//!
//! [`Finding`]: crate::models::Finding

mod bandit;
mod external_tool;
mod pylint;
mod radon;

pub use bandit::BanditRunner;
pub use external_tool::{is_python_tool_installed, is_tool_installed, ExternalToolResult};
pub use pylint::PylintRunner;
pub use radon::RadonRunner;

use crate::models::Finding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Lint results for one source file. An empty `findings` list means the
/// file was linted but produced no parseable issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLint {
    pub file: PathBuf,
    pub findings: Vec<Finding>,
}

/// Normalized output of the three analyzer passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerReport {
    pub lint: Vec<FileLint>,
    pub security: Vec<Finding>,
    /// Complexity findings grouped per file, in parsed key order.
    pub complexity: Vec<(String, Vec<Finding>)>,
}

impl AnalyzerReport {
    pub fn is_empty(&self) -> bool {
        self.lint.iter().all(|f| f.findings.is_empty())
            && self.security.is_empty()
            && self.complexity.iter().all(|(_, f)| f.is_empty())
    }

    /// Aggregate counts, used by the summary stage.
    pub fn stats(&self) -> ReportStats {
        ReportStats {
            files_scanned: self.lint.len(),
            lint_issues: self.lint.iter().map(|f| f.findings.len()).sum(),
            security_issues: self.security.len(),
            complexity_hotspots: self.complexity.iter().map(|(_, f)| f.len()).sum(),
        }
    }
}

/// Aggregate analyzer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub files_scanned: usize,
    pub lint_issues: usize,
    pub security_issues: usize,
    pub complexity_hotspots: usize,
}

/// Run all three analyzers sequentially against a checkout.
///
/// Never fails: each pass degrades to empty results on its own errors.
pub fn analyze_checkout(root: &Path) -> AnalyzerReport {
    let lint = PylintRunner::new(root).run();
    let security = BanditRunner::new(root).run();
    let complexity = RadonRunner::new(root).run();

    let report = AnalyzerReport {
        lint,
        security,
        complexity,
    };
    let stats = report.stats();
    info!(
        "Analysis complete: {} files, {} lint, {} security, {} complexity",
        stats.files_scanned, stats.lint_issues, stats.security_issues, stats.complexity_hotspots
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FindingKind;

    #[test]
    fn test_stats_aggregation() {
        let report = AnalyzerReport {
            lint: vec![
                FileLint {
                    file: "a.py".into(),
                    findings: vec![Finding::default(), Finding::default()],
                },
                FileLint {
                    file: "b.py".into(),
                    findings: vec![],
                },
            ],
            security: vec![Finding {
                kind: FindingKind::Security,
                ..Default::default()
            }],
            complexity: vec![("a.py".to_string(), vec![Finding::default()])],
        };

        let stats = report.stats();
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.lint_issues, 2);
        assert_eq!(stats.security_issues, 1);
        assert_eq!(stats.complexity_hotspots, 1);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_empty_report() {
        let report = AnalyzerReport::default();
        assert!(report.is_empty());
        assert_eq!(report.stats(), ReportStats::default());
    }

    #[test]
    fn test_analyze_missing_tools_degrades_to_empty() {
        // Against an empty directory (and possibly absent tools), every
        // pass must degrade to empty results without failing.
        let dir = tempfile::tempdir().unwrap();
        let report = analyze_checkout(dir.path());
        assert!(report.lint.is_empty());
        assert!(report.security.is_empty());
        assert!(report.complexity.is_empty());
    }
}
