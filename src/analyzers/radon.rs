//! Radon cyclomatic-complexity pass
//!
//! One `radon cc` run over the whole checkout, JSON keyed by file.
//! Non-JSON output degrades to an empty mapping.

use crate::analyzers::external_tool::run_external_tool;
use crate::models::{Finding, FindingKind};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Radon complexity runner
pub struct RadonRunner {
    repository_path: PathBuf,
    timeout_secs: u64,
}

impl RadonRunner {
    pub fn new(repository_path: impl Into<PathBuf>) -> Self {
        Self {
            repository_path: repository_path.into(),
            timeout_secs: 60,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Run radon cyclomatic complexity over the checkout.
    pub fn run(&self) -> Vec<(String, Vec<Finding>)> {
        info!("Running radon cc on {}", self.repository_path.display());
        let cmd = vec![
            "radon".to_string(),
            "cc".to_string(),
            "-j".to_string(),
            self.repository_path.to_string_lossy().to_string(),
        ];
        let result = run_external_tool(&cmd, "radon", self.timeout_secs, None);
        if result.timed_out {
            warn!("Radon timed out");
            return Vec::new();
        }
        parse_output(&result.stdout)
    }
}

/// Parse the radon JSON object into a per-file finding list. Files whose
/// value is not an array (radon reports per-file errors as objects) are
/// skipped.
pub fn parse_output(stdout: &str) -> Vec<(String, Vec<Finding>)> {
    let json: JsonValue = match serde_json::from_str(stdout) {
        Ok(json) => json,
        Err(_) => {
            if !stdout.trim().is_empty() {
                debug!("Failed to parse radon output");
            }
            return Vec::new();
        }
    };

    let obj = match json {
        JsonValue::Object(obj) => obj,
        _ => return Vec::new(),
    };

    let mut results = Vec::new();
    for (file, items) in obj {
        let Some(items) = items.as_array() else {
            continue;
        };
        let findings: Vec<Finding> = items
            .iter()
            .map(|item| {
                let rank = item
                    .get("rank")
                    .and_then(|r| r.as_str())
                    .unwrap_or("A")
                    .to_string();
                Finding {
                    kind: FindingKind::Complexity,
                    file: PathBuf::from(&file),
                    line: item.get("lineno").and_then(|l| l.as_u64()).unwrap_or(0) as u32,
                    message: format!("Complexity {}", rank),
                    symbol: rank,
                    raw: item.clone(),
                }
            })
            .collect();
        results.push((file, findings));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_output() {
        let stdout = r#"{
            "pkg/big.py": [
                {"name": "process", "rank": "F", "lineno": 10, "complexity": 42, "type": "function"},
                {"name": "helper", "rank": "B", "lineno": 90, "complexity": 7, "type": "function"}
            ],
            "pkg/small.py": [
                {"name": "main", "rank": "A", "lineno": 1, "complexity": 2, "type": "function"}
            ]
        }"#;
        let results = parse_output(stdout);
        assert_eq!(results.len(), 2);

        let (file, findings) = &results[0];
        assert_eq!(file, "pkg/big.py");
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind, FindingKind::Complexity);
        assert_eq!(findings[0].symbol, "F");
        assert_eq!(findings[0].message, "Complexity F");
        assert_eq!(findings[0].line, 10);
    }

    #[test]
    fn test_parse_skips_error_entries() {
        let stdout = r#"{"broken.py": {"error": "invalid syntax"}, "ok.py": []}"#;
        let results = parse_output(stdout);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "ok.py");
    }

    #[test]
    fn test_parse_malformed_output_is_empty() {
        assert!(parse_output("").is_empty());
        assert!(parse_output("radon: error\n").is_empty());
        assert!(parse_output("[1, 2]").is_empty());
    }
}
