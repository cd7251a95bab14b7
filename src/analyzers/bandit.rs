//! Bandit security pass
//!
//! One recursive bandit run over the whole checkout. Bandit emits JSON
//! even when findings push the exit code non-zero; non-JSON output
//! degrades to an empty result set.

use crate::analyzers::external_tool::run_external_tool;
use crate::models::{Finding, FindingKind};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bandit security runner
pub struct BanditRunner {
    repository_path: PathBuf,
    timeout_secs: u64,
}

impl BanditRunner {
    pub fn new(repository_path: impl Into<PathBuf>) -> Self {
        Self {
            repository_path: repository_path.into(),
            timeout_secs: 120,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Run bandit recursively over the checkout.
    pub fn run(&self) -> Vec<Finding> {
        info!("Running bandit on {}", self.repository_path.display());
        let cmd = vec![
            "bandit".to_string(),
            "-r".to_string(),
            self.repository_path.to_string_lossy().to_string(),
            "-f".to_string(),
            "json".to_string(),
        ];
        let result = run_external_tool(&cmd, "bandit", self.timeout_secs, None);
        if result.timed_out {
            warn!("Bandit timed out");
            return Vec::new();
        }
        parse_output(&self.repository_path, &result.stdout)
    }
}

/// Parse bandit JSON (`results` array) into findings; non-JSON is empty.
pub fn parse_output(repo_root: &Path, stdout: &str) -> Vec<Finding> {
    let json: JsonValue = match serde_json::from_str(stdout) {
        Ok(json) => json,
        Err(_) => {
            if !stdout.trim().is_empty() {
                debug!("Failed to parse bandit output");
            }
            return Vec::new();
        }
    };

    let results = match json.get("results").and_then(|r| r.as_array()) {
        Some(results) => results.clone(),
        None => return Vec::new(),
    };

    results
        .into_iter()
        .map(|item| {
            let file = item
                .get("filename")
                .and_then(|f| f.as_str())
                .unwrap_or("")
                .to_string();
            let rel = Path::new(&file)
                .strip_prefix(repo_root)
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|_| PathBuf::from(&file));
            Finding {
                kind: FindingKind::Security,
                file: rel,
                line: item
                    .get("line_number")
                    .and_then(|l| l.as_u64())
                    .unwrap_or(0) as u32,
                message: item
                    .get("issue_text")
                    .and_then(|t| t.as_str())
                    .unwrap_or("")
                    .to_string(),
                symbol: item
                    .get("test_name")
                    .and_then(|t| t.as_str())
                    .unwrap_or("")
                    .to_string(),
                raw: item,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_output() {
        let stdout = r#"{
            "results": [
                {"filename": "/repo/app.py", "line_number": 42,
                 "issue_text": "Possible hardcoded password", "test_name": "hardcoded_password_string",
                 "issue_severity": "LOW", "issue_confidence": "MEDIUM"}
            ],
            "metrics": {}
        }"#;
        let findings = parse_output(Path::new("/repo"), stdout);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::Security);
        assert_eq!(findings[0].file, PathBuf::from("app.py"));
        assert_eq!(findings[0].line, 42);
        assert_eq!(findings[0].symbol, "hardcoded_password_string");
    }

    #[test]
    fn test_parse_malformed_output_is_empty() {
        assert!(parse_output(Path::new("/repo"), "").is_empty());
        assert!(parse_output(Path::new("/repo"), "bandit crashed\n").is_empty());
        // JSON without a results array
        assert!(parse_output(Path::new("/repo"), r#"{"errors": []}"#).is_empty());
    }
}
