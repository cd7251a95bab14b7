//! Pylint lint pass
//!
//! Runs pylint per source file with JSON output. A parse failure or tool
//! crash on one file records an empty issue list for that file and never
//! aborts the rest of the run.

use crate::analyzers::external_tool::run_external_tool;
use crate::analyzers::FileLint;
use crate::models::{Finding, FindingKind};
use ignore::WalkBuilder;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pylint lint runner
pub struct PylintRunner {
    repository_path: PathBuf,
    timeout_secs: u64,
}

impl PylintRunner {
    pub fn new(repository_path: impl Into<PathBuf>) -> Self {
        Self {
            repository_path: repository_path.into(),
            timeout_secs: 300,
        }
    }

    /// Set the per-file timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Lint every Python file under the checkout, one pylint run per file.
    pub fn run(&self) -> Vec<FileLint> {
        let files = python_files(&self.repository_path);
        info!("Running pylint on {} files", files.len());

        let mut results = Vec::new();
        for file in files {
            debug!("Running pylint on {}", file.display());
            let cmd = vec![
                "pylint".to_string(),
                file.to_string_lossy().to_string(),
                "--output-format=json".to_string(),
            ];
            let result = run_external_tool(&cmd, "pylint", self.timeout_secs, None);
            let findings = parse_output(&self.repository_path, &file, &result.stdout);
            results.push(FileLint {
                file: relative_to(&self.repository_path, &file),
                findings,
            });
        }
        results
    }
}

/// Parse one pylint JSON array into findings. Anything that is not a JSON
/// array yields an empty list.
pub fn parse_output(repo_root: &Path, file: &Path, stdout: &str) -> Vec<Finding> {
    let issues: Vec<JsonValue> = match serde_json::from_str(stdout) {
        Ok(JsonValue::Array(items)) => items,
        _ => {
            if !stdout.trim().is_empty() {
                debug!("Failed to parse pylint output for {}", file.display());
            }
            return Vec::new();
        }
    };

    let rel = relative_to(repo_root, file);
    issues
        .into_iter()
        .map(|issue| Finding {
            kind: FindingKind::StaticLint,
            file: rel.clone(),
            line: issue.get("line").and_then(|l| l.as_u64()).unwrap_or(0) as u32,
            message: issue
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("")
                .to_string(),
            symbol: issue
                .get("symbol")
                .and_then(|s| s.as_str())
                .unwrap_or("")
                .to_string(),
            raw: issue,
        })
        .collect()
}

/// All `*.py` files under the root, honoring gitignore rules.
fn python_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).build().flatten() {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "py") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

fn relative_to(root: &Path, file: &Path) -> PathBuf {
    file.strip_prefix(root)
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|_| file.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_output() {
        let stdout = r#"[
            {"type": "convention", "line": 1, "column": 0, "path": "app.py",
             "symbol": "missing-module-docstring", "message": "Missing module docstring",
             "message-id": "C0114"},
            {"type": "convention", "line": 7, "column": 0, "path": "app.py",
             "symbol": "line-too-long", "message": "Line too long (130/100)",
             "message-id": "C0301"}
        ]"#;
        let findings = parse_output(Path::new("/repo"), Path::new("/repo/app.py"), stdout);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind, FindingKind::StaticLint);
        assert_eq!(findings[0].symbol, "missing-module-docstring");
        assert_eq!(findings[1].line, 7);
        assert_eq!(findings[1].file, PathBuf::from("app.py"));
    }

    #[test]
    fn test_parse_malformed_output_is_empty() {
        let findings = parse_output(Path::new("/repo"), Path::new("/repo/app.py"), "oops {");
        assert!(findings.is_empty());

        // A JSON object (not an array) is also an empty result.
        let findings = parse_output(Path::new("/repo"), Path::new("/repo/app.py"), "{}");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_python_files_walk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "nope\n").unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/c.py"), "y = 2\n").unwrap();

        let files = python_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "py"));
    }
}
