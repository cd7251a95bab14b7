//! Subprocess plumbing for the static analyzers
//!
//! Every analyzer follows the same pattern:
//! 1. Run the tool as a subprocess with `std::process::Command`
//! 2. Parse its JSON stdout
//! 3. Normalize into [`Finding`] objects
//!
//! Malformed or absent JSON is never fatal; it degrades to an empty
//! result for that tool.
//!
//! [`Finding`]: crate::models::Finding

use serde_json::Value as JsonValue;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// Result from running an external analyzer
#[derive(Debug, Clone)]
pub struct ExternalToolResult {
    /// Whether the tool completed (may still have findings)
    pub success: bool,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Process exit code
    pub return_code: Option<i32>,
    /// Whether the tool timed out
    pub timed_out: bool,
    /// Error message if failed
    pub error: Option<String>,
}

impl ExternalToolResult {
    /// Create a successful result
    pub fn success(stdout: String, stderr: String, return_code: i32) -> Self {
        Self {
            success: true,
            stdout,
            stderr,
            return_code: Some(return_code),
            timed_out: false,
            error: None,
        }
    }

    /// Create a failed result
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            timed_out: false,
            error: Some(error),
        }
    }

    /// Create a timeout result
    pub fn timeout(tool_name: &str, timeout_secs: u64) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            return_code: None,
            timed_out: true,
            error: Some(format!("{} timed out after {}s", tool_name, timeout_secs)),
        }
    }

    /// Parse stdout as JSON
    pub fn json_output(&self) -> Option<JsonValue> {
        if self.stdout.is_empty() {
            return None;
        }
        serde_json::from_str(&self.stdout).ok()
    }

    /// Parse stdout as JSON array
    pub fn json_array(&self) -> Option<Vec<JsonValue>> {
        self.json_output().and_then(|v| v.as_array().cloned())
    }
}

/// Run an external analyzer with standard error handling.
///
/// # Arguments
/// * `cmd` - Command and arguments to run
/// * `tool_name` - Human-readable tool name for error messages
/// * `timeout_secs` - Timeout in seconds (0 = no timeout)
/// * `cwd` - Working directory for the tool
pub fn run_external_tool(
    cmd: &[String],
    tool_name: &str,
    timeout_secs: u64,
    cwd: Option<&Path>,
) -> ExternalToolResult {
    if cmd.is_empty() {
        return ExternalToolResult::failure("Empty command".to_string());
    }

    let program = &cmd[0];
    let args = &cmd[1..];

    debug!("Running {}: {} {:?}", tool_name, program, args);

    let mut command = Command::new(program);
    command.args(args);

    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                return ExternalToolResult::failure(format!(
                    "{} not found. Please install it first.",
                    tool_name
                ));
            }
            return ExternalToolResult::failure(format!("Failed to run {}: {}", tool_name, e));
        }
    };

    if timeout_secs > 0 {
        run_with_timeout(child, tool_name, timeout_secs)
    } else {
        run_without_timeout(child, tool_name)
    }
}

/// Run process without timeout
fn run_without_timeout(child: std::process::Child, tool_name: &str) -> ExternalToolResult {
    let output = match child.wait_with_output() {
        Ok(output) => output,
        Err(e) => {
            return ExternalToolResult::failure(format!("Failed to wait for {}: {}", tool_name, e));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let return_code = output.status.code().unwrap_or(-1);

    ExternalToolResult::success(stdout, stderr, return_code)
}

/// Run process with timeout (poll with small sleep intervals, kill on expiry)
fn run_with_timeout(
    mut child: std::process::Child,
    tool_name: &str,
    timeout_secs: u64,
) -> ExternalToolResult {
    use std::thread;
    use std::time::Instant;

    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = child
                    .stdout
                    .take()
                    .map(|s| {
                        let reader = BufReader::new(s);
                        reader
                            .lines()
                            .filter_map(|l| l.ok())
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                    .unwrap_or_default();

                let stderr = child
                    .stderr
                    .take()
                    .map(|s| {
                        let reader = BufReader::new(s);
                        reader
                            .lines()
                            .filter_map(|l| l.ok())
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                    .unwrap_or_default();

                return ExternalToolResult::success(stdout, stderr, status.code().unwrap_or(-1));
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    warn!("{} timed out after {}s", tool_name, timeout_secs);
                    return ExternalToolResult::timeout(tool_name, timeout_secs);
                }
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                return ExternalToolResult::failure(format!(
                    "Failed to wait for {}: {}",
                    tool_name, e
                ));
            }
        }
    }
}

/// Check if a tool is installed
pub fn is_tool_installed(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Check if a Python tool is installed (directly or via `python -m`)
pub fn is_python_tool_installed(tool: &str) -> bool {
    if is_tool_installed(tool) {
        return true;
    }

    Command::new("python")
        .args(["-m", tool, "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_tool_result() {
        let result = ExternalToolResult::success("output".into(), "".into(), 0);
        assert!(result.success);
        assert_eq!(result.stdout, "output");

        let result = ExternalToolResult::failure("error".into());
        assert!(!result.success);
        assert_eq!(result.error, Some("error".into()));

        let result = ExternalToolResult::timeout("test", 60);
        assert!(result.timed_out);
    }

    #[test]
    fn test_json_parsing() {
        let result = ExternalToolResult::success(r#"{"key": "value"}"#.into(), "".into(), 0);
        let json = result.json_output().unwrap();
        assert_eq!(json["key"], "value");

        let result = ExternalToolResult::success(r#"[1, 2, 3]"#.into(), "".into(), 0);
        let arr = result.json_array().unwrap();
        assert_eq!(arr.len(), 3);
    }

    #[test]
    fn test_malformed_json_is_none() {
        let result = ExternalToolResult::success("not json {".into(), "".into(), 0);
        assert!(result.json_output().is_none());
        assert!(result.json_array().is_none());
    }

    #[test]
    fn test_missing_tool_fails_gracefully() {
        let result = run_external_tool(
            &["devmate-no-such-tool-xyz".to_string()],
            "missing",
            5,
            None,
        );
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not found"));
    }
}
