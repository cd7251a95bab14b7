//! Project configuration (devmate.toml)
//!
//! Optional per-project settings; CLI flags override file values. A
//! missing file means defaults.

use crate::ai::{DEFAULT_API_URL, DEFAULT_MODEL};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "devmate.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevmateConfig {
    /// Reviewer model name.
    pub model: String,
    /// Chat-completions endpoint.
    pub api_url: String,
    /// Model-call budget per reasoning pass.
    pub max_llm_calls: u32,
    /// Where report PDFs are written.
    pub reports_dir: PathBuf,
    /// Record database location.
    pub database: PathBuf,
}

impl Default for DevmateConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            max_llm_calls: 8,
            reports_dir: PathBuf::from("static/reports"),
            database: PathBuf::from("devmate.redb"),
        }
    }
}

impl DevmateConfig {
    /// Load `devmate.toml` from a directory, falling back to defaults
    /// when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DevmateConfig::default();
        assert_eq!(config.max_llm_calls, 8);
        assert_eq!(config.reports_dir, PathBuf::from("static/reports"));
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = DevmateConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_llm_calls, 8);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "max_llm_calls = 3\nreports_dir = \"out/reports\"\n",
        )
        .unwrap();
        let config = DevmateConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_llm_calls, 3);
        assert_eq!(config.reports_dir, PathBuf::from("out/reports"));
        // Untouched fields keep their defaults.
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "not_a_key = true\n").unwrap();
        assert!(DevmateConfig::load(dir.path()).is_err());
    }
}
