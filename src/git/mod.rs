//! Repository checkout using libgit2
//!
//! Shallow-clones the repository under review into a `devmate_<unix>`
//! directory in the system temp dir. Cleanup is not automatic; callers
//! that care must invoke [`clean_checkout`] explicitly.

use anyhow::{Context, Result};
use git2::build::RepoBuilder;
use git2::FetchOptions;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Create the temporary working directory for a checkout.
pub fn make_workdir() -> Result<PathBuf> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("devmate_{}", stamp));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create workdir {}", dir.display()))?;
    Ok(dir)
}

/// Shallow-clone (depth 1) a repository into a fresh workdir.
pub fn clone_repository(url: &str) -> Result<PathBuf> {
    let workdir = make_workdir()?;
    info!("Cloning {} into {}", url, workdir.display());

    let mut fetch = FetchOptions::new();
    fetch.depth(1);
    RepoBuilder::new()
        .fetch_options(fetch)
        .clone(url, &workdir)
        .with_context(|| format!("Failed to clone {}", url))?;

    Ok(workdir)
}

/// Best-effort removal of a checkout directory.
pub fn clean_checkout(path: &Path) {
    if let Err(e) = std::fs::remove_dir_all(path) {
        debug!("Failed to remove checkout {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workdir_roundtrip() {
        let dir = make_workdir().unwrap();
        assert!(dir.exists());
        assert!(dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("devmate_"));
        clean_checkout(&dir);
        assert!(!dir.exists());
    }

    #[test]
    fn test_clone_failure_surfaces() {
        let err = clone_repository("/nonexistent/devmate-test-repo").unwrap_err();
        assert!(err.to_string().contains("Failed to clone"));
    }

    #[test]
    fn test_clean_missing_checkout_is_silent() {
        clean_checkout(Path::new("/nonexistent/devmate-gone"));
    }
}
