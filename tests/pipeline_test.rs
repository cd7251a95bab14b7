//! Integration tests for the DevMate pipeline
//!
//! These tests run the library pipeline against fixture checkouts to verify:
//! - The offline pipeline produces a scored record and a PDF report
//! - Analyzer failures degrade to empty results instead of aborting
//! - The two-phase record write survives rendering failures
//! - A clone failure surfaces as a top-level error
//!
//! Each test uses its own isolated temp directory. No network access and
//! no analyzer tools are required: missing tools are part of what is
//! being tested.

use devmate::config::DevmateConfig;
use devmate::models::RecordState;
use devmate::pipeline::ReviewPipeline;
use devmate::store::RecordStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a small Python fixture checkout.
fn fixture_checkout() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("app.py"),
        "import os\n\ndef main():\n    print(os.getcwd())\n",
    )
    .expect("Failed to write fixture");
    std::fs::write(dir.path().join("util.py"), "VALUE = 1\n").expect("Failed to write fixture");
    dir
}

/// Config pointing all outputs into an isolated workspace.
fn workspace_config(workspace: &TempDir) -> DevmateConfig {
    DevmateConfig {
        database: workspace.path().join("devmate.redb"),
        reports_dir: workspace.path().join("static/reports"),
        ..Default::default()
    }
}

#[test]
fn test_offline_pipeline_produces_record_and_report() {
    let checkout = fixture_checkout();
    let workspace = tempfile::tempdir().unwrap();
    let config = workspace_config(&workspace);

    // Empty font list forces the ASCII rendering tier.
    let pipeline = ReviewPipeline::new(config.clone())
        .offline()
        .with_font_candidates(Vec::new());

    let outcome = pipeline
        .run_checkout("https://example.com/fixture.git", checkout.path())
        .expect("offline pipeline should not fail");

    assert!(outcome.score > 0.0 && outcome.score <= 10.0);
    // At least the summary suggestion is always present.
    assert!(outcome.suggestions >= 1);

    let rel = outcome.report_path.expect("report should render");
    let re = regex::Regex::new(r"^reports/devmate_report_\d+\.pdf$").unwrap();
    assert!(re.is_match(&rel), "unexpected report path: {}", rel);

    let filename = PathBuf::from(&rel);
    let on_disk = config.reports_dir.join(filename.file_name().unwrap());
    let bytes = std::fs::read(&on_disk).expect("report file should exist");
    assert!(bytes.starts_with(b"%PDF"));

    let store = RecordStore::open(&config.database).unwrap();
    let record = store.get(&outcome.record_id).unwrap().unwrap();
    assert_eq!(record.state, RecordState::Complete);
    assert_eq!(record.report_path.as_deref(), Some(rel.as_str()));
    assert_eq!(record.score, outcome.score);
    assert_eq!(record.repository, "https://example.com/fixture.git");
}

#[test]
fn test_rendering_failure_leaves_failed_record() {
    let checkout = fixture_checkout();
    let workspace = tempfile::tempdir().unwrap();
    let mut config = workspace_config(&workspace);

    // Point the reports dir at an existing file so both rendering tiers
    // fail to create it.
    let blocker = workspace.path().join("blocked");
    std::fs::write(&blocker, "not a directory").unwrap();
    config.reports_dir = blocker;

    let pipeline = ReviewPipeline::new(config.clone())
        .offline()
        .with_font_candidates(Vec::new());

    let outcome = pipeline
        .run_checkout("https://example.com/fixture.git", checkout.path())
        .expect("pipeline itself should survive a rendering failure");

    assert!(outcome.report_path.is_none());

    // The placeholder record exists and is explicitly failed, not deleted.
    let store = RecordStore::open(&config.database).unwrap();
    let record = store.get(&outcome.record_id).unwrap().unwrap();
    assert_eq!(record.state, RecordState::Failed);
    assert!(record.report_path.is_none());
    assert!(record.score > 0.0 && record.score <= 10.0);
}

#[test]
fn test_empty_checkout_still_scores() {
    let checkout = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    let config = workspace_config(&workspace);

    let pipeline = ReviewPipeline::new(config)
        .offline()
        .with_font_candidates(Vec::new());

    let outcome = pipeline
        .run_checkout("https://example.com/empty.git", checkout.path())
        .unwrap();

    // No findings at all: only the summary suggestion, perfect score.
    assert_eq!(outcome.suggestions, 1);
    assert_eq!(outcome.score, 10.0);
    assert!(outcome.report_path.is_some());
}

#[test]
fn test_clone_failure_surfaces() {
    let workspace = tempfile::tempdir().unwrap();
    let config = workspace_config(&workspace);

    let pipeline = ReviewPipeline::new(config.clone()).offline();
    let err = pipeline
        .run("/nonexistent/devmate-missing-repo")
        .unwrap_err();
    assert!(err.to_string().contains("Failed to clone"));

    // Nothing was recorded: the failure happened before phase one.
    let store = RecordStore::open(&config.database).unwrap();
    assert!(store.list().unwrap().is_empty());
}
