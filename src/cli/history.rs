//! History command - list persisted analyses

use crate::config::DevmateConfig;
use crate::models::RecordState;
use crate::store::RecordStore;
use anyhow::Result;
use console::style;
use std::path::{Path, PathBuf};

pub fn run(limit: usize, db: Option<PathBuf>) -> Result<()> {
    let mut config = DevmateConfig::load(Path::new("."))?;
    if let Some(db) = db {
        config.database = db;
    }

    let store = RecordStore::open(&config.database)?;
    let records = store.list()?;

    if records.is_empty() {
        println!("No analyses recorded yet. Run `devmate <repo-url>` first.");
        return Ok(());
    }

    for record in records.iter().take(limit) {
        let state = match record.state {
            RecordState::Complete => style("complete").green(),
            RecordState::Pending => style("pending ").yellow(),
            RecordState::Failed => style("failed  ").red(),
        };
        println!(
            "{}  {:>5}  {}  {}",
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            format!("{:.2}", record.score),
            state,
            record.repository
        );
        if let Some(path) = &record.report_path {
            println!("{:>19}  {}", "", style(path).dim());
        }
    }

    Ok(())
}
