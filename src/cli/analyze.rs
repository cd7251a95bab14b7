//! Analyze command - run the full review pipeline

use crate::config::DevmateConfig;
use crate::git;
use crate::pipeline::ReviewPipeline;
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct AnalyzeArgs {
    pub repository: String,
    pub budget: Option<u32>,
    pub model: Option<String>,
    pub offline: bool,
    pub db: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
    pub keep_checkout: bool,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let mut config = DevmateConfig::load(Path::new("."))?;
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(db) = args.db {
        config.database = db;
    }
    if let Some(dir) = args.reports_dir {
        config.reports_dir = dir;
    }

    let mut pipeline = ReviewPipeline::new(config);
    if args.offline {
        pipeline = pipeline.offline();
    }
    if let Some(budget) = args.budget {
        pipeline = pipeline.with_budget(budget);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}").expect("valid spinner template"),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Reviewing {}", args.repository));

    let target = Path::new(&args.repository);
    let outcome = if target.is_dir() {
        pipeline.run_checkout(&args.repository, target)
    } else {
        pipeline.run(&args.repository)
    };
    spinner.finish_and_clear();
    let outcome = outcome?;

    if let Some(checkout) = &outcome.checkout {
        if args.keep_checkout {
            println!("Checkout kept at {}", checkout.display());
        } else {
            git::clean_checkout(checkout);
        }
    }

    println!(
        "{} {}",
        style("Score:").bold(),
        style(format!("{:.2}/10", outcome.score)).cyan().bold()
    );
    println!("{} {}", style("Suggestions:").bold(), outcome.suggestions);
    match &outcome.report_path {
        Some(path) => println!("{} {}", style("Report:").bold(), path),
        None => println!(
            "{}",
            style("Report generation failed; record marked as failed.").red()
        ),
    }
    println!("Run `devmate history` to list past analyses.");

    Ok(())
}
