//! CLI command definitions and handlers

mod analyze;
mod doctor;
mod history;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DevMate - AI-assisted repository review
#[derive(Parser, Debug)]
#[command(name = "devmate")]
#[command(
    version,
    about = "AI-assisted repository review — static analysis, model-backed explanations, scored PDF reports",
    long_about = "DevMate clones a repository, runs pylint, bandit, and radon against it, \
explains the findings with a budgeted reviewer model (falling back to rule-based \
hints offline), and renders a scored PDF report.\n\n\
Run with a repository URL to analyze it:\n  \
devmate https://github.com/psf/requests.git",
    after_help = "\
Examples:
  devmate https://github.com/psf/requests.git   Clone and analyze a repository
  devmate analyze . --offline                   Analyze the current directory without a model
  devmate analyze <url> --budget 4              Cap the reasoning pass at 4 model calls
  devmate history                               List past analyses, newest first
  devmate doctor                                Check analyzer tools and credentials"
)]
pub struct Cli {
    /// Repository URL or local path (shortcut for `devmate analyze`)
    pub repository: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a repository and generate a scored PDF report
    Analyze {
        /// Repository URL or local path
        repository: String,

        /// Model-call budget for the reasoning pass
        #[arg(long)]
        budget: Option<u32>,

        /// Reviewer model name
        #[arg(long)]
        model: Option<String>,

        /// Skip the reviewer model entirely (rule-based hints only)
        #[arg(long)]
        offline: bool,

        /// Record database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Directory for report PDFs
        #[arg(long)]
        reports_dir: Option<PathBuf>,

        /// Keep the temporary checkout on disk
        #[arg(long)]
        keep_checkout: bool,
    },

    /// List past analyses, newest first
    History {
        /// Maximum records to show
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Record database path
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Check analyzer tools and reviewer credentials
    Doctor,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Analyze {
            repository,
            budget,
            model,
            offline,
            db,
            reports_dir,
            keep_checkout,
        }) => analyze::run(analyze::AnalyzeArgs {
            repository,
            budget,
            model,
            offline,
            db,
            reports_dir,
            keep_checkout,
        }),
        Some(Commands::History { limit, db }) => history::run(limit, db),
        Some(Commands::Doctor) => doctor::run(),
        None => match cli.repository {
            Some(repository) => analyze::run(analyze::AnalyzeArgs {
                repository,
                ..Default::default()
            }),
            None => Err(anyhow!(
                "No repository given. Try `devmate <repo-url>` or `devmate --help`."
            )),
        },
    }
}
