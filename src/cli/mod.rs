//! CLI layer: argument parsing, styling, and the pick flow.

pub mod context;
pub mod pick;
pub mod style;

use clap::Parser;
use std::path::PathBuf;

/// Assemble hand-picked release branches from merged PRs and commits.
///
/// With no identifiers, discovers unreleased changes on the integration
/// branch and prompts for a selection. With identifiers, resolves them
/// directly.
#[derive(Debug, Parser)]
#[command(
    name = "release-picker",
    version,
    about = "Assemble hand-picked release branches from merged PRs and commits"
)]
pub struct Cli {
    /// PR numbers or commit hashes to include; prompts interactively when omitted
    pub identifiers: Vec<String>,

    /// Path to the repository (defaults to the current directory)
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Remote to push to (defaults to configuration, then "origin")
    #[arg(long)]
    pub remote: Option<String>,

    /// Integration branch to pick from (defaults to configuration)
    #[arg(long)]
    pub integration: Option<String>,

    /// Print the resolved selection and planned order without changing anything
    #[arg(long)]
    pub dry_run: bool,
}
