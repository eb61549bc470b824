//! release-picker binary entrypoint

mod cli;

use anstream::eprintln;
use clap::Parser;
use cli::Cli;
use cli::style::Stylize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    match cli::pick::run_pick(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".error());
            ExitCode::FAILURE
        }
    }
}
