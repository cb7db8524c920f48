//! Binary crate for the `openlab` dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive tab loop and configuration prompts
//! - Human-friendly text rendering of tables and charts

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod configure;
mod dashboard;
mod render;

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// One action at a time: requests are awaited in sequence on a single thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}
