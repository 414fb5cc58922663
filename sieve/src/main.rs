// sieve/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug sieve run ... to see per-record details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            probe_urls,
        } => commands::run::execute(project_dir, probe_urls).await,
        Commands::Inspect {
            file,
            identity_key,
            limit,
        } => commands::inspect::execute(file, identity_key, limit),
        Commands::Probe {
            file,
            field,
            workers,
            timeout_secs,
        } => commands::probe::execute(file, field, workers, timeout_secs).await,
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    }
}
