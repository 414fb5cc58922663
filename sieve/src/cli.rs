// sieve/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(about = "Catalog record reconciliation: dedupe, validate, standardize", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs the reconciliation pipeline (Load -> Dedupe -> Stages -> Write)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Probe every valid URL and annotate reachability, whatever the config says
        #[arg(long)]
        probe_urls: bool,
    },

    /// 🔍 Inspects a CSV file (schema, missing values, duplicates, rule outcomes)
    Inspect {
        /// Path to the CSV file
        file: PathBuf,

        /// Fields forming the identity key, comma-separated
        #[arg(long, value_delimiter = ',')]
        identity_key: Vec<String>,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// 🌐 Checks which URLs of a CSV file answer
    Probe {
        /// Path to the CSV file
        file: PathBuf,

        /// Field holding the URL
        #[arg(long, default_value = "Website")]
        field: String,

        /// Maximum number of probes in flight
        #[arg(long, default_value = "16")]
        workers: usize,

        /// Per-request timeout
        #[arg(long, default_value = "5")]
        timeout_secs: u64,
    },

    /// 🧹 Cleans build artifacts (target/ folder)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}
