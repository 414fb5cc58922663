// sieve/src/commands/run.rs
//
// USE CASE: Run the reconciliation pipeline.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use sieve_core::application::run_pipeline;
use sieve_core::infrastructure::adapters::{CsvStore, HttpProber};
use sieve_core::infrastructure::config::project::load_project_config;
use sieve_core::ports::UrlProber;

pub async fn execute(project_dir: PathBuf, probe_urls: bool) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    println!("   Project: {} (v{})", config.name, config.version);
    tracing::debug!(stages = config.stages.len(), inputs = ?config.inputs, "Configuration loaded");

    // B. Instantiate the adapters
    let store = CsvStore::new(config.delimiter, config.na_values.clone())?;
    let prober = if probe_urls || config.reachability.enabled {
        println!(
            "   URL probing: {} workers, {}s timeout 🌐",
            config.reachability.workers, config.reachability.timeout_secs
        );
        Some(
            HttpProber::new(Duration::from_secs(config.reachability.timeout_secs))
                .context("Failed to build the HTTP client")?,
        )
    } else {
        None
    };

    // C. Run the Pipeline (Application Layer)
    let result = run_pipeline(
        &project_dir,
        &config,
        &store,
        prober.as_ref().map(|p| p as &dyn UrlProber),
    )
    .await;

    match result {
        Ok(run_res) => {
            if run_res.success {
                println!("\n✨ SUCCESS! Pipeline finished in {:.2?}", start.elapsed());
            } else {
                eprintln!("\n❌ FAILURE. Run did not complete.");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("\n💥 CRITICAL PIPELINE ERROR: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
