// sieve/src/commands/probe.rs
//
// USE CASE: Check URL reachability of a CSV file, without writing anything.

use std::path::PathBuf;
use std::time::Duration;

use sieve_core::application::check_reachability;
use sieve_core::domain::validation::UrlValidator;
use sieve_core::infrastructure::adapters::{CsvStore, HttpProber};
use sieve_core::ports::TableStore;

pub async fn execute(
    file: PathBuf,
    field: String,
    workers: usize,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let table = CsvStore::default().load(&file)?;
    let validator = UrlValidator::new(field)?;
    let timeout = Duration::from_secs(timeout_secs);
    let prober = HttpProber::new(timeout)?;

    println!(
        "🌐 Probing '{}' of {} records ({} workers, {}s timeout)...",
        validator.field(),
        table.len(),
        workers,
        timeout_secs
    );
    let results = check_reachability(&table, &validator, &prober, workers, timeout).await?;

    for (url, ok) in &results.by_url {
        if !ok {
            println!("   ❌ {}", url);
        }
    }
    println!(
        "✨ {} URL(s) probed, {} unreachable",
        results.probed(),
        results.unreachable()
    );
    Ok(())
}
