// sieve-core/src/application/pipeline.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, instrument};

use crate::error::SieveError;
use crate::ports::{TableStore, UrlProber};

// Application Services
use crate::application::reachability::{annotate, check_reachability};
use crate::application::stages::apply_stage;

// Domain
use crate::domain::error::DomainError;
use crate::domain::project::ProjectConfig;
use crate::domain::report::{DatasetStatistics, ReconciliationReport, metrics};
use crate::domain::resolver::DuplicateResolver;
use crate::domain::standardize::TextStandardizer;
use crate::domain::table::RecordTable;
use crate::domain::validation::UrlValidator;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RunResult {
    pub success: bool,
    pub project: String,
    pub input_rows: usize,
    pub output_rows: usize,
    pub rows_removed_pct: f64,
    pub rejected_files: Vec<String>,
    pub duration_ms: u128,
}

/// Everything a reconciliation run produced, before anything is written.
#[derive(Debug)]
pub struct PipelineOutput {
    pub cleaned: RecordTable,
    /// Rejected or flagged records per step, in execution order.
    pub rejected: Vec<(String, RecordTable)>,
    pub report: ReconciliationReport,
    pub statistics: Option<DatasetStatistics>,
}

/// Deduplication, configured stages in order, optional reachability annotation,
/// standardization, then column drops. Pure apart from the probes.
#[instrument(skip_all, fields(project = %config.name, rows = table.len()))]
pub async fn reconcile(
    table: RecordTable,
    config: &ProjectConfig,
    prober: Option<&dyn UrlProber>,
) -> Result<PipelineOutput, SieveError> {
    let mut report = ReconciliationReport::new();
    let mut rejected = Vec::new();
    report.set(metrics::ORIGINAL_ROWS, table.len() as u64);
    report.set(metrics::ORIGINAL_COLUMNS, table.schema().len() as u64);

    let mut table = table;

    if let Some(dedup) = &config.deduplicate {
        let mut resolver =
            DuplicateResolver::new(dedup.identity_key.clone(), dedup.scoring.clone())?;
        if dedup.merge {
            resolver = resolver.with_merge(dedup.merge_fields.clone());
        }
        let (result, merged) = resolver.resolve_with_merges(&table)?;
        info!(removed = result.rejected.len(), merged, "Duplicates resolved");
        report.set(metrics::DUPLICATES_REMOVED, result.rejected.len() as u64);
        if dedup.merge {
            report.set(metrics::FIELDS_MERGED, merged as u64);
        }
        rejected.push(("duplicates".to_string(), result.rejected));
        table = result.cleaned;
    }

    for stage in &config.stages {
        let outcome = apply_stage(stage, &table, &config.categories)?;
        outcome.record_into(&mut report);
        rejected.push((stage.name().to_string(), outcome.rejected));
        table = outcome.cleaned;
    }

    if let Some(prober) = prober {
        let settings = &config.reachability;
        let validator = UrlValidator::new(settings.field.clone())?;
        let results = check_reachability(
            &table,
            &validator,
            prober,
            settings.workers,
            Duration::from_secs(settings.timeout_secs),
        )
        .await?;
        report.set(metrics::URLS_PROBED, results.probed() as u64);
        report.set(metrics::URLS_UNREACHABLE, results.unreachable() as u64);
        table = annotate(&table, &validator, &results)?;
    }

    let standardizer = TextStandardizer::new(
        config.standardize.fields.clone(),
        config.standardize.case.clone(),
        config.standardize.encoding,
    )
    .with_remove_special(config.standardize.remove_special);
    if !standardizer.target_fields().is_empty() {
        let (standardized, changes) = standardizer.standardize(&table)?;
        let total: usize = changes.values().sum();
        report.set(metrics::TEXT_VALUES_STANDARDIZED, total as u64);
        table = standardized;
    }

    let statistics = config.statistics.as_ref().map(|s| {
        DatasetStatistics::compute(&table, &s.category_field, &s.pricing_field, &s.year_field)
    });

    let present = config
        .drop_columns
        .iter()
        .filter(|c| table.schema().contains(c))
        .count();
    table = table.drop_columns(&config.drop_columns);
    report.set(metrics::COLUMNS_REMOVED, present as u64);

    if config.snake_case_columns {
        table = table.rename_snake_case()?;
    }

    report.set(metrics::FINAL_ROWS, table.len() as u64);
    report.set(metrics::FINAL_COLUMNS, table.schema().len() as u64);

    Ok(PipelineOutput {
        cleaned: table,
        rejected,
        report,
        statistics,
    })
}

/// Loads the configured inputs, reconciles them and writes output, rejections
/// and reports under the project's target directory.
pub async fn run_pipeline(
    project_dir: &Path,
    config: &ProjectConfig,
    store: &dyn TableStore,
    prober: Option<&dyn UrlProber>,
) -> Result<RunResult, SieveError> {
    println!("🚀 Starting reconciliation of '{}'...", config.name);
    let start_time = std::time::Instant::now();

    // 1. SETUP
    let target_dir = project_dir.join(&config.target_path);
    if !target_dir.exists() {
        fs::create_dir_all(&target_dir)?;
    }

    // 2. LOAD
    println!("📥 Loading {} input(s)...", config.inputs.len());
    let mut loaded: Option<RecordTable> = None;
    for input in &config.inputs {
        let table = store.load(&resolve(project_dir, input))?;
        loaded = Some(match loaded {
            None => table,
            Some(acc) => acc.concat(table)?,
        });
    }
    let table = loaded.ok_or_else(|| {
        SieveError::Domain(DomainError::InvalidConfig("no inputs configured".into()))
    })?;
    let input_rows = table.len();
    println!("   📄 {} records, {} fields", input_rows, table.schema().len());

    // 3. RECONCILE
    println!(
        "🧹 Running {} stage(s){}...",
        config.stages.len(),
        if prober.is_some() { " with URL probing" } else { "" }
    );
    let output = reconcile(table, config, prober).await?;

    // 4. REJECTIONS (stale files from a previous run are cleared first)
    let rejected_dir = target_dir.join("rejected");
    if rejected_dir.exists() {
        fs::remove_dir_all(&rejected_dir)?;
    }
    let mut rejected_files = Vec::new();
    for (i, (name, rejected)) in output.rejected.iter().enumerate() {
        if rejected.is_empty() {
            continue;
        }
        let file_name = format!("{:02}_{}.csv", i + 1, name);
        store.save(rejected, &rejected_dir.join(&file_name))?;
        println!("   🗑️  {} record(s) set aside by '{}'", rejected.len(), name);
        rejected_files.push(format!("rejected/{}", file_name));
    }

    // 5. OUTPUT & REPORTS
    let output_path = resolve(project_dir, &config.output);
    store.save(&output.cleaned, &output_path)?;
    save_json(&target_dir.join("report.json"), &output.report)?;
    if let Some(statistics) = &output.statistics {
        save_json(&target_dir.join("statistics.json"), statistics)?;
    }

    let result = RunResult {
        success: true,
        project: config.name.clone(),
        input_rows,
        output_rows: output.cleaned.len(),
        rows_removed_pct: output.report.rows_removed_pct(),
        rejected_files,
        duration_ms: start_time.elapsed().as_millis(),
    };
    save_json(&target_dir.join("run_results.json"), &result)?;

    println!(
        "✨ {} -> {} records ({:.1}% removed) in {:.2?}",
        result.input_rows,
        result.output_rows,
        result.rows_removed_pct,
        start_time.elapsed()
    );
    println!("💾 Output written to {}", output_path.display());
    Ok(result)
}

fn resolve(project_dir: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

fn save_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), SieveError> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| SieveError::InternalError(format!("Serialization: {}", e)))?;
    crate::infrastructure::fs::atomic_write(path, content)?;
    Ok(())
}
