// sieve/src/commands/inspect.rs
//
// USE CASE: Inspect a CSV file without changing it (schema, missing values,
// duplicate groups, rule outcomes, sample rows).

use std::path::PathBuf;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use sieve_core::application::{AuditRules, AuditSummary, audit_table};
use sieve_core::domain::resolver::{DuplicateResolver, ScoringFields};
use sieve_core::domain::validation::MissingDataHandler;
use sieve_core::infrastructure::adapters::CsvStore;
use sieve_core::ports::TableStore;

pub fn execute(file: PathBuf, identity_key: Vec<String>, limit: usize) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("❌ File not found at: {}", file.display());
    }

    let table = CsvStore::default().load(&file)?;
    println!(
        "\n🔍 Inspecting '{}': {} records, {} fields",
        file.display(),
        table.len(),
        table.schema().len()
    );

    // Schema + missing values
    let mut schema = new_table();
    schema.set_header(vec!["Field", "Missing", "%"]);
    for col in MissingDataHandler::missing_summary(&table) {
        schema.add_row(vec![
            col.column,
            col.missing.to_string(),
            format!("{:.1}", col.percentage),
        ]);
    }
    println!("{schema}");

    // Duplicate groups
    if !identity_key.is_empty() {
        let resolver = DuplicateResolver::new(identity_key.clone(), ScoringFields::default())?;
        let groups = resolver.find_duplicates(&table)?;
        let surplus: usize = groups.iter().map(|g| g.rows.len() - 1).sum();
        println!(
            "🧬 Identity key [{}]: {} duplicate group(s), {} record(s) would be removed",
            identity_key.join(", "),
            groups.len(),
            surplus
        );
        for group in groups.iter().take(limit) {
            let rows: Vec<String> = group.rows.iter().map(|r| r.to_string()).collect();
            println!("   ➜ rows {}", rows.join(", "));
        }
    }

    // Rule outcomes
    let audits = audit_table(&table, &AuditRules::standard()?)?;
    let summary = AuditSummary::from_audits(&audits);
    let mut outcomes = new_table();
    outcomes.set_header(vec!["Check", "Records"]);
    for (check, count) in [
        ("clean", summary.clean),
        ("incomplete", summary.incomplete),
        ("invalid url", summary.invalid_urls),
        ("invalid year", summary.invalid_years),
        ("invalid rating/reviews", summary.invalid_numeric),
        ("deficient description", summary.deficient_descriptions),
    ] {
        outcomes.add_row(vec![check.to_string(), count.to_string()]);
    }
    println!("{outcomes}");

    // Sample rows
    println!("   --- Rows (Limit {}) ---", limit);
    let mut sample = new_table();
    sample.set_header(table.fields().to_vec());
    for record in table.records().iter().take(limit) {
        sample.add_row(record.values().iter().map(|v| v.to_string()).collect::<Vec<_>>());
    }
    println!("{sample}");

    Ok(())
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}
