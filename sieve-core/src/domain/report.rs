// sieve-core/src/domain/report.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::table::RecordTable;

pub mod metrics {
    pub const ORIGINAL_ROWS: &str = "original_rows";
    pub const ORIGINAL_COLUMNS: &str = "original_columns";
    pub const DUPLICATES_REMOVED: &str = "duplicates_removed";
    pub const FIELDS_MERGED: &str = "fields_merged";
    pub const MISSING_RECORDS_DROPPED: &str = "missing_records_dropped";
    pub const MISSING_VALUES_FILLED: &str = "missing_values_filled";
    pub const MISSING_FLAGGED_PREFIX: &str = "missing_flagged";
    pub const INVALID_URLS_REMOVED: &str = "invalid_urls_removed";
    pub const INVALID_YEARS_FOUND: &str = "invalid_years_found";
    pub const INVALID_YEARS_REMOVED: &str = "invalid_years_removed";
    pub const INVALID_YEARS_NULLIFIED: &str = "invalid_years_nullified";
    pub const YEARS_CORRECTED: &str = "years_corrected";
    pub const INVALID_RATINGS_FOUND: &str = "invalid_ratings_found";
    pub const INVALID_REVIEW_COUNTS_FOUND: &str = "invalid_review_counts_found";
    pub const INVALID_NUMERIC_REMOVED: &str = "invalid_numeric_removed";
    pub const INVALID_NUMERIC_NULLIFIED: &str = "invalid_numeric_nullified";
    pub const DEFICIENT_DESCRIPTIONS_FOUND: &str = "deficient_descriptions_found";
    pub const DEFICIENT_DESCRIPTIONS_REMOVED: &str = "deficient_descriptions_removed";
    pub const DEFICIENT_DESCRIPTIONS_NULLIFIED: &str = "deficient_descriptions_nullified";
    pub const OUTLIERS_REMOVED: &str = "outliers_removed";
    pub const PRICING_NORMALIZED: &str = "pricing_normalized";
    pub const RECORDS_RECATEGORIZED: &str = "records_recategorized";
    pub const URLS_PROBED: &str = "urls_probed";
    pub const URLS_UNREACHABLE: &str = "urls_unreachable";
    pub const TEXT_VALUES_STANDARDIZED: &str = "text_values_standardized";
    pub const COLUMNS_REMOVED: &str = "columns_removed";
    pub const FINAL_ROWS: &str = "final_rows";
    pub const FINAL_COLUMNS: &str = "final_columns";
}

/// Named counters accumulated over one run. Keys serialize in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciliationReport {
    metrics: BTreeMap<String, u64>,
}

impl ReconciliationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: u64) {
        self.metrics.insert(name.into(), value);
    }

    /// Adds to a counter, creating it at zero first.
    pub fn add(&mut self, name: impl Into<String>, value: u64) {
        *self.metrics.entry(name.into()).or_insert(0) += value;
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.metrics.get(name).copied()
    }

    pub fn metrics(&self) -> &BTreeMap<String, u64> {
        &self.metrics
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// `missing_flagged.<field>`
    pub fn flagged_key(field: &str) -> String {
        format!("{}.{}", metrics::MISSING_FLAGGED_PREFIX, field)
    }

    /// Share of input rows that did not make it to the output, in percent.
    pub fn rows_removed_pct(&self) -> f64 {
        let original = self.get(metrics::ORIGINAL_ROWS).unwrap_or(0);
        let fin = self.get(metrics::FINAL_ROWS).unwrap_or(0);
        if original == 0 {
            return 0.0;
        }
        original.saturating_sub(fin) as f64 / original as f64 * 100.0
    }
}

/// Distribution summary of a cleaned table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetStatistics {
    pub total: usize,
    pub categories: BTreeMap<String, usize>,
    pub pricing_models: BTreeMap<String, usize>,
    pub launch_years: BTreeMap<String, usize>,
}

impl DatasetStatistics {
    /// Fields absent from the table leave their distribution empty. Missing
    /// categories and pricing models count as `Unknown`; missing years are skipped.
    pub fn compute(
        table: &RecordTable,
        category_field: &str,
        pricing_field: &str,
        year_field: &str,
    ) -> Self {
        let count = |field: &str, include_missing: bool| {
            let mut counts = BTreeMap::new();
            if let Some(col) = table.schema().position(field) {
                for value in table.column(col) {
                    let key = if value.is_missing() {
                        if !include_missing {
                            continue;
                        }
                        "Unknown".to_string()
                    } else {
                        value.to_string()
                    };
                    *counts.entry(key).or_insert(0) += 1;
                }
            }
            counts
        };

        Self {
            total: table.len(),
            categories: count(category_field, true),
            pricing_models: count(pricing_field, true),
            launch_years: count(year_field, false),
        }
    }

    /// Entries sorted by descending count, then by name.
    pub fn top(counts: &BTreeMap<String, usize>, limit: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}
