// sieve-core/src/application/stages.rs

use tracing::{info, instrument};

use crate::domain::enrichment::{Categorizer, CategoryRule, PricingNormalizer};
use crate::domain::error::DomainError;
use crate::domain::outliers::OutlierFilter;
use crate::domain::project::StageConfig;
use crate::domain::report::{ReconciliationReport, metrics};
use crate::domain::table::{CleanResult, RecordTable, Value};
use crate::domain::validation::{
    CleanStrategy, DescriptionValidator, MissingDataHandler, MissingStrategy, NumericValidator,
    UrlValidator, YearValidator,
};

/// What one stage produced: the table handed to the next stage, the records it
/// rejected or flagged, and its counters.
#[derive(Debug)]
pub struct StageOutcome {
    pub cleaned: RecordTable,
    pub rejected: RecordTable,
    pub metrics: Vec<(String, u64)>,
}

impl StageOutcome {
    fn new(result: CleanResult) -> Self {
        Self {
            cleaned: result.cleaned,
            rejected: result.rejected,
            metrics: Vec::new(),
        }
    }

    /// Enrichment stages keep every record and reject nothing.
    fn enriched(table: &RecordTable, cleaned: RecordTable) -> Self {
        Self {
            cleaned,
            rejected: table.empty_like(),
            metrics: Vec::new(),
        }
    }

    fn metric(mut self, name: impl Into<String>, value: usize) -> Self {
        self.metrics.push((name.into(), value as u64));
        self
    }

    pub fn record_into(&self, report: &mut ReconciliationReport) {
        for (name, value) in &self.metrics {
            report.add(name.clone(), *value);
        }
    }
}

fn strategy_metric(strategy: CleanStrategy, removed: &str, nullified: &str) -> String {
    match strategy {
        CleanStrategy::Remove => removed.to_string(),
        CleanStrategy::Nullify => nullified.to_string(),
    }
}

/// Runs one configured stage against `table`.
#[instrument(skip_all, fields(stage = stage.name()))]
pub fn apply_stage(
    stage: &StageConfig,
    table: &RecordTable,
    categories: &[CategoryRule],
) -> Result<StageOutcome, DomainError> {
    let outcome = match stage {
        StageConfig::Missing {
            strategy,
            essential,
            flagged,
            columns,
            value,
            text_columns,
        } => {
            let mut handler = MissingDataHandler::new(essential.clone(), flagged.clone())
                .with_text_columns(text_columns.clone());
            if let Some(raw) = value {
                handler = handler.with_constant(Value::parse_cell(raw, &[]));
            }
            let flagged_counts = handler.flagged_counts(table)?;
            let (result, filled) = handler.apply(table, *strategy, columns.as_deref())?;
            let dropped = result.rejected.len();
            let mut outcome = StageOutcome::new(result);
            outcome = match strategy {
                MissingStrategy::Drop => outcome.metric(metrics::MISSING_RECORDS_DROPPED, dropped),
                _ => outcome.metric(metrics::MISSING_VALUES_FILLED, filled),
            };
            for (field, count) in flagged_counts {
                outcome = outcome.metric(ReconciliationReport::flagged_key(&field), count);
            }
            outcome
        }

        StageConfig::Urls { field, rewrite } => {
            let result = UrlValidator::new(field.clone())?.clean_urls(table, *rewrite)?;
            let removed = result.rejected.len();
            StageOutcome::new(result).metric(metrics::INVALID_URLS_REMOVED, removed)
        }

        StageConfig::Years {
            field,
            min_year,
            max_year,
            strategy,
            correct,
        } => {
            let validator = YearValidator::new(field.clone(), *min_year, *max_year)?;
            let (input, corrected) = if *correct {
                let (fixed, corrections) = validator.correct_years(table)?;
                (fixed, corrections.len())
            } else {
                (table.clone(), 0)
            };
            let result = validator.clean_years(&input, *strategy)?;
            let found = result.rejected.len();
            let mut outcome = StageOutcome::new(result)
                .metric(metrics::INVALID_YEARS_FOUND, found)
                .metric(
                    strategy_metric(
                        *strategy,
                        metrics::INVALID_YEARS_REMOVED,
                        metrics::INVALID_YEARS_NULLIFIED,
                    ),
                    found,
                );
            if *correct {
                outcome = outcome.metric(metrics::YEARS_CORRECTED, corrected);
            }
            outcome
        }

        StageConfig::Numeric {
            rating_field,
            review_field,
            rating_min,
            rating_max,
            strategy,
        } => {
            let validator = NumericValidator::new(
                rating_field.clone(),
                review_field.clone(),
                *rating_min,
                *rating_max,
            )?;
            let verdicts = validator.classify_table(table);
            let bad_ratings = verdicts
                .iter()
                .filter(|v| v.rating.as_ref().is_some_and(|r| r.is_invalid()))
                .count();
            let bad_reviews = verdicts
                .iter()
                .filter(|v| v.review_count.as_ref().is_some_and(|r| r.is_invalid()))
                .count();
            let result = validator.clean_records(table, *strategy)?;
            let affected = result.rejected.len();
            StageOutcome::new(result)
                .metric(metrics::INVALID_RATINGS_FOUND, bad_ratings)
                .metric(metrics::INVALID_REVIEW_COUNTS_FOUND, bad_reviews)
                .metric(
                    strategy_metric(
                        *strategy,
                        metrics::INVALID_NUMERIC_REMOVED,
                        metrics::INVALID_NUMERIC_NULLIFIED,
                    ),
                    affected,
                )
        }

        StageConfig::Descriptions {
            field,
            min_length,
            min_words,
            placeholders,
            strategy,
        } => {
            let mut validator = DescriptionValidator::new(field.clone(), *min_length, *min_words);
            if let Some(phrases) = placeholders {
                validator = validator.with_placeholders(phrases.clone());
            }
            // missing descriptions are deficient too
            let found = validator
                .assess_table(table)?
                .iter()
                .filter(|v| !v.is_valid())
                .count();
            match strategy {
                None => {
                    let flagged = validator.flag_descriptions(table)?;
                    StageOutcome {
                        cleaned: table.clone(),
                        rejected: flagged,
                        metrics: Vec::new(),
                    }
                    .metric(metrics::DEFICIENT_DESCRIPTIONS_FOUND, found)
                }
                Some(strategy) => {
                    let result = validator.clean_descriptions(table, *strategy)?;
                    let affected = result.rejected.len();
                    StageOutcome::new(result)
                        .metric(metrics::DEFICIENT_DESCRIPTIONS_FOUND, found)
                        .metric(
                            strategy_metric(
                                *strategy,
                                metrics::DEFICIENT_DESCRIPTIONS_REMOVED,
                                metrics::DEFICIENT_DESCRIPTIONS_NULLIFIED,
                            ),
                            affected,
                        )
                }
            }
        }

        StageConfig::Outliers {
            columns,
            method,
            threshold,
        } => {
            let result =
                OutlierFilter::new(columns.clone(), method.with_threshold(*threshold)).filter(table)?;
            let removed = result.rejected.len();
            StageOutcome::new(result).metric(metrics::OUTLIERS_REMOVED, removed)
        }

        StageConfig::Categorize { field, text_fields } => {
            let categorizer = Categorizer::new(field.clone(), text_fields.clone(), categories.to_vec());
            let (cleaned, count) = categorizer.apply(table)?;
            StageOutcome::enriched(table, cleaned).metric(metrics::RECORDS_RECATEGORIZED, count)
        }

        StageConfig::Pricing { field } => {
            let (cleaned, count) = PricingNormalizer::new(field.clone()).apply(table)?;
            StageOutcome::enriched(table, cleaned).metric(metrics::PRICING_NORMALIZED, count)
        }
    };

    info!(
        kept = outcome.cleaned.len(),
        rejected = outcome.rejected.len(),
        "Stage finished"
    );
    Ok(outcome)
}
