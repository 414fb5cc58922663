// sieve-core/src/application/audit.rs

// Read-only view: every rule is evaluated on every record, nothing is removed.

use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::project::{ProjectConfig, StageConfig};
use crate::domain::table::RecordTable;
use crate::domain::validation::{
    DescriptionIssue, DescriptionValidator, MissingDataHandler, NumericValidator,
    RecordNumericVerdict, UrlIssue, UrlValidator, Verdict, YearIssue, YearValidator,
};

pub struct AuditRules {
    url: UrlValidator,
    year: YearValidator,
    numeric: NumericValidator,
    description: DescriptionValidator,
    missing: MissingDataHandler,
}

impl AuditRules {
    /// Default field names and bounds.
    pub fn standard() -> Result<Self, DomainError> {
        Ok(Self {
            url: UrlValidator::new("Website")?,
            year: YearValidator::new("Launch Year", None, None)?,
            numeric: NumericValidator::new("average_rating", "review_count", 0.0, 5.0)?,
            description: DescriptionValidator::default(),
            missing: MissingDataHandler::default(),
        })
    }

    /// Uses the first configured stage of each kind; kinds not configured keep
    /// their standard rule.
    pub fn from_config(config: &ProjectConfig) -> Result<Self, DomainError> {
        let mut rules = Self::standard()?;
        let mut seen = std::collections::HashSet::new();
        for stage in &config.stages {
            if !seen.insert(stage.name()) {
                continue;
            }
            match stage {
                StageConfig::Urls { field, .. } => rules.url = UrlValidator::new(field.clone())?,
                StageConfig::Years {
                    field,
                    min_year,
                    max_year,
                    ..
                } => rules.year = YearValidator::new(field.clone(), *min_year, *max_year)?,
                StageConfig::Numeric {
                    rating_field,
                    review_field,
                    rating_min,
                    rating_max,
                    ..
                } => {
                    rules.numeric = NumericValidator::new(
                        rating_field.clone(),
                        review_field.clone(),
                        *rating_min,
                        *rating_max,
                    )?
                }
                StageConfig::Descriptions {
                    field,
                    min_length,
                    min_words,
                    placeholders,
                    ..
                } => {
                    let mut v = DescriptionValidator::new(field.clone(), *min_length, *min_words);
                    if let Some(p) = placeholders {
                        v = v.with_placeholders(p.clone());
                    }
                    rules.description = v;
                }
                StageConfig::Missing {
                    essential, flagged, ..
                } => rules.missing = MissingDataHandler::new(essential.clone(), flagged.clone()),
                _ => {}
            }
        }
        Ok(rules)
    }
}

/// Outcomes of every rule for one record. `None` when the rule's field is not
/// in the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordAudit {
    pub row: usize,
    pub incomplete: bool,
    pub url: Option<Verdict<UrlIssue>>,
    pub year: Option<Verdict<YearIssue>>,
    pub numeric: RecordNumericVerdict,
    pub description: Option<Verdict<Vec<DescriptionIssue>>>,
}

impl RecordAudit {
    pub fn issues(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.incomplete {
            out.push("incomplete".to_string());
        }
        if let Some(Verdict::Invalid(r)) = &self.url {
            out.push(format!("url:{}", r));
        }
        if let Some(Verdict::Invalid(r)) = &self.year {
            out.push(format!("year:{}", r));
        }
        if let Some(Verdict::Invalid(r)) = &self.numeric.rating {
            out.push(format!("rating:{}", r));
        }
        if let Some(Verdict::Invalid(r)) = &self.numeric.review_count {
            out.push(format!("review_count:{}", r));
        }
        match &self.description {
            Some(Verdict::Invalid(issues)) => {
                for issue in issues {
                    out.push(format!("description:{}", issue));
                }
            }
            Some(Verdict::Missing) => out.push("description:missing".to_string()),
            _ => {}
        }
        out
    }

    pub fn is_clean(&self) -> bool {
        self.issues().is_empty()
    }
}

pub fn audit_table(table: &RecordTable, rules: &AuditRules) -> Result<Vec<RecordAudit>, DomainError> {
    let present = |field: &str| table.schema().contains(field);

    let incomplete = rules.missing.flag_missing(table)?;
    let urls = if present(rules.url.field()) {
        Some(rules.url.classify_table(table)?)
    } else {
        None
    };
    let years = if present(rules.year.field()) {
        Some(rules.year.classify_table(table)?)
    } else {
        None
    };
    let numeric = rules.numeric.classify_table(table);
    let descriptions = if present(rules.description.field()) {
        Some(rules.description.assess_table(table)?)
    } else {
        None
    };

    Ok((0..table.len())
        .map(|row| RecordAudit {
            row,
            incomplete: incomplete[row],
            url: urls.as_ref().map(|v| v[row].clone()),
            year: years.as_ref().map(|v| v[row].clone()),
            numeric: numeric[row].clone(),
            description: descriptions.as_ref().map(|v| v[row].clone()),
        })
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditSummary {
    pub records: usize,
    pub clean: usize,
    pub incomplete: usize,
    pub invalid_urls: usize,
    pub invalid_years: usize,
    pub invalid_numeric: usize,
    pub deficient_descriptions: usize,
}

impl AuditSummary {
    pub fn from_audits(audits: &[RecordAudit]) -> Self {
        let mut summary = Self {
            records: audits.len(),
            ..Self::default()
        };
        for a in audits {
            summary.clean += usize::from(a.is_clean());
            summary.incomplete += usize::from(a.incomplete);
            summary.invalid_urls += usize::from(a.url.as_ref().is_some_and(Verdict::is_invalid));
            summary.invalid_years += usize::from(a.year.as_ref().is_some_and(Verdict::is_invalid));
            summary.invalid_numeric += usize::from(a.numeric.is_invalid());
            summary.deficient_descriptions +=
                usize::from(a.description.as_ref().is_some_and(|v| !v.is_valid()));
        }
        summary
    }
}
