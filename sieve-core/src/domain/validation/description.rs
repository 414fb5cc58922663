// sieve-core/src/domain/validation/description.rs

use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::table::{CleanResult, RecordTable, Value};
use crate::domain::validation::{CleanStrategy, Verdict};

pub const DEFAULT_MIN_LENGTH: usize = 20;
pub const DEFAULT_MIN_WORDS: usize = 3;
pub const ISSUES_COLUMN: &str = "description_issues";

pub fn default_placeholders() -> Vec<String> {
    ["n/a", "tbd", "coming soon", "see website", "no description", "lorem ipsum"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionIssue {
    TooShort,
    FewWords,
    Meaningless,
}

impl fmt::Display for DescriptionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TooShort => "too_short",
            Self::FewWords => "few_words",
            Self::Meaningless => "meaningless",
        })
    }
}

pub fn issue_labels(issues: &[DescriptionIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct DescriptionValidator {
    field: String,
    min_length: usize,
    min_words: usize,
    placeholders: Vec<String>,
}

impl DescriptionValidator {
    pub fn new(field: impl Into<String>, min_length: usize, min_words: usize) -> Self {
        Self {
            field: field.into(),
            min_length,
            min_words,
            placeholders: default_placeholders(),
        }
    }

    /// Replaces the placeholder phrase set. Phrases are matched lowercased.
    pub fn with_placeholders(mut self, placeholders: Vec<String>) -> Self {
        self.placeholders = placeholders.into_iter().map(|p| p.to_lowercase()).collect();
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// All failing checks at once. A missing or blank description is `Missing` and
    /// nothing else.
    pub fn assess(&self, value: &Value) -> Verdict<Vec<DescriptionIssue>> {
        if value.is_missing() {
            return Verdict::Missing;
        }
        let raw = value.to_string();
        let text = raw.trim();
        if text.is_empty() {
            return Verdict::Missing;
        }

        let mut issues = Vec::new();
        if text.chars().count() < self.min_length {
            issues.push(DescriptionIssue::TooShort);
        }
        if text.split_whitespace().count() < self.min_words {
            issues.push(DescriptionIssue::FewWords);
        }
        let lower = text.to_lowercase();
        if self.placeholders.iter().any(|p| lower.contains(p.as_str())) {
            issues.push(DescriptionIssue::Meaningless);
        }

        if issues.is_empty() {
            Verdict::Valid
        } else {
            Verdict::Invalid(issues)
        }
    }

    pub fn assess_table(
        &self,
        table: &RecordTable,
    ) -> Result<Vec<Verdict<Vec<DescriptionIssue>>>, DomainError> {
        let col = table.column_index(&self.field)?;
        Ok(table.column(col).map(|v| self.assess(v)).collect())
    }

    /// Deficient records (missing included), annotated with a `description_issues`
    /// column holding `missing` or the comma-joined reasons.
    pub fn flag_descriptions(&self, table: &RecordTable) -> Result<RecordTable, DomainError> {
        let verdicts = self.assess_table(table)?;
        let rows: Vec<usize> = verdicts
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_valid())
            .map(|(i, _)| i)
            .collect();
        let labels = rows
            .iter()
            .map(|&i| match &verdicts[i] {
                Verdict::Invalid(issues) => Value::Text(issue_labels(issues)),
                _ => Value::text("missing"),
            })
            .collect();
        table.select(&rows).with_column(ISSUES_COLUMN, labels)
    }

    /// `Remove` drops records with a deficient description (missing ones stay).
    /// `Nullify` blanks the description and keeps the record.
    pub fn clean_descriptions(
        &self,
        table: &RecordTable,
        strategy: CleanStrategy,
    ) -> Result<CleanResult, DomainError> {
        let col = table.column_index(&self.field)?;
        let verdicts = self.assess_table(table)?;
        let split = table.split(|idx, _| !verdicts[idx].is_invalid());

        match strategy {
            CleanStrategy::Remove => Ok(split),
            CleanStrategy::Nullify => {
                let mut cleaned = table.clone();
                for (row, verdict) in verdicts.iter().enumerate() {
                    if verdict.is_invalid() {
                        cleaned.set(row, col, Value::Missing);
                    }
                }
                Ok(CleanResult {
                    cleaned,
                    rejected: split.rejected,
                })
            }
        }
    }
}

impl Default for DescriptionValidator {
    fn default() -> Self {
        Self::new("Description", DEFAULT_MIN_LENGTH, DEFAULT_MIN_WORDS)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn table() -> RecordTable {
        RecordTable::from_rows(
            ["Tool Name", "Description"],
            vec![
                vec![Value::text("A"), Value::text("A writing assistant for long-form content")],
                vec![Value::text("B"), Value::text("tbd")],
                vec![Value::text("C"), Value::Missing],
                vec![Value::text("D"), Value::text("Coming soon, stay tuned for the launch")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_placeholder_is_meaningless() {
        let v = DescriptionValidator::default();
        let verdict = v.assess(&Value::text("tbd"));
        let issues = verdict.reason().unwrap();
        assert!(issues.contains(&DescriptionIssue::Meaningless));
        assert!(issues.contains(&DescriptionIssue::TooShort));
    }

    #[test]
    fn test_few_words_without_too_short() {
        let v = DescriptionValidator::new("Description", 10, 3);
        assert_eq!(
            v.assess(&Value::text("Great tool.")),
            Verdict::Invalid(vec![DescriptionIssue::FewWords])
        );
    }

    #[test]
    fn test_empty_is_missing_alone() {
        let v = DescriptionValidator::default();
        assert_eq!(v.assess(&Value::Missing), Verdict::Missing);
        assert_eq!(v.assess(&Value::text("   ")), Verdict::Missing);
    }

    #[test]
    fn test_flag_adds_issue_column() {
        let flagged = DescriptionValidator::default().flag_descriptions(&table()).unwrap();
        assert_eq!(flagged.len(), 3);
        assert_eq!(
            flagged.value(0, ISSUES_COLUMN).unwrap(),
            &Value::text("too_short, few_words, meaningless")
        );
        assert_eq!(flagged.value(1, ISSUES_COLUMN).unwrap(), &Value::text("missing"));
        assert_eq!(flagged.value(2, ISSUES_COLUMN).unwrap(), &Value::text("meaningless"));
    }

    #[test]
    fn test_clean_strategies() {
        let v = DescriptionValidator::default();
        let removed = v.clean_descriptions(&table(), CleanStrategy::Remove).unwrap();
        assert_eq!(removed.cleaned.len(), 2);
        assert_eq!(removed.rejected.len(), 2);

        let nullified = v.clean_descriptions(&table(), CleanStrategy::Nullify).unwrap();
        assert_eq!(nullified.cleaned.len(), 4);
        assert_eq!(nullified.cleaned.value(1, "Description").unwrap(), &Value::Missing);
        assert_eq!(nullified.rejected.value(0, "Description").unwrap(), &Value::text("tbd"));
    }
}
