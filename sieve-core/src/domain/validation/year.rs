// sieve-core/src/domain/validation/year.rs

use chrono::Datelike;
use regex::Regex;
use std::fmt;
use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::table::{CleanResult, RecordTable, Value};
use crate::domain::validation::{CleanStrategy, Verdict};

pub const DEFAULT_MIN_YEAR: i64 = 1900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearIssue {
    Future,
    TooOld,
    NonNumeric,
}

impl fmt::Display for YearIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Future => "future",
            Self::TooOld => "too_old",
            Self::NonNumeric => "non_numeric",
        })
    }
}

/// A repaired year: `original` stays visible so nothing is discarded silently.
#[derive(Debug, Clone, PartialEq)]
pub struct YearCorrection {
    pub row: usize,
    pub original: Value,
    pub corrected: i64,
}

pub struct YearValidator {
    field: String,
    min_year: i64,
    max_year: i64,
    embedded_year: Regex,
}

impl YearValidator {
    /// Inclusive `[min_year, max_year]`. `max_year` defaults to the current year.
    pub fn new(
        field: impl Into<String>,
        min_year: Option<i64>,
        max_year: Option<i64>,
    ) -> Result<Self, DomainError> {
        let min_year = min_year.unwrap_or(DEFAULT_MIN_YEAR);
        let max_year = max_year.unwrap_or_else(|| i64::from(chrono::Local::now().year()));
        if min_year > max_year {
            return Err(DomainError::InvalidConfig(format!(
                "min year {} is after max year {}",
                min_year, max_year
            )));
        }
        let embedded_year = Regex::new(r"\b((?:19|20)\d{2})\b")
            .map_err(|e| DomainError::InvalidConfig(format!("year pattern: {}", e)))?;
        Ok(Self {
            field: field.into(),
            min_year,
            max_year,
            embedded_year,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.min_year, self.max_year)
    }

    /// Integer value of the cell, truncating floats. `None` when it does not parse.
    fn parse(value: &Value) -> Option<i64> {
        match value {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Value::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
            }
            _ => None,
        }
    }

    pub fn classify(&self, value: &Value) -> Verdict<YearIssue> {
        if value.is_missing() {
            return Verdict::Missing;
        }
        match Self::parse(value) {
            None => Verdict::Invalid(YearIssue::NonNumeric),
            Some(y) if y > self.max_year => Verdict::Invalid(YearIssue::Future),
            Some(y) if y < self.min_year => Verdict::Invalid(YearIssue::TooOld),
            Some(_) => Verdict::Valid,
        }
    }

    pub fn classify_table(&self, table: &RecordTable) -> Result<Vec<Verdict<YearIssue>>, DomainError> {
        let col = table.column_index(&self.field)?;
        Ok(table.column(col).map(|v| self.classify(v)).collect())
    }

    /// `Remove` drops invalid records. `Nullify` keeps every record and blanks the
    /// invalid year. The rejected side always holds the flagged records as they were.
    pub fn clean_years(
        &self,
        table: &RecordTable,
        strategy: CleanStrategy,
    ) -> Result<CleanResult, DomainError> {
        let col = table.column_index(&self.field)?;
        let verdicts = self.classify_table(table)?;
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

    /// Best-effort repair. Two-digit years are expanded around `max_year`; text
    /// holding an embedded 19xx/20xx year is reduced to it when that year is in
    /// bounds. Anything still past `max_year` is left for the caller to decide.
    pub fn correct_years(
        &self,
        table: &RecordTable,
    ) -> Result<(RecordTable, Vec<YearCorrection>), DomainError> {
        let col = table.column_index(&self.field)?;
        let mut corrected = table.clone();
        let mut corrections = Vec::new();

        for (row, value) in table.column(col).enumerate() {
            if let Some(year) = self.repair(value) {
                info!(row, original = %value, corrected = year, "Corrected launch year");
                corrections.push(YearCorrection {
                    row,
                    original: value.clone(),
                    corrected: year,
                });
                corrected.set(row, col, Value::Integer(year));
            }
        }
        Ok((corrected, corrections))
    }

    fn repair(&self, value: &Value) -> Option<i64> {
        if value.is_missing() {
            return None;
        }
        match Self::parse(value) {
            Some(y) if (0..=99).contains(&y) => {
                let pivot = self.max_year.rem_euclid(100);
                let century = self.max_year - pivot;
                let expanded = if y <= pivot { century + y } else { century - 100 + y };
                (expanded <= self.max_year).then_some(expanded)
            }
            Some(_) => None,
            None => {
                let text = value.as_text()?;
                let caps = self.embedded_year.captures(text)?;
                let year = caps.get(1)?.as_str().parse::<i64>().ok()?;
                (self.min_year..=self.max_year).contains(&year).then_some(year)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn validator(min: i64, max: i64) -> YearValidator {
        YearValidator::new("Launch Year", Some(min), Some(max)).unwrap()
    }

    fn table(values: Vec<Value>) -> RecordTable {
        RecordTable::from_rows(
            ["Tool Name", "Launch Year"],
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| vec![Value::text(format!("tool-{}", i)), v])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_classification() {
        let v = validator(2015, 2026);
        assert_eq!(v.classify(&Value::text("2031")), Verdict::Invalid(YearIssue::Future));
        assert_eq!(v.classify(&Value::text("abc")), Verdict::Invalid(YearIssue::NonNumeric));
        assert_eq!(v.classify(&Value::Missing), Verdict::Missing);
        assert_eq!(v.classify(&Value::text("2020")), Verdict::Valid);
        assert_eq!(v.classify(&Value::Integer(2014)), Verdict::Invalid(YearIssue::TooOld));
        assert_eq!(v.classify(&Value::Float(2020.9)), Verdict::Valid);
        assert_eq!(v.classify(&Value::text("2026.5")), Verdict::Valid);
    }

    #[test]
    fn test_default_max_is_current_year() {
        let v = YearValidator::new("Launch Year", None, None).unwrap();
        let current = i64::from(chrono::Local::now().year());
        assert_eq!(v.bounds(), (DEFAULT_MIN_YEAR, current));
        assert!(v.classify(&Value::Integer(current + 1)).is_invalid());
        assert!(YearValidator::new("Launch Year", Some(2030), Some(2020)).is_err());
    }

    #[test]
    fn test_remove_strategy_drops_invalid_keeps_missing() {
        let t = table(vec![
            Value::Integer(2020),
            Value::Integer(3099),
            Value::Missing,
            Value::text("soon"),
        ]);
        let res = validator(2015, 2026).clean_years(&t, CleanStrategy::Remove).unwrap();
        assert_eq!(res.cleaned.len(), 2);
        assert_eq!(res.rejected.len(), 2);
    }

    #[test]
    fn test_nullify_strategy_keeps_every_record() {
        let t = table(vec![Value::Integer(2020), Value::Integer(3099)]);
        let res = validator(2015, 2026).clean_years(&t, CleanStrategy::Nullify).unwrap();
        assert_eq!(res.cleaned.len(), 2);
        assert_eq!(res.cleaned.value(1, "Launch Year").unwrap(), &Value::Missing);
        assert_eq!(res.cleaned.value(0, "Launch Year").unwrap(), &Value::Integer(2020));
        // flagged record keeps its original value on the rejected side
        assert_eq!(res.rejected.value(0, "Launch Year").unwrap(), &Value::Integer(3099));
    }

    #[test]
    fn test_two_digit_years_are_expanded() {
        let t = table(vec![
            Value::Integer(23),
            Value::Integer(99),
            Value::Integer(3099),
            Value::text("Launched in 2021"),
            Value::Integer(2020),
        ]);
        let (fixed, corrections) = validator(1950, 2026).correct_years(&t).unwrap();

        assert_eq!(fixed.value(0, "Launch Year").unwrap(), &Value::Integer(2023));
        assert_eq!(fixed.value(1, "Launch Year").unwrap(), &Value::Integer(1999));
        // no confident repair for a far-future year
        assert_eq!(fixed.value(2, "Launch Year").unwrap(), &Value::Integer(3099));
        assert_eq!(fixed.value(3, "Launch Year").unwrap(), &Value::Integer(2021));
        assert_eq!(corrections.len(), 3);
        assert_eq!(
            corrections[0],
            YearCorrection {
                row: 0,
                original: Value::Integer(23),
                corrected: 2023
            }
        );
    }

    #[test]
    fn test_pivot_boundary() {
        let v = validator(1900, 2026);
        let (fixed, _) = v.correct_years(&table(vec![Value::Integer(26), Value::Integer(27)])).unwrap();
        assert_eq!(fixed.value(0, "Launch Year").unwrap(), &Value::Integer(2026));
        assert_eq!(fixed.value(1, "Launch Year").unwrap(), &Value::Integer(1927));
    }
}
