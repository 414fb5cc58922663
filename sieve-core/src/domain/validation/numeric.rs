// sieve-core/src/domain/validation/numeric.rs

use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::table::{CleanResult, RecordTable, Value};
use crate::domain::validation::{CleanStrategy, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericIssue {
    OutOfRange,
    Negative,
    NonIntegral,
    NonNumeric,
}

impl fmt::Display for NumericIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OutOfRange => "out_of_range",
            Self::Negative => "negative",
            Self::NonIntegral => "non_integral",
            Self::NonNumeric => "non_numeric",
        })
    }
}

/// Both numeric checks for one record. `None` when the field is not in the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordNumericVerdict {
    pub rating: Option<Verdict<NumericIssue>>,
    pub review_count: Option<Verdict<NumericIssue>>,
}

impl RecordNumericVerdict {
    pub fn is_invalid(&self) -> bool {
        self.rating.as_ref().is_some_and(Verdict::is_invalid)
            || self.review_count.as_ref().is_some_and(Verdict::is_invalid)
    }
}

pub struct NumericValidator {
    rating_field: String,
    review_field: String,
    rating_min: f64,
    rating_max: f64,
}

impl NumericValidator {
    pub fn new(
        rating_field: impl Into<String>,
        review_field: impl Into<String>,
        rating_min: f64,
        rating_max: f64,
    ) -> Result<Self, DomainError> {
        if rating_min.is_nan() || rating_max.is_nan() || rating_min > rating_max {
            return Err(DomainError::InvalidConfig(format!(
                "rating bounds [{}, {}] are empty",
                rating_min, rating_max
            )));
        }
        Ok(Self {
            rating_field: rating_field.into(),
            review_field: review_field.into(),
            rating_min,
            rating_max,
        })
    }

    pub fn check_rating(&self, value: &Value) -> Verdict<NumericIssue> {
        if value.is_missing() {
            return Verdict::Missing;
        }
        match value.as_f64() {
            None => Verdict::Invalid(NumericIssue::NonNumeric),
            Some(r) if r < self.rating_min || r > self.rating_max => {
                Verdict::Invalid(NumericIssue::OutOfRange)
            }
            Some(_) => Verdict::Valid,
        }
    }

    pub fn check_review_count(&self, value: &Value) -> Verdict<NumericIssue> {
        if value.is_missing() {
            return Verdict::Missing;
        }
        match value.as_f64() {
            None => Verdict::Invalid(NumericIssue::NonNumeric),
            Some(n) if n < 0.0 => Verdict::Invalid(NumericIssue::Negative),
            Some(n) if n.fract() != 0.0 => Verdict::Invalid(NumericIssue::NonIntegral),
            Some(_) => Verdict::Valid,
        }
    }

    pub fn classify_table(&self, table: &RecordTable) -> Vec<RecordNumericVerdict> {
        let rating_col = table.schema().position(&self.rating_field);
        let review_col = table.schema().position(&self.review_field);
        table
            .records()
            .iter()
            .map(|r| RecordNumericVerdict {
                rating: rating_col.map(|c| self.check_rating(r.get(c))),
                review_count: review_col.map(|c| self.check_review_count(r.get(c))),
            })
            .collect()
    }

    /// `Remove` drops a record when either check fails. `Nullify` blanks only the
    /// failing field(s) and keeps the rest of the record.
    pub fn clean_records(
        &self,
        table: &RecordTable,
        strategy: CleanStrategy,
    ) -> Result<CleanResult, DomainError> {
        let verdicts = self.classify_table(table);
        let split = table.split(|idx, _| !verdicts[idx].is_invalid());

        match strategy {
            CleanStrategy::Remove => Ok(split),
            CleanStrategy::Nullify => {
                let rating_col = table.schema().position(&self.rating_field);
                let review_col = table.schema().position(&self.review_field);
                let mut cleaned = table.clone();
                for (row, v) in verdicts.iter().enumerate() {
                    if let (Some(c), Some(true)) =
                        (rating_col, v.rating.as_ref().map(Verdict::is_invalid))
                    {
                        cleaned.set(row, c, Value::Missing);
                    }
                    if let (Some(c), Some(true)) =
                        (review_col, v.review_count.as_ref().map(Verdict::is_invalid))
                    {
                        cleaned.set(row, c, Value::Missing);
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn validator() -> NumericValidator {
        NumericValidator::new("average_rating", "review_count", 0.0, 5.0).unwrap()
    }

    fn table() -> RecordTable {
        RecordTable::from_rows(
            ["Tool Name", "average_rating", "review_count"],
            vec![
                vec![Value::text("ok"), Value::Float(4.5), Value::Integer(10)],
                vec![Value::text("bad rating"), Value::Float(5.5), Value::Integer(3)],
                vec![Value::text("bad reviews"), Value::Float(3.0), Value::Integer(-2)],
                vec![Value::text("both bad"), Value::Integer(9), Value::Float(2.5)],
                vec![Value::text("blank"), Value::Missing, Value::Missing],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rating_bounds() {
        let v = validator();
        assert_eq!(v.check_rating(&Value::Float(5.5)), Verdict::Invalid(NumericIssue::OutOfRange));
        assert_eq!(v.check_rating(&Value::Missing), Verdict::Missing);
        assert_eq!(v.check_rating(&Value::Integer(5)), Verdict::Valid);
        assert_eq!(v.check_rating(&Value::Integer(0)), Verdict::Valid);
        assert_eq!(v.check_rating(&Value::text("great")), Verdict::Invalid(NumericIssue::NonNumeric));
    }

    #[test]
    fn test_review_count_rules() {
        let v = validator();
        assert_eq!(v.check_review_count(&Value::Integer(-1)), Verdict::Invalid(NumericIssue::Negative));
        assert_eq!(
            v.check_review_count(&Value::Float(12.5)),
            Verdict::Invalid(NumericIssue::NonIntegral)
        );
        assert_eq!(v.check_review_count(&Value::Float(12.0)), Verdict::Valid);
        assert_eq!(v.check_review_count(&Value::Missing), Verdict::Missing);
    }

    #[test]
    fn test_remove_takes_union_of_invalid_sets() {
        let res = validator().clean_records(&table(), CleanStrategy::Remove).unwrap();
        assert_eq!(res.cleaned.len(), 2);
        assert_eq!(res.rejected.len(), 3);
    }

    #[test]
    fn test_nullify_touches_only_invalid_fields() {
        let res = validator().clean_records(&table(), CleanStrategy::Nullify).unwrap();
        let c = &res.cleaned;
        assert_eq!(c.len(), 5);
        assert_eq!(c.value(1, "average_rating").unwrap(), &Value::Missing);
        assert_eq!(c.value(1, "review_count").unwrap(), &Value::Integer(3));
        assert_eq!(c.value(2, "average_rating").unwrap(), &Value::Float(3.0));
        assert_eq!(c.value(2, "review_count").unwrap(), &Value::Missing);
        assert_eq!(c.value(3, "average_rating").unwrap(), &Value::Missing);
        assert_eq!(c.value(3, "review_count").unwrap(), &Value::Missing);
    }

    #[test]
    fn test_absent_fields_are_skipped() {
        let t = RecordTable::from_rows(["Tool Name"], vec![vec![Value::text("x")]]).unwrap();
        let res = validator().clean_records(&t, CleanStrategy::Remove).unwrap();
        assert_eq!(res.cleaned.len(), 1);
    }
}
