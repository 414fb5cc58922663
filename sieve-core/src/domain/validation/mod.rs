// sieve-core/src/domain/validation/mod.rs

pub mod description;
pub mod missing;
pub mod numeric;
pub mod url;
pub mod year;

pub use description::{DescriptionIssue, DescriptionValidator};
pub use missing::{ColumnMissing, MissingDataHandler, MissingStrategy};
pub use numeric::{NumericIssue, NumericValidator, RecordNumericVerdict};
pub use url::{UrlIssue, UrlValidator};
pub use year::{YearCorrection, YearIssue, YearValidator};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Outcome of one rule on one record. Missing is its own outcome, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict<R> {
    Valid,
    Missing,
    Invalid(R),
}

impl<R> Verdict<R> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Verdict::Missing)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Verdict::Invalid(_))
    }

    pub fn reason(&self) -> Option<&R> {
        match self {
            Verdict::Invalid(r) => Some(r),
            _ => None,
        }
    }
}

impl<R: fmt::Display> Verdict<R> {
    /// Short label: `valid`, `missing`, or the reason itself.
    pub fn label(&self) -> String {
        match self {
            Verdict::Valid => "valid".to_string(),
            Verdict::Missing => "missing".to_string(),
            Verdict::Invalid(r) => r.to_string(),
        }
    }
}

/// What to do with a record whose field failed a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CleanStrategy {
    /// Drop the whole record.
    #[default]
    Remove,
    /// Keep the record, overwrite the offending field with Missing.
    Nullify,
}

impl CleanStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Nullify => "nullify",
        }
    }
}

impl fmt::Display for CleanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleanStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "nullify" => Ok(Self::Nullify),
            _ => Err(DomainError::UnknownStrategy {
                strategy: s.to_string(),
                expected: "remove, nullify".to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(CleanStrategy::from_str("remove").unwrap(), CleanStrategy::Remove);
        assert_eq!(CleanStrategy::from_str(" NULLIFY ").unwrap(), CleanStrategy::Nullify);
        assert!(matches!(
            CleanStrategy::from_str("drop"),
            Err(DomainError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn test_verdict_labels() {
        let v: Verdict<YearIssue> = Verdict::Invalid(YearIssue::TooOld);
        assert_eq!(v.label(), "too_old");
        assert_eq!(Verdict::<YearIssue>::Missing.label(), "missing");
        assert!(v.is_invalid());
        assert_eq!(v.reason(), Some(&YearIssue::TooOld));
    }
}
