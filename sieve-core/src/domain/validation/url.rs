// sieve-core/src/domain/validation/url.rs

use regex::Regex;
use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::table::{CleanResult, RecordTable, Value};
use crate::domain::validation::Verdict;

/// scheme://host[:port][/path], host being a dotted name with a valid top-level
/// label, `localhost`, or a dotted-quad IPv4 address.
const URL_PATTERN: &str = r"(?i)^https?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlIssue {
    Malformed,
}

impl fmt::Display for UrlIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("malformed_url")
    }
}

pub struct UrlValidator {
    field: String,
    pattern: Regex,
}

impl UrlValidator {
    /// The pattern is compiled once here and reused for every record.
    pub fn new(field: impl Into<String>) -> Result<Self, DomainError> {
        let pattern = Regex::new(URL_PATTERN)
            .map_err(|e| DomainError::InvalidConfig(format!("URL pattern: {}", e)))?;
        Ok(Self {
            field: field.into(),
            pattern,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Trimmed URL with `http://` prepended when no http(s) scheme is present.
    /// Only used for testing and probing; stored values are left alone.
    pub fn normalize(value: &Value) -> Option<String> {
        if value.is_missing() {
            return None;
        }
        let raw = value.to_string();
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Some(trimmed.to_string())
        } else {
            Some(format!("http://{}", trimmed))
        }
    }

    pub fn classify(&self, value: &Value) -> Verdict<UrlIssue> {
        match Self::normalize(value) {
            None => Verdict::Missing,
            Some(url) if self.pattern.is_match(&url) => Verdict::Valid,
            Some(_) => Verdict::Invalid(UrlIssue::Malformed),
        }
    }

    pub fn classify_table(&self, table: &RecordTable) -> Result<Vec<Verdict<UrlIssue>>, DomainError> {
        let col = table.column_index(&self.field)?;
        Ok(table.column(col).map(|v| self.classify(v)).collect())
    }

    /// Records whose URL is present but malformed.
    pub fn invalid_urls(&self, table: &RecordTable) -> Result<RecordTable, DomainError> {
        Ok(self.clean_urls(table, false)?.rejected)
    }

    /// Removes records with an invalid URL; valid and missing URLs are kept.
    /// With `rewrite`, surviving valid URLs are stored in their normalized form.
    pub fn clean_urls(&self, table: &RecordTable, rewrite: bool) -> Result<CleanResult, DomainError> {
        let col = table.column_index(&self.field)?;
        let verdicts = self.classify_table(table)?;
        let mut result = table.split(|idx, _| !verdicts[idx].is_invalid());

        if rewrite {
            for row in 0..result.cleaned.len() {
                let Some(record) = result.cleaned.record(row) else {
                    continue;
                };
                if let Some(url) = Self::normalize(record.get(col)) {
                    result.cleaned.set(row, col, Value::Text(url));
                }
            }
        }

        tracing::info!(
            field = %self.field,
            invalid = result.rejected.len(),
            "URL validation finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn validator() -> UrlValidator {
        UrlValidator::new("Website").unwrap()
    }

    #[test]
    fn test_valid_forms() {
        let v = validator();
        for url in [
            "https://openai.com",
            "example.com",
            "  http://sub.example.co.uk/path?q=1  ",
            "HTTPS://EXAMPLE.ORG",
            "http://localhost:8080/api",
            "192.168.0.1",
            "https://my-tool.ai/",
        ] {
            assert!(v.classify(&Value::text(url)).is_valid(), "{} should be valid", url);
        }
    }

    #[test]
    fn test_invalid_forms() {
        let v = validator();
        for url in ["not a url", "htp//broken", "ftp://files.example.com", "http://", "localhost.", "42"] {
            assert_eq!(
                v.classify(&Value::text(url)),
                Verdict::Invalid(UrlIssue::Malformed),
                "{} should be invalid",
                url
            );
        }
        assert!(v.classify(&Value::Integer(42)).is_invalid());
    }

    #[test]
    fn test_missing_is_not_invalid() {
        assert_eq!(validator().classify(&Value::Missing), Verdict::Missing);
    }

    #[test]
    fn test_clean_urls_partitions_input() {
        let table = RecordTable::from_rows(
            ["Tool Name", "Website"],
            vec![
                vec![Value::text("A"), Value::text("a.com")],
                vec![Value::text("B"), Value::text("nope")],
                vec![Value::text("C"), Value::Missing],
                vec![Value::text("D"), Value::text("https://d.io")],
            ],
        )
        .unwrap();

        let res = validator().clean_urls(&table, false).unwrap();
        assert_eq!(res.cleaned.len() + res.rejected.len(), table.len());
        assert_eq!(res.rejected.len(), 1);
        assert_eq!(res.rejected.value(0, "Tool Name").unwrap(), &Value::text("B"));
        // stored value unchanged without rewrite
        assert_eq!(res.cleaned.value(0, "Website").unwrap(), &Value::text("a.com"));

        let rewritten = validator().clean_urls(&table, true).unwrap();
        assert_eq!(
            rewritten.cleaned.value(0, "Website").unwrap(),
            &Value::text("http://a.com")
        );
        assert_eq!(rewritten.cleaned.value(1, "Website").unwrap(), &Value::Missing);
    }
}
