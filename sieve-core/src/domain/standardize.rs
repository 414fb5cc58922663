// sieve-core/src/domain/standardize.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::table::{RecordTable, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseRule {
    Title,
    Lower,
    Upper,
    Sentence,
}

impl CaseRule {
    pub fn apply(&self, s: &str) -> String {
        match self {
            Self::Title => title_case(s),
            Self::Lower => s.to_lowercase(),
            Self::Upper => s.to_uppercase(),
            Self::Sentence => {
                let mut chars = s.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Characters that cannot be represented in the target encoding are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[default]
    #[serde(alias = "utf-8")]
    Utf8,
    Ascii,
    #[serde(alias = "latin-1")]
    Latin1,
}

impl TextEncoding {
    fn keeps(&self, c: char) -> bool {
        match self {
            Self::Utf8 => c != char::REPLACEMENT_CHARACTER && !c.is_control(),
            Self::Ascii => c.is_ascii() && !c.is_ascii_control(),
            Self::Latin1 => (c as u32) <= 0xFF && !c.is_control(),
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First letter of each alphabetic run upper-cased, the rest lower-cased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct TextStandardizer {
    fields: Vec<String>,
    case: BTreeMap<String, CaseRule>,
    encoding: TextEncoding,
    remove_special: bool,
}

impl TextStandardizer {
    pub fn new(fields: Vec<String>, case: BTreeMap<String, CaseRule>, encoding: TextEncoding) -> Self {
        Self {
            fields,
            case,
            encoding,
            remove_special: false,
        }
    }

    /// Also drop every character that is neither alphanumeric nor whitespace.
    pub fn with_remove_special(mut self, remove_special: bool) -> Self {
        self.remove_special = remove_special;
        self
    }

    /// Configured fields first, then fields that only carry a case rule.
    pub fn target_fields(&self) -> Vec<String> {
        let mut out = self.fields.clone();
        for field in self.case.keys() {
            if !out.contains(field) {
                out.push(field.clone());
            }
        }
        out
    }

    /// Whitespace is collapsed both before and after dropping characters, so a
    /// dropped character never leaves a double or trailing space behind.
    pub fn standardize_text(&self, field: &str, raw: &str) -> String {
        let filtered: String = collapse_whitespace(raw)
            .chars()
            .filter(|&c| self.encoding.keeps(c))
            .filter(|&c| !self.remove_special || c.is_alphanumeric() || c.is_whitespace())
            .collect();
        let clean = collapse_whitespace(&filtered);
        match self.case.get(field) {
            Some(rule) => rule.apply(&clean),
            None => clean,
        }
    }

    /// Returns the standardized table and, per field, how many values changed.
    pub fn standardize(
        &self,
        table: &RecordTable,
    ) -> Result<(RecordTable, BTreeMap<String, usize>), DomainError> {
        let mut out = table.clone();
        let mut changes = BTreeMap::new();

        for field in self.target_fields() {
            let col = table.column_index(&field)?;
            let mut changed = 0;
            for (row, value) in table.column(col).enumerate() {
                let Value::Text(raw) = value else {
                    continue;
                };
                let clean = self.standardize_text(&field, raw);
                if clean.is_empty() {
                    out.set(row, col, Value::Missing);
                    changed += 1;
                } else if clean != *raw {
                    out.set(row, col, Value::Text(clean));
                    changed += 1;
                }
            }
            changes.insert(field, changed);
        }

        info!(
            fields = changes.len(),
            changed = changes.values().sum::<usize>(),
            "Text standardization finished"
        );
        Ok((out, changes))
    }
}
