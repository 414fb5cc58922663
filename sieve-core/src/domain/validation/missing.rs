// sieve-core/src/domain/validation/missing.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;
use crate::domain::table::{CleanResult, KeyValue, RecordTable, Value};

pub const UNKNOWN_FILL: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingStrategy {
    /// Remove records missing an essential field.
    #[default]
    Drop,
    /// Fill each column: median for numeric columns, most frequent value otherwise.
    Fill,
    /// Fill with one configured value.
    Constant,
    /// Carry the previous present value down.
    Ffill,
    /// Carry the next present value up.
    Bfill,
}

impl fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Drop => "drop",
            Self::Fill => "fill",
            Self::Constant => "constant",
            Self::Ffill => "ffill",
            Self::Bfill => "bfill",
        })
    }
}

impl FromStr for MissingStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "fill" => Ok(Self::Fill),
            "constant" => Ok(Self::Constant),
            "ffill" => Ok(Self::Ffill),
            "bfill" => Ok(Self::Bfill),
            _ => Err(DomainError::UnknownStrategy {
                strategy: s.to_string(),
                expected: "drop, fill, constant, ffill, bfill".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
    pub percentage: f64,
}

/// Missing-value detection and remediation.
///
/// Essential fields disqualify a record when absent (all fields when none are
/// configured). Flagged fields are only counted. Columns declared as text always
/// fill with their most frequent value, or `"Unknown"` when they hold none.
#[derive(Debug, Clone, Default)]
pub struct MissingDataHandler {
    essential: Vec<String>,
    flagged: Vec<String>,
    text_columns: Vec<String>,
    constant: Option<Value>,
}

impl MissingDataHandler {
    pub fn new(essential: Vec<String>, flagged: Vec<String>) -> Self {
        Self {
            essential,
            flagged,
            ..Self::default()
        }
    }

    pub fn with_text_columns(mut self, columns: Vec<String>) -> Self {
        self.text_columns = columns;
        self
    }

    /// Value written by the `constant` strategy.
    pub fn with_constant(mut self, value: Value) -> Self {
        self.constant = Some(value);
        self
    }

    fn essential_columns(&self, table: &RecordTable) -> Result<Vec<usize>, DomainError> {
        if self.essential.is_empty() {
            return Ok((0..table.schema().len()).collect());
        }
        self.essential.iter().map(|f| table.column_index(f)).collect()
    }

    /// Per record: does any essential field hold a missing value?
    pub fn flag_missing(&self, table: &RecordTable) -> Result<Vec<bool>, DomainError> {
        let cols = self.essential_columns(table)?;
        Ok(table
            .records()
            .iter()
            .map(|r| cols.iter().any(|&c| r.get(c).is_missing()))
            .collect())
    }

    pub fn missing_summary(table: &RecordTable) -> Vec<ColumnMissing> {
        let total = table.len();
        table
            .fields()
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let missing = table.column(col).filter(|v| v.is_missing()).count();
                let percentage = if total == 0 {
                    0.0
                } else {
                    missing as f64 / total as f64 * 100.0
                };
                ColumnMissing {
                    column: name.clone(),
                    missing,
                    percentage,
                }
            })
            .collect()
    }

    /// Missing counts for the flagged (non-disqualifying) fields.
    pub fn flagged_counts(&self, table: &RecordTable) -> Result<Vec<(String, usize)>, DomainError> {
        self.flagged
            .iter()
            .map(|f| {
                let col = table.column_index(f)?;
                Ok((f.clone(), table.column(col).filter(|v| v.is_missing()).count()))
            })
            .collect()
    }

    pub fn drop_incomplete(&self, table: &RecordTable) -> Result<CleanResult, DomainError> {
        let flags = self.flag_missing(table)?;
        Ok(table.split(|idx, _| !flags[idx]))
    }

    fn target_columns(
        table: &RecordTable,
        columns: Option<&[String]>,
    ) -> Result<Vec<usize>, DomainError> {
        match columns {
            Some(names) => names.iter().map(|f| table.column_index(f)).collect(),
            None => Ok((0..table.schema().len()).collect()),
        }
    }

    /// Fills every missing cell of the given columns (all columns when `None`).
    /// Returns the filled table and the number of cells written.
    pub fn fill(
        &self,
        table: &RecordTable,
        columns: Option<&[String]>,
    ) -> Result<(RecordTable, usize), DomainError> {
        let cols = Self::target_columns(table, columns)?;
        let mut filled = table.clone();
        let mut written = 0;
        for col in cols {
            let declared_text = self
                .text_columns
                .iter()
                .any(|f| table.schema().position(f) == Some(col));
            let replacement = fill_value(table, col, declared_text);
            for row in 0..table.len() {
                if table.record(row).is_some_and(|r| r.get(col).is_missing()) {
                    filled.set(row, col, replacement.clone());
                    written += 1;
                }
            }
        }
        Ok((filled, written))
    }

    /// Writes the configured constant into every missing cell.
    pub fn fill_constant(
        &self,
        table: &RecordTable,
        columns: Option<&[String]>,
    ) -> Result<(RecordTable, usize), DomainError> {
        let value = self.constant.clone().ok_or_else(|| {
            DomainError::InvalidConfig("the 'constant' strategy needs a 'value'".to_string())
        })?;
        let cols = Self::target_columns(table, columns)?;
        let mut filled = table.clone();
        let mut written = 0;
        for col in cols {
            for row in 0..table.len() {
                if table.record(row).is_some_and(|r| r.get(col).is_missing()) {
                    filled.set(row, col, value.clone());
                    written += 1;
                }
            }
        }
        Ok((filled, written))
    }

    /// Propagates present values down (`forward`) or up each column. Gaps with
    /// no present neighbour in that direction stay missing.
    pub fn fill_adjacent(
        &self,
        table: &RecordTable,
        columns: Option<&[String]>,
        forward: bool,
    ) -> Result<(RecordTable, usize), DomainError> {
        let cols = Self::target_columns(table, columns)?;
        let rows: Vec<usize> = if forward {
            (0..table.len()).collect()
        } else {
            (0..table.len()).rev().collect()
        };
        let mut filled = table.clone();
        let mut written = 0;
        for col in cols {
            let mut carried: Option<Value> = None;
            for &row in &rows {
                let Some(record) = table.record(row) else {
                    continue;
                };
                let value = record.get(col);
                if !value.is_missing() {
                    carried = Some(value.clone());
                } else if let Some(v) = &carried {
                    filled.set(row, col, v.clone());
                    written += 1;
                }
            }
        }
        Ok((filled, written))
    }

    /// Applies a strategy and returns the number of cells filled. For the fill
    /// strategies, the rejected side lists the records that had a missing
    /// essential field before filling; `columns` restricts the fill.
    pub fn apply(
        &self,
        table: &RecordTable,
        strategy: MissingStrategy,
        columns: Option<&[String]>,
    ) -> Result<(CleanResult, usize), DomainError> {
        let split = self.drop_incomplete(table)?;
        let (cleaned, written) = match strategy {
            MissingStrategy::Drop => return Ok((split, 0)),
            MissingStrategy::Fill => self.fill(table, columns)?,
            MissingStrategy::Constant => self.fill_constant(table, columns)?,
            MissingStrategy::Ffill => self.fill_adjacent(table, columns, true)?,
            MissingStrategy::Bfill => self.fill_adjacent(table, columns, false)?,
        };
        Ok((
            CleanResult {
                cleaned,
                rejected: split.rejected,
            },
            written,
        ))
    }
}

/// A column is numeric when every present value is a number and it was not
/// declared as text. An undeclared all-missing column counts as numeric.
fn fill_value(table: &RecordTable, col: usize, declared_text: bool) -> Value {
    let present: Vec<&Value> = table.column(col).filter(|v| !v.is_missing()).collect();
    if !declared_text && present.iter().all(|v| v.is_numeric()) {
        let all_integer = present.iter().all(|v| matches!(v, Value::Integer(_)));
        let mut nums: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
        let median = median(&mut nums).unwrap_or(0.0);
        if all_integer && median.fract() == 0.0 {
            Value::Integer(median as i64)
        } else {
            Value::Float(median)
        }
    } else {
        most_frequent(&present).unwrap_or_else(|| Value::text(UNKNOWN_FILL))
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Most frequent value; ties go to the value whose text form sorts first.
fn most_frequent(values: &[&Value]) -> Option<Value> {
    let mut counts: HashMap<KeyValue, (usize, &Value)> = HashMap::new();
    for v in values {
        counts.entry(v.key()).or_insert((0, v)).0 += 1;
    }
    counts
        .into_values()
        .max_by(|(ca, va), (cb, vb)| ca.cmp(cb).then_with(|| vb.to_string().cmp(&va.to_string())))
        .map(|(_, v)| v.clone())
}
