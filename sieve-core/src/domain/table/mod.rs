// sieve-core/src/domain/table/mod.rs

pub mod value;

pub use value::{KeyValue, Value};

use crate::domain::error::DomainError;
use std::collections::{HashMap, HashSet};

/// Ordered, unique field names shared by every record of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Schema {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Result<Self, DomainError> {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(fields.len());
        for (idx, name) in fields.iter().enumerate() {
            if positions.insert(name.clone(), idx).is_some() {
                return Err(DomainError::Schema(format!("duplicate field name '{}'", name)));
            }
        }
        Ok(Self { fields, positions })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.positions.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.positions.contains_key(field)
    }
}

/// One row. Values are aligned with the owning table's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> &Value {
        &self.values[idx]
    }

    /// Number of non-missing fields.
    pub fn completeness(&self) -> usize {
        self.values.iter().filter(|v| !v.is_missing()).count()
    }
}

/// Result of a cleaning stage: what survives and what was rejected or flagged.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanResult {
    pub cleaned: RecordTable,
    pub rejected: RecordTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    schema: Schema,
    records: Vec<Record>,
}

impl RecordTable {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    pub fn with_fields<S: Into<String>>(
        fields: impl IntoIterator<Item = S>,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(Schema::new(fields)?))
    }

    pub fn from_rows<S: Into<String>>(
        fields: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, DomainError> {
        let mut table = Self::with_fields(fields)?;
        for row in rows {
            table.push(row)?;
        }
        Ok(table)
    }

    /// Appends a record. Every record must carry one value per schema field.
    pub fn push(&mut self, values: Vec<Value>) -> Result<(), DomainError> {
        if values.len() != self.schema.len() {
            return Err(DomainError::Schema(format!(
                "record has {} values, schema has {} fields",
                values.len(),
                self.schema.len()
            )));
        }
        self.records.push(Record { values });
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn fields(&self) -> &[String] {
        self.schema.fields()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    pub fn column_index(&self, field: &str) -> Result<usize, DomainError> {
        self.schema
            .position(field)
            .ok_or_else(|| DomainError::MissingColumn(field.to_string()))
    }

    pub fn value(&self, row: usize, field: &str) -> Result<&Value, DomainError> {
        let col = self.column_index(field)?;
        self.records
            .get(row)
            .map(|r| r.get(col))
            .ok_or_else(|| DomainError::Schema(format!("row {} out of bounds", row)))
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = &Value> + '_ {
        self.records.iter().map(move |r| r.get(col))
    }

    /// Overwrites one cell. Out-of-range positions are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: Value) {
        if let Some(cell) = self.records.get_mut(row).and_then(|r| r.values.get_mut(col)) {
            *cell = value;
        }
    }

    /// An empty table with the same schema.
    pub fn empty_like(&self) -> Self {
        Self::new(self.schema.clone())
    }

    /// New table holding the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            records: rows
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

    /// Splits the table in two, preserving relative order on both sides.
    pub fn split(&self, mut keep: impl FnMut(usize, &Record) -> bool) -> CleanResult {
        let mut cleaned = self.empty_like();
        let mut rejected = self.empty_like();
        for (idx, record) in self.records.iter().enumerate() {
            if keep(idx, record) {
                cleaned.records.push(record.clone());
            } else {
                rejected.records.push(record.clone());
            }
        }
        CleanResult { cleaned, rejected }
    }

    /// Appends the rows of `other`. Both tables must share the same schema.
    pub fn concat(mut self, other: RecordTable) -> Result<Self, DomainError> {
        if self.schema.fields() != other.schema.fields() {
            return Err(DomainError::Schema(format!(
                "cannot concatenate tables with different headers: {:?} vs {:?}",
                self.schema.fields(),
                other.schema.fields()
            )));
        }
        self.records.extend(other.records);
        Ok(self)
    }

    /// Returns a copy of the table with an extra column appended.
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Result<Self, DomainError> {
        if values.len() != self.records.len() {
            return Err(DomainError::Schema(format!(
                "column '{}' has {} values, table has {} records",
                name,
                values.len(),
                self.records.len()
            )));
        }
        let mut fields = self.schema.fields().to_vec();
        fields.push(name.to_string());
        let schema = Schema::new(fields)?;
        let records = self
            .records
            .iter()
            .zip(values)
            .map(|(r, v)| {
                let mut values = r.values.clone();
                values.push(v);
                Record { values }
            })
            .collect();
        Ok(Self { schema, records })
    }

    /// Drops the named columns. Names absent from the schema are ignored.
    pub fn drop_columns(&self, names: &[String]) -> Self {
        let drop: HashSet<&str> = names.iter().map(String::as_str).collect();
        let keep: Vec<usize> = (0..self.schema.len())
            .filter(|&i| !drop.contains(self.schema.fields()[i].as_str()))
            .collect();
        self.project(&keep)
    }

    /// Renames every column to snake_case ("Tool Name" -> "tool_name").
    pub fn rename_snake_case(&self) -> Result<Self, DomainError> {
        let fields: Vec<String> = self.schema.fields().iter().map(|f| snake_case(f)).collect();
        Ok(Self {
            schema: Schema::new(fields)?,
            records: self.records.clone(),
        })
    }

    fn project(&self, cols: &[usize]) -> Self {
        let fields: Vec<String> = cols.iter().map(|&i| self.schema.fields()[i].clone()).collect();
        // Subset of a valid schema: names stay unique.
        let schema = Schema {
            positions: fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.clone(), i))
                .collect(),
            fields,
        };
        let records = self
            .records
            .iter()
            .map(|r| Record {
                values: cols.iter().map(|&i| r.values[i].clone()).collect(),
            })
            .collect();
        Self { schema, records }
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> RecordTable {
        RecordTable::from_rows(
            ["Tool Name", "Launch Year"],
            vec![
                vec![Value::text("Alpha"), Value::Integer(2020)],
                vec![Value::text("Beta"), Value::Missing],
                vec![Value::text("Gamma"), Value::Integer(2019)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_schema_rejects_duplicate_fields() {
        assert!(matches!(Schema::new(["a", "b", "a"]), Err(DomainError::Schema(_))));
    }

    #[test]
    fn test_push_enforces_arity() {
        let mut table = RecordTable::with_fields(["a", "b"]).unwrap();
        assert!(table.push(vec![Value::Missing]).is_err());
        assert!(table.push(vec![Value::Missing, Value::Integer(1)]).is_ok());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_split_preserves_order() {
        let res = sample().split(|i, _| i != 1);
        assert_eq!(res.cleaned.len(), 2);
        assert_eq!(res.rejected.len(), 1);
        assert_eq!(res.cleaned.value(1, "Tool Name").unwrap(), &Value::text("Gamma"));
        assert_eq!(res.rejected.value(0, "Tool Name").unwrap(), &Value::text("Beta"));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = sample().column_index("Website").unwrap_err();
        assert_eq!(err, DomainError::MissingColumn("Website".into()));
    }

    #[test]
    fn test_drop_columns_and_concat() {
        let dropped = sample().drop_columns(&["Launch Year".to_string(), "Nope".to_string()]);
        assert_eq!(dropped.fields(), &["Tool Name".to_string()]);
        assert_eq!(dropped.record(2).unwrap().values(), &[Value::text("Gamma")]);

        assert!(sample().concat(dropped).is_err());
        let doubled = sample().concat(sample()).unwrap();
        assert_eq!(doubled.len(), 6);
    }

    #[test]
    fn test_with_column_checks_length() {
        let table = sample();
        assert!(table.with_column("flag", vec![Value::Missing]).is_err());
        let annotated = table
            .with_column("flag", vec![Value::Integer(1), Value::Integer(0), Value::Missing])
            .unwrap();
        assert_eq!(annotated.value(0, "flag").unwrap(), &Value::Integer(1));
    }

    #[test]
    fn test_snake_case_columns() {
        let renamed = sample().rename_snake_case().unwrap();
        assert_eq!(renamed.fields(), &["tool_name".to_string(), "launch_year".to_string()]);
        assert_eq!(snake_case("averageRating"), "average_rating");
        assert_eq!(snake_case("Price (USD)"), "price_usd");
    }
}
