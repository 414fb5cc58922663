// sieve-core/src/domain/resolver.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::table::{CleanResult, KeyValue, RecordTable, Value};
use crate::domain::validation::missing::UNKNOWN_FILL;

/// Feature-list placeholder replaced by any real list during a merge.
pub const SEE_WEBSITE: &str = "See website";

/// Fields feeding the composite score. A field absent from the schema contributes 0.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScoringFields {
    #[serde(rename = "review-count", default = "default_review_field")]
    pub review_count: String,
    #[serde(rename = "rating", default = "default_rating_field")]
    pub rating: String,
    #[serde(rename = "launch-year", default = "default_year_field")]
    pub launch_year: String,
}

impl Default for ScoringFields {
    fn default() -> Self {
        Self {
            review_count: default_review_field(),
            rating: default_rating_field(),
            launch_year: default_year_field(),
        }
    }
}

fn default_review_field() -> String {
    "review_count".to_string()
}
fn default_rating_field() -> String {
    "average_rating".to_string()
}
fn default_year_field() -> String {
    "Launch Year".to_string()
}

/// Fields with their own rule when duplicates are merged into the survivor.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MergeFields {
    /// The longer text wins.
    #[serde(default = "default_description_field")]
    pub description: String,
    /// Lists are joined with ", ".
    #[serde(rename = "key-features", default = "default_features_field")]
    pub key_features: String,
}

impl Default for MergeFields {
    fn default() -> Self {
        Self {
            description: default_description_field(),
            key_features: default_features_field(),
        }
    }
}

fn default_description_field() -> String {
    "Description".to_string()
}
fn default_features_field() -> String {
    "Key Features".to_string()
}

/// Rows (by table position) sharing the same identity key. Always non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub key: Vec<KeyValue>,
    pub rows: Vec<usize>,
}

/// Keeps exactly one record per identity-key group, chosen by composite score.
/// In merge mode the survivor also absorbs what the other members know.
#[derive(Debug, Clone)]
pub struct DuplicateResolver {
    identity_key: Vec<String>,
    scoring: ScoringFields,
    merge: Option<MergeFields>,
}

impl DuplicateResolver {
    pub fn new(identity_key: Vec<String>, scoring: ScoringFields) -> Result<Self, DomainError> {
        if identity_key.is_empty() {
            return Err(DomainError::InvalidConfig(
                "identity key must name at least one field".into(),
            ));
        }
        Ok(Self {
            identity_key,
            scoring,
            merge: None,
        })
    }

    pub fn with_merge(mut self, fields: MergeFields) -> Self {
        self.merge = Some(fields);
        self
    }

    pub fn identity_key(&self) -> &[String] {
        &self.identity_key
    }

    /// Partitions the table into identity-key groups, in first-seen order.
    /// A record whose key fields are all missing always forms its own group.
    pub fn groups(&self, table: &RecordTable) -> Result<Vec<DuplicateGroup>, DomainError> {
        let cols = self
            .identity_key
            .iter()
            .map(|f| table.column_index(f))
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups: Vec<DuplicateGroup> = Vec::new();
        let mut index: HashMap<Vec<KeyValue>, usize> = HashMap::new();

        for (row, record) in table.records().iter().enumerate() {
            let key: Vec<KeyValue> = cols.iter().map(|&c| record.get(c).key()).collect();
            if key.iter().all(|k| *k == KeyValue::Missing) {
                groups.push(DuplicateGroup {
                    key,
                    rows: vec![row],
                });
                continue;
            }
            match index.get(&key) {
                Some(&g) => groups[g].rows.push(row),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(DuplicateGroup {
                        key,
                        rows: vec![row],
                    });
                }
            }
        }
        Ok(groups)
    }

    /// Groups holding two or more records.
    pub fn find_duplicates(&self, table: &RecordTable) -> Result<Vec<DuplicateGroup>, DomainError> {
        Ok(self
            .groups(table)?
            .into_iter()
            .filter(|g| g.rows.len() > 1)
            .collect())
    }

    /// Composite score of `row`, which sits at `position` inside its group.
    pub fn score(&self, table: &RecordTable, row: usize, position: usize) -> f64 {
        let Some(record) = table.record(row) else {
            return f64::NEG_INFINITY;
        };
        let numeric = |field: &str| {
            table
                .schema()
                .position(field)
                .and_then(|c| record.get(c).as_f64())
                .unwrap_or(0.0)
        };

        let completeness = record.completeness() as f64;
        let reviews = numeric(&self.scoring.review_count);
        let rating = numeric(&self.scoring.rating);
        let recency = numeric(&self.scoring.launch_year);

        completeness + reviews + rating + recency - position as f64
    }

    /// Returns `(cleaned, removed)`. Survivors keep their original relative order.
    pub fn resolve(&self, table: &RecordTable) -> Result<CleanResult, DomainError> {
        Ok(self.resolve_with_merges(table)?.0)
    }

    /// Like [`resolve`](Self::resolve), also returning how many survivor cells a
    /// merge rewrote (always 0 outside merge mode). Removed records are returned
    /// as they were.
    pub fn resolve_with_merges(
        &self,
        table: &RecordTable,
    ) -> Result<(CleanResult, usize), DomainError> {
        let groups = self.find_duplicates(table)?;
        let mut removed = vec![false; table.len()];
        let mut merged = table.clone();
        let mut written = 0;

        for group in &groups {
            let winner = self.best_of(table, &group.rows);
            for &row in &group.rows {
                if row == winner {
                    continue;
                }
                removed[row] = true;
                if let Some(fields) = &self.merge {
                    written += merge_into(&mut merged, winner, row, fields);
                }
            }
            debug!(
                group_size = group.rows.len(),
                kept = winner,
                "Resolved duplicate group"
            );
        }

        let result = merged.split(|idx, _| !removed[idx]);
        Ok((result, written))
    }

    /// Highest score wins; a strictly greater score is needed to displace an
    /// earlier record, so exact ties go to the lowest table position.
    fn best_of(&self, table: &RecordTable, rows: &[usize]) -> usize {
        let mut best_row = rows[0];
        let mut best_score = self.score(table, best_row, 0);
        for (position, &row) in rows.iter().enumerate().skip(1) {
            let s = self.score(table, row, position);
            if s > best_score {
                best_score = s;
                best_row = row;
            }
        }
        best_row
    }
}

/// Copies what `from` knows into `into`; returns the number of cells changed.
fn merge_into(table: &mut RecordTable, into: usize, from: usize, fields: &MergeFields) -> usize {
    let (Some(target), Some(source)) = (table.record(into).cloned(), table.record(from).cloned())
    else {
        return 0;
    };
    let description = table.schema().position(&fields.description);
    let features = table.schema().position(&fields.key_features);

    let mut written = 0;
    for (col, (current, other)) in target.values().iter().zip(source.values()).enumerate() {
        let update = if Some(col) == description {
            merge_description(current, other)
        } else if Some(col) == features {
            merge_features(current, other)
        } else {
            fill_gap(current, other)
        };
        if let Some(value) = update {
            table.set(into, col, value);
            written += 1;
        }
    }
    written
}

fn is_gap(v: &Value) -> bool {
    match v {
        Value::Missing => true,
        Value::Text(t) => t == UNKNOWN_FILL,
        _ => false,
    }
}

fn fill_gap(current: &Value, other: &Value) -> Option<Value> {
    (is_gap(current) && !other.is_missing() && current != other).then(|| other.clone())
}

fn merge_description(current: &Value, other: &Value) -> Option<Value> {
    if let Some(v) = fill_gap(current, other) {
        return Some(v);
    }
    let longer = other.to_string().chars().count() > current.to_string().chars().count();
    (!is_gap(other) && longer).then(|| other.clone())
}

fn merge_features(current: &Value, other: &Value) -> Option<Value> {
    if let Some(v) = fill_gap(current, other) {
        return Some(v);
    }
    let (cur, oth) = (current.to_string(), other.to_string());
    if is_gap(other) || oth == SEE_WEBSITE || oth == cur {
        return None;
    }
    if cur == SEE_WEBSITE {
        Some(other.clone())
    } else {
        Some(Value::Text(format!("{}, {}", cur, oth)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::table::Value;

    const FIELDS: [&str; 6] = [
        "Tool Name",
        "Company",
        "Website",
        "review_count",
        "average_rating",
        "Launch Year",
    ];

    fn row(name: &str, company: &str, reviews: Option<i64>, year: Option<i64>) -> Vec<Value> {
        vec![
            Value::text(name),
            Value::text(company),
            Value::text("https://example.com"),
            reviews.into(),
            Value::Missing,
            year.into(),
        ]
    }

    fn resolver() -> DuplicateResolver {
        DuplicateResolver::new(
            vec!["Tool Name".into(), "Company".into(), "Website".into()],
            ScoringFields::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_keeps_highest_review_count() {
        let table = RecordTable::from_rows(
            FIELDS,
            vec![
                row("Alpha", "Acme", Some(10), Some(2020)),
                row("Beta", "Acme", Some(3), Some(2021)),
                row("Alpha", "Acme", Some(500), Some(2020)),
            ],
        )
        .unwrap();

        let res = resolver().resolve(&table).unwrap();
        assert_eq!(res.cleaned.len(), 2);
        assert_eq!(res.rejected.len(), 1);
        assert_eq!(res.rejected.value(0, "review_count").unwrap(), &Value::Integer(10));
        // Survivors keep original relative order: Beta (row 1) then Alpha (row 2)
        assert_eq!(res.cleaned.value(0, "Tool Name").unwrap(), &Value::text("Beta"));
        assert_eq!(res.cleaned.value(1, "review_count").unwrap(), &Value::Integer(500));
    }

    #[test]
    fn test_exact_tie_goes_to_first_record() {
        let table = RecordTable::from_rows(
            FIELDS,
            vec![
                row("Alpha", "Acme", Some(5), Some(2020)),
                row("Alpha", "Acme", Some(5), Some(2020)),
            ],
        )
        .unwrap();
        let res = resolver().resolve(&table).unwrap();
        assert_eq!(res.cleaned.len(), 1);
        assert_eq!(res.cleaned.records()[0], table.records()[0]);
    }

    #[test]
    fn test_position_penalty_breaks_near_ties() {
        // Second record scores one point higher before the position penalty,
        // which exactly cancels it: the first record stays.
        let table = RecordTable::from_rows(
            FIELDS,
            vec![
                row("Alpha", "Acme", Some(5), Some(2020)),
                row("Alpha", "Acme", Some(6), Some(2020)),
            ],
        )
        .unwrap();
        let r = resolver();
        assert_eq!(r.score(&table, 0, 0), r.score(&table, 1, 1));
        let res = r.resolve(&table).unwrap();
        assert_eq!(res.cleaned.value(0, "review_count").unwrap(), &Value::Integer(5));
    }

    #[test]
    fn test_all_missing_keys_are_never_merged() {
        let blank = vec![
            Value::Missing,
            Value::Missing,
            Value::Missing,
            Value::Integer(1),
            Value::Missing,
            Value::Missing,
        ];
        let table = RecordTable::from_rows(FIELDS, vec![blank.clone(), blank]).unwrap();
        let res = resolver().resolve(&table).unwrap();
        assert_eq!(res.cleaned.len(), 2);
        assert!(res.rejected.is_empty());
    }

    #[test]
    fn test_partially_missing_keys_match_missing() {
        let mut a = row("Alpha", "Acme", Some(1), None);
        let mut b = row("Alpha", "Acme", Some(2), None);
        a[2] = Value::Missing;
        b[2] = Value::Missing;
        let table = RecordTable::from_rows(FIELDS, vec![a, b]).unwrap();
        assert_eq!(resolver().find_duplicates(&table).unwrap().len(), 1);
    }

    #[test]
    fn test_resolution_is_idempotent_and_winner_dominates() {
        let table = RecordTable::from_rows(
            FIELDS,
            vec![
                row("Alpha", "Acme", Some(1), Some(2019)),
                row("Alpha", "Acme", None, Some(2024)),
                row("Beta", "Other", Some(7), None),
                row("Alpha", "Acme", Some(2), None),
                row("Beta", "Other", Some(7), Some(2018)),
            ],
        )
        .unwrap();
        let r = resolver();

        for group in r.find_duplicates(&table).unwrap() {
            let winner = r.best_of(&table, &group.rows);
            let winner_pos = group.rows.iter().position(|&x| x == winner).unwrap();
            let winner_score = r.score(&table, winner, winner_pos);
            for (pos, &member) in group.rows.iter().enumerate() {
                assert!(winner_score >= r.score(&table, member, pos));
            }
        }

        let once = r.resolve(&table).unwrap();
        assert_eq!(once.cleaned.len() + once.rejected.len(), table.len());
        let twice = r.resolve(&once.cleaned).unwrap();
        assert!(twice.rejected.is_empty());
        assert!(r.find_duplicates(&once.cleaned).unwrap().is_empty());
    }

    fn merge_table() -> RecordTable {
        RecordTable::from_rows(
            ["Tool Name", "Company", "review_count", "Description", "Key Features", "Pricing"],
            vec![
                vec![
                    Value::text("Alpha"),
                    Value::text("Unknown"),
                    Value::Integer(500),
                    Value::text("Short text"),
                    Value::text("See website"),
                    Value::Missing,
                ],
                vec![
                    Value::text("Alpha"),
                    Value::text("Acme"),
                    Value::Integer(3),
                    Value::text("A much longer description of the tool"),
                    Value::text("Chat"),
                    Value::text("Free"),
                ],
                vec![
                    Value::text("Alpha"),
                    Value::Missing,
                    Value::Integer(2),
                    Value::Missing,
                    Value::text("Search"),
                    Value::text("Paid"),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_merge_fills_survivor_from_group() {
        let r = DuplicateResolver::new(vec!["Tool Name".into()], ScoringFields::default())
            .unwrap()
            .with_merge(MergeFields::default());
        let table = merge_table();
        let (res, written) = r.resolve_with_merges(&table).unwrap();

        assert_eq!(res.cleaned.len(), 1);
        let kept = |f: &str| res.cleaned.value(0, f).unwrap().clone();
        assert_eq!(kept("review_count"), Value::Integer(500));
        assert_eq!(kept("Company"), Value::text("Acme"));
        assert_eq!(kept("Description"), Value::text("A much longer description of the tool"));
        assert_eq!(kept("Key Features"), Value::text("Chat, Search"));
        // first member to fill a gap wins
        assert_eq!(kept("Pricing"), Value::text("Free"));
        assert_eq!(written, 5);

        // removed records are reported untouched
        assert_eq!(res.rejected.len(), 2);
        assert_eq!(res.rejected.records()[0], table.records()[1]);
        assert_eq!(res.rejected.records()[1], table.records()[2]);
    }

    #[test]
    fn test_without_merge_survivor_is_unchanged() {
        let r = DuplicateResolver::new(vec!["Tool Name".into()], ScoringFields::default()).unwrap();
        let table = merge_table();
        let (res, written) = r.resolve_with_merges(&table).unwrap();
        assert_eq!(written, 0);
        assert_eq!(res.cleaned.records()[0], table.records()[0]);
    }

    #[test]
    fn test_feature_lists_join_and_skip_placeholders() {
        let see = Value::text(SEE_WEBSITE);
        assert_eq!(merge_features(&Value::text("Chat"), &see), None);
        assert_eq!(merge_features(&Value::text("Chat"), &Value::text("Chat")), None);
        assert_eq!(merge_features(&see, &Value::text("Chat")), Some(Value::text("Chat")));
        assert_eq!(
            merge_features(&Value::text("Chat"), &Value::text("Voice")),
            Some(Value::text("Chat, Voice"))
        );
        assert_eq!(merge_description(&Value::text("long enough"), &Value::text("short")), None);
    }

    #[test]
    fn test_unknown_identity_field_is_a_hard_error() {
        let r = DuplicateResolver::new(vec!["Nope".into()], ScoringFields::default()).unwrap();
        let table = RecordTable::with_fields(FIELDS).unwrap();
        assert_eq!(
            r.resolve(&table).unwrap_err(),
            DomainError::MissingColumn("Nope".into())
        );
        assert!(DuplicateResolver::new(vec![], ScoringFields::default()).is_err());
    }
}
