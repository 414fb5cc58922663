// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::domain::enrichment::{CategoryRule, default_category_rules};
use crate::domain::outliers::{OutlierMethod, default_zscore_threshold};
use crate::domain::resolver::{MergeFields, ScoringFields};
use crate::domain::standardize::{CaseRule, TextEncoding};
use crate::domain::validation::description::{DEFAULT_MIN_LENGTH, DEFAULT_MIN_WORDS};
use crate::domain::validation::{CleanStrategy, MissingStrategy};

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Files or directories (walked for `*.csv`), concatenated in order.
    #[validate(length(min = 1, message = "At least one input is required"))]
    pub inputs: Vec<String>,

    #[serde(default = "default_output")]
    pub output: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    #[serde(rename = "config-paths", default)]
    pub config_paths: Vec<String>,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[serde(rename = "na-values", default = "default_na_values")]
    pub na_values: Vec<String>,

    #[validate(nested)]
    #[serde(default)]
    pub deduplicate: Option<DedupConfig>,

    /// Applied in the order given.
    #[serde(default)]
    pub stages: Vec<StageConfig>,

    #[serde(default)]
    pub standardize: StandardizeConfig,

    #[validate(nested)]
    #[serde(default)]
    pub reachability: ReachabilityConfig,

    #[serde(rename = "drop-columns", default)]
    pub drop_columns: Vec<String>,

    #[serde(rename = "snake-case-columns", default)]
    pub snake_case_columns: bool,

    #[serde(default)]
    pub statistics: Option<StatisticsConfig>,

    /// Keyword table for the `categorize` stage. Usually provided by `categories.yml`.
    #[serde(default = "default_category_rules")]
    pub categories: Vec<CategoryRule>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct DedupConfig {
    #[validate(length(min = 1, message = "Identity key must name at least one field"))]
    #[serde(rename = "identity-key")]
    pub identity_key: Vec<String>,

    #[serde(default)]
    pub scoring: ScoringFields,

    /// Survivors absorb missing or "Unknown" fields from their duplicates.
    #[serde(default)]
    pub merge: bool,

    #[serde(rename = "merge-fields", default)]
    pub merge_fields: MergeFields,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlierKind {
    #[default]
    Iqr,
    Zscore,
}

/// One cleaning stage, tagged by `kind`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "kebab-case")]
pub enum StageConfig {
    Missing {
        #[serde(default)]
        strategy: MissingStrategy,
        /// Fields whose absence disqualifies a record. Empty means every field.
        #[serde(default)]
        essential: Vec<String>,
        /// Fields whose missing count is only reported.
        #[serde(default)]
        flagged: Vec<String>,
        /// Restricts the fill strategies to these columns.
        #[serde(default)]
        columns: Option<Vec<String>>,
        /// Written by the `constant` strategy; parsed like a CSV cell.
        #[serde(default)]
        value: Option<String>,
        /// Columns filled by mode even when they hold only numbers or nothing.
        #[serde(default)]
        text_columns: Vec<String>,
    },
    Urls {
        #[serde(default = "default_url_field")]
        field: String,
        #[serde(default)]
        rewrite: bool,
    },
    Years {
        #[serde(default = "default_year_field")]
        field: String,
        #[serde(default)]
        min_year: Option<i64>,
        #[serde(default)]
        max_year: Option<i64>,
        #[serde(default)]
        strategy: CleanStrategy,
        /// Repair two-digit and embedded years before classifying.
        #[serde(default)]
        correct: bool,
    },
    Numeric {
        #[serde(default = "default_rating_field")]
        rating_field: String,
        #[serde(default = "default_review_field")]
        review_field: String,
        #[serde(default = "default_rating_min")]
        rating_min: f64,
        #[serde(default = "default_rating_max")]
        rating_max: f64,
        #[serde(default)]
        strategy: CleanStrategy,
    },
    Descriptions {
        #[serde(default = "default_description_field")]
        field: String,
        #[serde(default = "default_min_length")]
        min_length: usize,
        #[serde(default = "default_min_words")]
        min_words: usize,
        #[serde(default)]
        placeholders: Option<Vec<String>>,
        /// Without a strategy, deficient records are only flagged.
        #[serde(default)]
        strategy: Option<CleanStrategy>,
    },
    Outliers {
        columns: Vec<String>,
        #[serde(default)]
        method: OutlierKind,
        #[serde(default)]
        threshold: Option<f64>,
    },
    Categorize {
        #[serde(default = "default_category_field")]
        field: String,
        #[serde(default = "default_text_fields")]
        text_fields: Vec<String>,
    },
    Pricing {
        #[serde(default = "default_pricing_field")]
        field: String,
    },
}

impl StageConfig {
    /// Short name used for logs and rejected-file names.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "missing",
            Self::Urls { .. } => "urls",
            Self::Years { .. } => "years",
            Self::Numeric { .. } => "numeric",
            Self::Descriptions { .. } => "descriptions",
            Self::Outliers { .. } => "outliers",
            Self::Categorize { .. } => "categorize",
            Self::Pricing { .. } => "pricing",
        }
    }
}

impl OutlierKind {
    pub fn with_threshold(self, threshold: Option<f64>) -> OutlierMethod {
        match (self, threshold) {
            (Self::Iqr, Some(threshold)) => OutlierMethod::Iqr { threshold },
            (Self::Zscore, Some(threshold)) => OutlierMethod::ZScore { threshold },
            (Self::Iqr, None) => OutlierMethod::default(),
            (Self::Zscore, None) => OutlierMethod::ZScore {
                threshold: default_zscore_threshold(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StandardizeConfig {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub case: BTreeMap<String, CaseRule>,
    #[serde(default)]
    pub encoding: TextEncoding,
    /// Keep only alphanumerics and whitespace.
    #[serde(rename = "remove-special", default)]
    pub remove_special: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ReachabilityConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_url_field")]
    pub field: String,

    #[validate(range(min = 1, max = 256, message = "Workers must be between 1 and 256"))]
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            field: default_url_field(),
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatisticsConfig {
    #[serde(rename = "category-field", default = "default_category_field")]
    pub category_field: String,
    #[serde(rename = "pricing-field", default = "default_pricing_field")]
    pub pricing_field: String,
    #[serde(rename = "year-field", default = "default_year_field")]
    pub year_field: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}
fn default_output() -> String {
    "target/cleaned.csv".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}
fn default_clean_targets() -> Vec<String> {
    vec!["target".to_string()]
}
fn default_delimiter() -> char {
    ','
}
pub fn default_na_values() -> Vec<String> {
    ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_url_field() -> String {
    "Website".to_string()
}
fn default_year_field() -> String {
    "Launch Year".to_string()
}
fn default_rating_field() -> String {
    "average_rating".to_string()
}
fn default_review_field() -> String {
    "review_count".to_string()
}
fn default_rating_min() -> f64 {
    0.0
}
fn default_rating_max() -> f64 {
    5.0
}
fn default_description_field() -> String {
    "Description".to_string()
}
fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}
fn default_min_words() -> usize {
    DEFAULT_MIN_WORDS
}
fn default_category_field() -> String {
    "Category".to_string()
}
fn default_pricing_field() -> String {
    "Pricing Model".to_string()
}
fn default_text_fields() -> Vec<String> {
    vec!["Tool Name".to_string(), "Description".to_string()]
}
fn default_workers() -> usize {
    16
}
fn default_timeout_secs() -> u64 {
    5
}
