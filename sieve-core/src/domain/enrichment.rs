// sieve-core/src/domain/enrichment.rs

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::error::DomainError;
use crate::domain::standardize::title_case;
use crate::domain::table::{RecordTable, Value};

pub const FALLBACK_CATEGORY: &str = "General";

/// Maps free-form pricing text onto a small set of pricing models.
pub struct PricingNormalizer {
    field: String,
}

impl PricingNormalizer {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    pub fn normalize(value: &Value) -> Value {
        if value.is_missing() {
            return Value::text("Unknown");
        }
        let raw = value.to_string();
        let lower = raw.trim().to_lowercase();
        let model = if lower.contains("free") && lower.contains("trial") {
            "Freemium".to_string()
        } else if lower.contains("free") {
            "Free".to_string()
        } else if lower.contains("subscription") || lower.contains("monthly") {
            "Subscription".to_string()
        } else if lower.contains("pay") {
            "Pay-per-use".to_string()
        } else {
            title_case(raw.trim())
        };
        Value::Text(model)
    }

    /// Returns the normalized table and the number of values that changed.
    pub fn apply(&self, table: &RecordTable) -> Result<(RecordTable, usize), DomainError> {
        let col = table.column_index(&self.field)?;
        let mut out = table.clone();
        let mut changed = 0;
        for (row, value) in table.column(col).enumerate() {
            let normalized = Self::normalize(value);
            if normalized != *value {
                out.set(row, col, normalized);
                changed += 1;
            }
        }
        info!(field = %self.field, changed, "Pricing normalized");
        Ok((out, changed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(&k.to_lowercase()))
    }
}

/// Ordered keyword table; the first matching rule wins.
pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Image Generation",
            &["image", "art", "design", "visual", "photo", "drawing", "midjourney", "dall-e", "stable diffusion", "canva"],
        ),
        CategoryRule::new(
            "Text Generation",
            &["text", "writing", "content", "copy", "article", "blog", "chatgpt", "claude", "jasper", "writer"],
        ),
        CategoryRule::new(
            "Code Assistant",
            &["code", "programming", "developer", "github", "copilot", "coding", "python", "javascript"],
        ),
        CategoryRule::new(
            "Video Generation",
            &["video", "animation", "movie", "film", "motion", "youtube", "tiktok"],
        ),
        CategoryRule::new(
            "Audio Generation",
            &["audio", "music", "sound", "voice", "speech", "podcast", "spotify"],
        ),
        CategoryRule::new(
            "Productivity",
            &["productivity", "automation", "workflow", "task", "management", "notion", "trello"],
        ),
        CategoryRule::new(
            "Marketing",
            &["marketing", "seo", "advertising", "social media", "email", "campaign"],
        ),
        CategoryRule::new(
            "Data Analysis",
            &["data", "analytics", "analysis", "insights", "dashboard", "tableau", "power bi"],
        ),
        CategoryRule::new(
            "Research",
            &["research", "academic", "paper", "study", "scholar", "science"],
        ),
        CategoryRule::new(
            "Translation",
            &["translation", "language", "translate", "multilingual", "google translate"],
        ),
        CategoryRule::new(
            "Customer Service",
            &["customer", "support", "chatbot", "help desk", "zendesk"],
        ),
        CategoryRule::new(
            "Education",
            &["education", "learning", "teaching", "course", "tutorial", "coursera"],
        ),
        CategoryRule::new(
            "Health",
            &["health", "medical", "healthcare", "fitness", "wellness", "hospital"],
        ),
        CategoryRule::new(
            "Finance",
            &["finance", "financial", "trading", "investment", "budget", "quickbooks"],
        ),
    ]
}

/// Fills in a category for records that have none (or only the fallback one)
/// by keyword matching over some text fields. Never rejects a record.
pub struct Categorizer {
    category_field: String,
    text_fields: Vec<String>,
    rules: Vec<CategoryRule>,
}

impl Categorizer {
    pub fn new(
        category_field: impl Into<String>,
        text_fields: Vec<String>,
        rules: Vec<CategoryRule>,
    ) -> Self {
        Self {
            category_field: category_field.into(),
            text_fields,
            rules,
        }
    }

    fn needs_category(value: &Value) -> bool {
        match value {
            Value::Missing => true,
            Value::Text(s) => s.trim() == FALLBACK_CATEGORY,
            _ => false,
        }
    }

    pub fn categorize(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.matches(&lower))
            .map(|r| r.category.as_str())
    }

    /// Returns the enriched table and the number of records recategorized.
    /// Text fields absent from the table are skipped.
    pub fn apply(&self, table: &RecordTable) -> Result<(RecordTable, usize), DomainError> {
        let col = table.column_index(&self.category_field)?;
        let text_cols: Vec<usize> = self
            .text_fields
            .iter()
            .filter_map(|f| table.schema().position(f))
            .collect();

        let mut out = table.clone();
        let mut recategorized = 0;
        for (row, record) in table.records().iter().enumerate() {
            if !Self::needs_category(record.get(col)) {
                continue;
            }
            let text = text_cols
                .iter()
                .map(|&c| record.get(c).to_string())
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(category) = self.categorize(&text) {
                debug!(row, category, "Recategorized record");
                out.set(row, col, Value::text(category));
                recategorized += 1;
            }
        }
        info!(recategorized, "Categorization finished");
        Ok((out, recategorized))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_models() {
        let cases = [
            ("Free trial, then paid", "Freemium"),
            ("FREE", "Free"),
            ("$20 monthly", "Subscription"),
            ("Pay as you go", "Pay-per-use"),
            ("enterprise quote", "Enterprise Quote"),
        ];
        for (raw, expected) in cases {
            assert_eq!(PricingNormalizer::normalize(&Value::text(raw)), Value::text(expected), "{}", raw);
        }
        assert_eq!(PricingNormalizer::normalize(&Value::Missing), Value::text("Unknown"));
    }

    #[test]
    fn test_pricing_counts_only_changes() {
        let table = RecordTable::from_rows(
            ["Pricing Model"],
            vec![vec![Value::text("Free")], vec![Value::text("free tier")], vec![Value::Missing]],
        )
        .unwrap();
        let (out, changed) = PricingNormalizer::new("Pricing Model").apply(&table).unwrap();
        assert_eq!(changed, 2);
        assert_eq!(out.value(1, "Pricing Model").unwrap(), &Value::text("Free"));
    }

    #[test]
    fn test_categorizer_fills_general_and_missing_only() {
        let table = RecordTable::from_rows(
            ["Tool Name", "Description", "Category"],
            vec![
                vec![Value::text("Pixelize"), Value::text("Turn a photo into art"), Value::text("General")],
                vec![Value::text("Ledger"), Value::text("Budget planner"), Value::Missing],
                vec![Value::text("Copilot"), Value::text("AI pair programmer"), Value::text("Code Assistant")],
                vec![Value::text("Zzz"), Value::text("Nothing to see"), Value::text("General")],
            ],
        )
        .unwrap();

        let categorizer = Categorizer::new(
            "Category",
            vec!["Tool Name".into(), "Description".into(), "Nope".into()],
            default_category_rules(),
        );
        let (out, count) = categorizer.apply(&table).unwrap();
        assert_eq!(count, 2);
        assert_eq!(out.value(0, "Category").unwrap(), &Value::text("Image Generation"));
        assert_eq!(out.value(1, "Category").unwrap(), &Value::text("Finance"));
        assert_eq!(out.value(2, "Category").unwrap(), &Value::text("Code Assistant"));
        assert_eq!(out.value(3, "Category").unwrap(), &Value::text("General"));
    }
}
