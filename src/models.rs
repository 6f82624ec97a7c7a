//! Data models for site catalogues and their statistics.
//!
//! Input types are read leniently from arbitrary JSON so that partially
//! populated catalogues can still be summarised. Derived types are plain
//! numeric records with no presentation markup.

use crate::error::{json_kind, Result, StatsError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Quality metrics attached to a site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMetrics {
    /// Domain authority.
    pub da: f64,
    /// Page authority.
    pub pa: f64,
    /// Link-spam risk indicator.
    pub spam_score: f64,
}

impl SiteMetrics {
    /// Read metrics from any non-null JSON value.
    ///
    /// Missing or non-numeric fields are 0, so a non-object value such as
    /// `5` or `[]` yields all-zero metrics.
    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        let field = |key: &str| value.get(key).and_then(Value::as_f64).unwrap_or(0.0);

        Some(Self {
            da: field("da"),
            pa: field("pa"),
            spam_score: field("spam_score"),
        })
    }
}

/// One entry of a category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Site URL, present only when the source field is a string.
    pub url: Option<String>,
    /// Metrics, present whenever the source field is non-null.
    pub metrics: Option<SiteMetrics>,
    /// Bare domain name, informational.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Human-readable site name, informational.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SiteRecord {
    /// Build a record from any JSON value.
    ///
    /// Non-object values yield an empty record, which the aggregator treats
    /// as invalid.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(String::from);

        Self {
            url: text("url"),
            metrics: value.get("metrics").and_then(SiteMetrics::from_value),
            domain: text("domain"),
            name: text("name"),
        }
    }
}

/// A named, ordered list of site records.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub records: Vec<SiteRecord>,
}

/// Mapping from category name to records, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedInput {
    pub categories: Vec<Category>,
}

impl CategorizedInput {
    /// Interpret a JSON document as a categorized catalogue.
    ///
    /// The root must be an object and every value must be an array; anything
    /// else is an [`StatsError::InputShape`] and no partial input is kept.
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value.as_object().ok_or_else(|| {
            StatsError::InputShape(format!(
                "expected an object of categories, found {}",
                json_kind(value)
            ))
        })?;

        let mut categories = Vec::with_capacity(root.len());
        for (name, items) in root {
            let items = items.as_array().ok_or_else(|| {
                StatsError::InputShape(format!(
                    "category `{}` must be an array of sites, found {}",
                    name,
                    json_kind(items)
                ))
            })?;

            categories.push(Category {
                name: name.clone(),
                records: items.iter().map(SiteRecord::from_value).collect(),
            });
        }

        Ok(Self { categories })
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Statistics for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    /// Category key, unmodified.
    pub name: String,
    /// All records, valid or not.
    pub total: usize,
    /// Records passing the validity predicate.
    pub valid: usize,
    pub avg_da: i64,
    pub avg_pa: i64,
    /// Rounded to one decimal digit.
    pub avg_spam: f64,
}

impl CategoryStat {
    /// Category name with underscores shown as spaces.
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// Statistics across all categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStat {
    pub total: usize,
    pub valid: usize,
    pub avg_da: i64,
    pub avg_pa: i64,
    pub avg_spam: f64,
}

/// Result of one aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    /// Totals and averages over every category.
    pub overall: OverallStat,
    /// Per-category statistics, largest valid count first.
    pub categories: Vec<CategoryStat>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the catalogue came from (path or URL).
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Whether metric range checks were part of the validity predicate.
    pub strict_ranges: bool,
    /// Number of categories in the catalogue.
    pub category_count: usize,
}

/// A rendered-ready statistics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub stats: StatsReport,
}

impl Report {
    /// Pair statistics with metadata for the given source.
    pub fn new(source: impl Into<String>, strict_ranges: bool, stats: StatsReport) -> Self {
        Self {
            metadata: ReportMetadata {
                source: source.into(),
                generated_at: Utc::now(),
                strict_ranges,
                category_count: stats.categories.len(),
            },
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_record_from_object() {
        let record = SiteRecord::from_value(&json!({
            "url": "https://medium.com",
            "domain": "medium.com",
            "name": "Medium",
            "metrics": {"da": 94, "pa": 93, "spam_score": 1}
        }));

        assert_eq!(record.url.as_deref(), Some("https://medium.com"));
        assert_eq!(record.domain.as_deref(), Some("medium.com"));
        assert_eq!(record.name.as_deref(), Some("Medium"));
        assert_eq!(
            record.metrics,
            Some(SiteMetrics {
                da: 94.0,
                pa: 93.0,
                spam_score: 1.0
            })
        );
    }

    #[test]
    fn test_site_record_lenient_fields() {
        let record = SiteRecord::from_value(&json!({"url": 42, "metrics": null}));
        assert_eq!(record.url, None);
        assert_eq!(record.metrics, None);

        let record = SiteRecord::from_value(&json!({"url": "http://x", "metrics": 5}));
        assert_eq!(record.metrics, Some(SiteMetrics::default()));

        let record = SiteRecord::from_value(&json!({"url": "http://x", "metrics": []}));
        assert_eq!(record.metrics, Some(SiteMetrics::default()));

        let record = SiteRecord::from_value(&json!("http://not-a-record"));
        assert_eq!(record, SiteRecord::default());

        let record = SiteRecord::from_value(&Value::Null);
        assert_eq!(record, SiteRecord::default());
    }

    #[test]
    fn test_partial_metrics_default_to_zero() {
        let record = SiteRecord::from_value(&json!({
            "url": "http://x",
            "metrics": {"da": 12, "pa": "high"}
        }));
        assert_eq!(
            record.metrics,
            Some(SiteMetrics {
                da: 12.0,
                pa: 0.0,
                spam_score: 0.0
            })
        );
    }

    #[test]
    fn test_categorized_input_preserves_order() {
        let input = CategorizedInput::from_value(&json!({
            "zeta": [],
            "alpha": [{"url": "http://a"}],
            "mid": [null, {}]
        }))
        .unwrap();

        let names: Vec<_> = input.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(input.categories[2].records.len(), 2);
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_categorized_input_rejects_bad_root() {
        let err = CategorizedInput::from_value(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, StatsError::InputShape(_)));
        assert!(err.to_string().contains("found an array"));
    }

    #[test]
    fn test_categorized_input_rejects_bad_category() {
        let err = CategorizedInput::from_value(&json!({
            "ok": [],
            "broken": {"url": "http://x"}
        }))
        .unwrap_err();
        assert!(matches!(err, StatsError::InputShape(_)));
        assert!(err.to_string().contains("`broken`"));
    }

    #[test]
    fn test_display_name() {
        let stat = CategoryStat {
            name: "guest_post_sites".to_string(),
            total: 0,
            valid: 0,
            avg_da: 0,
            avg_pa: 0,
            avg_spam: 0.0,
        };
        assert_eq!(stat.display_name(), "guest post sites");
    }

    #[test]
    fn test_category_stat_serializes_camel_case() {
        let stat = CategoryStat {
            name: "tech".to_string(),
            total: 2,
            valid: 1,
            avg_da: 50,
            avg_pa: 40,
            avg_spam: 1.0,
        };
        let value = serde_json::to_value(&stat).unwrap();
        assert_eq!(value["avgDa"], json!(50));
        assert_eq!(value["avgSpam"], json!(1.0));
    }
}
