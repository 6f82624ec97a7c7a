//! Catalogue aggregation and statistics.
//!
//! Computes per-category and overall validity counts and averaged quality
//! metrics in a single pass over a [`CategorizedInput`].

use crate::error::Result;
use crate::models::{
    CategorizedInput, Category, CategoryStat, OverallStat, SiteMetrics, SiteRecord, StatsReport,
};
use serde_json::Value;
use std::cmp::Reverse;
use tracing::debug;

/// Prefix a URL must start with for its record to count as valid.
pub const URL_PREFIX: &str = "http";

/// Upper bound for DA and PA when range checks are enforced.
pub const MAX_AUTHORITY: f64 = 100.0;

/// Upper bound for the spam score when range checks are enforced.
pub const MAX_SPAM_SCORE: f64 = 14.0;

/// Extra conditions a record must meet to count as valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityRules {
    /// Require DA/PA in `[0, MAX_AUTHORITY]` and spam in `[0, MAX_SPAM_SCORE]`.
    pub enforce_metric_ranges: bool,
}

impl ValidityRules {
    /// Return the record's metrics if the record is valid under these rules.
    pub fn accept<'a>(&self, record: &'a SiteRecord) -> Option<&'a SiteMetrics> {
        let url = record.url.as_deref()?;
        if !url.starts_with(URL_PREFIX) {
            return None;
        }

        let metrics = record.metrics.as_ref()?;
        if self.enforce_metric_ranges && !metrics_in_range(metrics) {
            return None;
        }

        Some(metrics)
    }
}

fn metrics_in_range(metrics: &SiteMetrics) -> bool {
    let authority = 0.0..=MAX_AUTHORITY;
    authority.contains(&metrics.da)
        && authority.contains(&metrics.pa)
        && (0.0..=MAX_SPAM_SCORE).contains(&metrics.spam_score)
}

/// Raw counts and metric sums, before any rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tally {
    total: usize,
    valid: usize,
    da: f64,
    pa: f64,
    spam: f64,
}

impl Tally {
    fn record(&mut self, metrics: Option<&SiteMetrics>) {
        self.total += 1;
        if let Some(m) = metrics {
            self.valid += 1;
            self.da += m.da;
            self.pa += m.pa;
            self.spam += m.spam_score;
        }
    }

    fn absorb(&mut self, other: &Tally) {
        self.total += other.total;
        self.valid += other.valid;
        self.da += other.da;
        self.pa += other.pa;
        self.spam += other.spam;
    }

    /// Averages as (da, pa, spam). All zero when nothing is valid.
    fn averages(&self) -> (i64, i64, f64) {
        if self.valid == 0 {
            return (0, 0, 0.0);
        }

        let n = self.valid as f64;
        (
            round_half_up(self.da / n) as i64,
            round_half_up(self.pa / n) as i64,
            round_half_up(self.spam / n * 10.0) / 10.0,
        )
    }
}

/// Round to the nearest integer, ties toward positive infinity, like
/// `Math.round`. Values just below one half round down.
fn round_half_up(x: f64) -> f64 {
    let f = x.floor();
    if x - f >= 0.5 {
        f + 1.0
    } else {
        f
    }
}

fn tally_category(category: &Category, rules: &ValidityRules) -> Tally {
    let mut tally = Tally::default();
    for record in &category.records {
        tally.record(rules.accept(record));
    }
    tally
}

/// Aggregate a catalogue into overall and per-category statistics.
///
/// Overall averages are computed from the raw summed metrics, not from the
/// rounded category averages. Categories are stably sorted by valid count,
/// largest first.
pub fn aggregate(input: &CategorizedInput, rules: &ValidityRules) -> StatsReport {
    if input.is_empty() {
        debug!("Catalogue has no categories");
    }

    let mut overall = Tally::default();
    let mut categories = Vec::with_capacity(input.len());

    for category in &input.categories {
        let tally = tally_category(category, rules);
        overall.absorb(&tally);

        let (avg_da, avg_pa, avg_spam) = tally.averages();
        debug!(
            "Category {}: {}/{} valid (DA {}, PA {}, spam {})",
            category.name, tally.valid, tally.total, avg_da, avg_pa, avg_spam
        );

        categories.push(CategoryStat {
            name: category.name.clone(),
            total: tally.total,
            valid: tally.valid,
            avg_da,
            avg_pa,
            avg_spam,
        });
    }

    // Vec::sort_by_key is stable, so ties keep document order.
    categories.sort_by_key(|c| Reverse(c.valid));

    let (avg_da, avg_pa, avg_spam) = overall.averages();
    StatsReport {
        overall: OverallStat {
            total: overall.total,
            valid: overall.valid,
            avg_da,
            avg_pa,
            avg_spam,
        },
        categories,
    }
}

/// Check the shape of a JSON document and aggregate it.
pub fn aggregate_value(value: &Value, rules: &ValidityRules) -> Result<StatsReport> {
    let input = CategorizedInput::from_value(value)?;
    Ok(aggregate(&input, rules))
}

/// Categories with no valid records at all.
pub fn empty_categories(stats: &StatsReport) -> Vec<&CategoryStat> {
    stats.categories.iter().filter(|c| c.valid == 0).collect()
}
