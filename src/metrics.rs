//! Accuracy metrics over scored date records.
//!
//! Scoring adds the derived columns to each record without touching its
//! dates; aggregation then produces a descriptive summary of the day
//! differences, two global tolerance percentages and a per-category table.

use crate::config::EntityType;
use crate::generator::DateRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Narrow tolerance, in days.
pub const NARROW_WINDOW_DAYS: i64 = 7;

/// Wide tolerance, in days.
pub const WIDE_WINDOW_DAYS: i64 = 14;

/// A record together with its derived comparison columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: DateRecord,
    pub exact_match: bool,
    pub day_difference: i64,
    pub within_7_days: bool,
    pub within_14_days: bool,
}

impl ScoredRecord {
    /// Derive the comparison columns for `record`.
    #[must_use]
    pub fn score(record: DateRecord) -> Self {
        let day_difference = record.day_difference();
        Self {
            record,
            exact_match: record.exact_match(),
            day_difference,
            within_7_days: day_difference.abs() <= NARROW_WINDOW_DAYS,
            within_14_days: day_difference.abs() <= WIDE_WINDOW_DAYS,
        }
    }

    /// Category of the underlying record.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.record.entity_type
    }
}

/// Score every record, preserving order.
#[must_use]
pub fn score_records(records: &[DateRecord]) -> Vec<ScoredRecord> {
    records.iter().copied().map(ScoredRecord::score).collect()
}

/// Descriptive statistics of the day-difference column.
///
/// `std` uses the sample (n - 1) denominator and is NaN for fewer than two
/// values; every statistic except `count` is NaN for an empty input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl DistributionSummary {
    /// Summarize `values`.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                median: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };

        Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    /// Rows as `(label, value)` pairs in display order.
    #[must_use]
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Quantile of an ascending slice, interpolating linearly between the two
/// nearest ranks. Returns NaN for an empty slice.
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Per-category tolerance accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryAccuracy {
    pub entity_type: EntityType,
    pub rows: usize,
    pub within_7_days: f64,
    pub within_14_days: f64,
}

/// All aggregates of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    pub summary: DistributionSummary,
    pub exact_match_pct: f64,
    pub within_7_days_pct: f64,
    pub within_14_days_pct: f64,
    /// Categories present in the data, ordered by label
    pub grouped: Vec<CategoryAccuracy>,
}

impl AccuracyMetrics {
    /// Aggregate scored records.
    #[must_use]
    pub fn compute(scored: &[ScoredRecord]) -> Self {
        let diffs: Vec<f64> = scored.iter().map(|s| s.day_difference as f64).collect();

        let metrics = Self {
            summary: DistributionSummary::from_values(&diffs),
            exact_match_pct: percent(scored, |s| s.exact_match),
            within_7_days_pct: percent(scored, |s| s.within_7_days),
            within_14_days_pct: percent(scored, |s| s.within_14_days),
            grouped: group_by_entity(scored),
        };
        tracing::debug!(
            rows = metrics.summary.count,
            groups = metrics.grouped.len(),
            "computed accuracy metrics"
        );
        metrics
    }

    /// Accuracy row for one category, if it has any records.
    #[must_use]
    pub fn category(&self, entity_type: EntityType) -> Option<&CategoryAccuracy> {
        self.grouped.iter().find(|g| g.entity_type == entity_type)
    }
}

/// `100 * mean(pred)` over `scored`; NaN when empty.
fn percent<F>(scored: &[ScoredRecord], pred: F) -> f64
where
    F: Fn(&ScoredRecord) -> bool,
{
    if scored.is_empty() {
        return f64::NAN;
    }
    let hits = scored.iter().filter(|s| pred(*s)).count();
    100.0 * hits as f64 / scored.len() as f64
}

fn group_by_entity(scored: &[ScoredRecord]) -> Vec<CategoryAccuracy> {
    let mut groups: BTreeMap<&'static str, Vec<ScoredRecord>> = BTreeMap::new();
    for s in scored {
        groups.entry(s.entity_type().as_str()).or_default().push(*s);
    }

    groups
        .into_values()
        .map(|rows| CategoryAccuracy {
            entity_type: rows[0].entity_type(),
            rows: rows.len(),
            within_7_days: percent(&rows, |s| s.within_7_days),
            within_14_days: percent(&rows, |s| s.within_14_days),
        })
        .collect()
}
