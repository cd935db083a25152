//! Synthetic ground-truth / prediction date pairs.
//!
//! Ground-truth dates are a daily sequence from the configured start date.
//! Each prediction is the ground truth shifted by a signed error whose
//! magnitude comes from a small weighted table (1, 10 or 50 days by
//! default) and whose sign is a fair coin flip.
//!
//! Sampling happens column by column, all categories first, then all
//! magnitudes, then all signs, so the category column for a given seed
//! does not depend on the magnitude table.

use crate::config::{EntityType, ReportConfig};
use crate::context::RunContext;
use crate::error::{ReportError, Result};
use chrono::{Days, NaiveDate};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One ground-truth / predicted date pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRecord {
    /// Category of the extracted date
    pub entity_type: EntityType,
    /// Reference date
    pub date_gt: NaiveDate,
    /// Predicted date
    pub date_pred: NaiveDate,
}

impl DateRecord {
    /// Build a record whose prediction is `date_gt` shifted by `offset_days`.
    ///
    /// # Errors
    ///
    /// Returns `DateOutOfRange` if the shifted date is not representable.
    pub fn with_offset(entity_type: EntityType, date_gt: NaiveDate, offset_days: i64) -> Result<Self> {
        let shifted = if offset_days >= 0 {
            date_gt.checked_add_days(Days::new(offset_days.unsigned_abs()))
        } else {
            date_gt.checked_sub_days(Days::new(offset_days.unsigned_abs()))
        };
        let date_pred = shifted.ok_or_else(|| ReportError::DateOutOfRange {
            date: date_gt.to_string(),
            days: offset_days,
        })?;

        Ok(Self {
            entity_type,
            date_gt,
            date_pred,
        })
    }

    /// Signed `date_gt - date_pred` in whole days.
    #[must_use]
    pub fn day_difference(&self) -> i64 {
        self.date_gt.signed_duration_since(self.date_pred).num_days()
    }

    /// Whether the prediction equals the ground truth.
    #[must_use]
    pub fn exact_match(&self) -> bool {
        self.date_gt == self.date_pred
    }
}

/// Generator for synthetic record tables.
#[derive(Debug, Clone)]
pub struct DateGenerator {
    num_rows: usize,
    entity_types: Vec<EntityType>,
    start_date: NaiveDate,
    magnitudes: Vec<u32>,
    weights: WeightedIndex<f64>,
}

impl DateGenerator {
    /// Create a generator from a run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: &ReportConfig) -> Result<Self> {
        config.validate()?;
        let weights = WeightedIndex::new(config.magnitudes.iter().map(|m| m.weight))
            .map_err(|e| ReportError::invalid_distribution(e.to_string()))?;

        Ok(Self {
            num_rows: config.num_rows,
            entity_types: config.entity_types.clone(),
            start_date: config.start_date,
            magnitudes: config.magnitudes.iter().map(|m| m.days).collect(),
            weights,
        })
    }

    /// Number of rows produced per call to [`generate`](Self::generate).
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Produce the record table from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `DateOutOfRange` if a ground-truth or predicted date leaves
    /// the calendar range.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<Vec<DateRecord>> {
        let n = self.num_rows;

        let entities: Vec<EntityType> = (0..n)
            .map(|_| self.entity_types[rng.gen_range(0..self.entity_types.len())])
            .collect();
        let magnitudes: Vec<i64> = (0..n)
            .map(|_| i64::from(self.magnitudes[self.weights.sample(rng)]))
            .collect();
        let signs: Vec<i64> = (0..n)
            .map(|_| if rng.gen_bool(0.5) { 1 } else { -1 })
            .collect();

        let mut records = Vec::with_capacity(n);
        for (i, ((entity, magnitude), sign)) in entities
            .into_iter()
            .zip(magnitudes)
            .zip(signs)
            .enumerate()
        {
            let date_gt = self
                .start_date
                .checked_add_days(Days::new(i as u64))
                .ok_or_else(|| ReportError::DateOutOfRange {
                    date: self.start_date.to_string(),
                    days: i as i64,
                })?;
            records.push(DateRecord::with_offset(entity, date_gt, sign * magnitude)?);
        }

        tracing::debug!(rows = records.len(), "generated synthetic records");
        Ok(records)
    }
}

/// Generate the record table for `config` from the context's RNG.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a date overflows.
pub fn generate_records(config: &ReportConfig, ctx: &mut RunContext) -> Result<Vec<DateRecord>> {
    let generator = DateGenerator::new(config)?;
    let records = generator.generate(ctx.rng())?;
    ctx.record_metric("rows", records.len() as i64);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MagnitudeWeight;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_record_with_offset() {
        let gt = date(2024, 1, 1);
        let later = DateRecord::with_offset(EntityType::DiagnosisDate, gt, 10).unwrap();
        assert_eq!(later.date_pred, date(2024, 1, 11));
        assert_eq!(later.day_difference(), -10);
        assert!(!later.exact_match());

        let earlier = DateRecord::with_offset(EntityType::DiagnosisDate, gt, -50).unwrap();
        assert_eq!(earlier.date_pred, date(2023, 11, 12));
        assert_eq!(earlier.day_difference(), 50);

        let same = DateRecord::with_offset(EntityType::DiagnosisDate, gt, 0).unwrap();
        assert!(same.exact_match());
        assert_eq!(same.day_difference(), 0);
    }

    #[test]
    fn test_record_offset_out_of_range() {
        let err = DateRecord::with_offset(EntityType::DiagnosisDate, NaiveDate::MAX, 1).unwrap_err();
        assert!(matches!(err, ReportError::DateOutOfRange { days: 1, .. }));
    }

    #[test]
    fn test_generate_row_count_and_dates() {
        let config = ReportConfig::default();
        let generator = DateGenerator::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let records = generator.generate(&mut rng).unwrap();

        assert_eq!(records.len(), 20);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.date_gt, config.start_date + Days::new(i as u64));
        }
    }

    #[test]
    fn test_generate_magnitudes_from_table() {
        let config = ReportConfig::default().with_rows(500);
        let generator = DateGenerator::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let records = generator.generate(&mut rng).unwrap();

        for record in &records {
            let diff = record.day_difference().abs();
            assert!([1, 10, 50].contains(&diff), "unexpected magnitude {diff}");
        }
        let small = records.iter().filter(|r| r.day_difference().abs() == 1).count();
        assert!(small > 250, "1-day errors should dominate, got {small}/500");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = ReportConfig::default();
        let generator = DateGenerator::new(&config).unwrap();
        let first = generator.generate(&mut StdRng::seed_from_u64(42)).unwrap();
        let second = generator.generate(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);

        let other = generator.generate(&mut StdRng::seed_from_u64(43)).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_single_category_single_magnitude() {
        let config = ReportConfig::default()
            .with_rows(1)
            .with_entity_types(vec![EntityType::MedicationEndDate])
            .with_magnitudes(vec![MagnitudeWeight::new(10, 1.0)]);
        let generator = DateGenerator::new(&config).unwrap();
        let records = generator.generate(&mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity_type, EntityType::MedicationEndDate);
        assert_eq!(records[0].day_difference().abs(), 10);
    }

    #[test]
    fn test_zero_weight_magnitude_never_sampled() {
        let config = ReportConfig::default()
            .with_rows(200)
            .with_magnitudes(vec![MagnitudeWeight::new(1, 1.0), MagnitudeWeight::new(50, 0.0)]);
        let generator = DateGenerator::new(&config).unwrap();
        let records = generator.generate(&mut StdRng::seed_from_u64(3)).unwrap();
        assert!(records.iter().all(|r| r.day_difference().abs() == 1));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ReportConfig::default().with_rows(0);
        assert!(DateGenerator::new(&config).is_err());
    }

    #[test]
    fn test_generate_records_records_row_metric() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::default().with_output_dir(dir.path());
        let mut ctx = RunContext::from_config("generate", &config).unwrap();
        let records = generate_records(&config, &mut ctx).unwrap();

        assert_eq!(records.len(), config.num_rows);
        assert_eq!(
            ctx.get_metric("rows"),
            Some(&crate::context::MetricValue::Int(20))
        );
    }
}
