//! Run parameters for a report.
//!
//! `ReportConfig::default()` reproduces the reference run: twenty rows over
//! the three date categories, seed 42, starting 2024-01-01.

use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default number of generated rows.
pub const DEFAULT_ROWS: usize = 20;

/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 42;

/// Default output directory for rendered charts.
pub const DEFAULT_OUTPUT_DIR: &str = "target/date-accuracy";

/// Default tracing filter for the binary.
pub const DEFAULT_LOG_FILTER: &str = "date_accuracy=info";

/// Category of an extracted date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Date a medication was started
    MedicationStartDate,
    /// Date a medication was stopped
    MedicationEndDate,
    /// Date of a diagnosis
    DiagnosisDate,
}

impl EntityType {
    /// All categories, in sampling order.
    pub const ALL: [Self; 3] = [
        Self::MedicationStartDate,
        Self::MedicationEndDate,
        Self::DiagnosisDate,
    ];

    /// Column label for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MedicationStartDate => "medication_start_date",
            Self::MedicationEndDate => "medication_end_date",
            Self::DiagnosisDate => "diagnosis_date",
        }
    }

    /// Parse a column label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == label)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the error-magnitude distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeWeight {
    /// Absolute offset in days
    pub days: u32,
    /// Sampling probability (relative weight)
    pub weight: f64,
}

impl MagnitudeWeight {
    /// Create a new entry.
    #[must_use]
    pub const fn new(days: u32, weight: f64) -> Self {
        Self { days, weight }
    }
}

/// Output image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
        }
    }
}

/// Full set of parameters for one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of generated records
    pub num_rows: usize,
    /// Categories sampled uniformly per row
    pub entity_types: Vec<EntityType>,
    /// RNG seed
    pub seed: u64,
    /// First ground-truth date of the daily sequence
    pub start_date: NaiveDate,
    /// Error magnitude distribution
    pub magnitudes: Vec<MagnitudeWeight>,
    /// Visible y-range of the box plot
    pub y_window: (f32, f32),
    /// Histogram bin count
    pub histogram_bins: usize,
    /// Chart dimensions
    pub figure: FigureSize,
    /// Directory receiving rendered charts
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            num_rows: DEFAULT_ROWS,
            entity_types: EntityType::ALL.to_vec(),
            seed: DEFAULT_SEED,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
            magnitudes: vec![
                MagnitudeWeight::new(1, 0.7),
                MagnitudeWeight::new(10, 0.2),
                MagnitudeWeight::new(50, 0.1),
            ],
            y_window: (-10.0, 10.0),
            histogram_bins: 30,
            figure: FigureSize::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ReportConfig {
    /// Set the row count.
    #[must_use]
    pub fn with_rows(mut self, num_rows: usize) -> Self {
        self.num_rows = num_rows;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Restrict sampling to the given categories.
    #[must_use]
    pub fn with_entity_types(mut self, entity_types: Vec<EntityType>) -> Self {
        self.entity_types = entity_types;
        self
    }

    /// Replace the error magnitude distribution.
    #[must_use]
    pub fn with_magnitudes(mut self, magnitudes: Vec<MagnitudeWeight>) -> Self {
        self.magnitudes = magnitudes;
        self
    }

    /// Set the chart output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Check that the parameters describe a run that can be generated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for empty inputs or inverted ranges, and
    /// `InvalidDistribution` for a magnitude table that cannot be sampled.
    pub fn validate(&self) -> Result<()> {
        if self.num_rows == 0 {
            return Err(ReportError::invalid_config("num_rows must be at least 1"));
        }
        if self.entity_types.is_empty() {
            return Err(ReportError::invalid_config(
                "at least one entity type is required",
            ));
        }
        if self.y_window.0.partial_cmp(&self.y_window.1) != Some(std::cmp::Ordering::Less) {
            return Err(ReportError::invalid_config(format!(
                "y window {:?} is empty",
                self.y_window
            )));
        }
        if self.histogram_bins == 0 {
            return Err(ReportError::invalid_config(
                "histogram_bins must be at least 1",
            ));
        }
        if self.magnitudes.is_empty() {
            return Err(ReportError::invalid_distribution(
                "magnitude table is empty",
            ));
        }
        if self
            .magnitudes
            .iter()
            .any(|m| !m.weight.is_finite() || m.weight < 0.0)
        {
            return Err(ReportError::invalid_distribution(
                "weights must be finite and non-negative",
            ));
        }
        if self.magnitudes.iter().all(|m| m.weight == 0.0) {
            return Err(ReportError::invalid_distribution("all weights are zero"));
        }
        Ok(())
    }
}
