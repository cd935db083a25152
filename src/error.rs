//! Error types for date accuracy report operations.
//!
//! Every stage propagates failures unchanged to the caller; nothing is
//! retried or partially recovered.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while generating, scoring or rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A run parameter is out of range or inconsistent.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The error-magnitude distribution cannot be sampled.
    #[error("invalid distribution: {reason}")]
    InvalidDistribution { reason: String },

    /// A date shift left the representable calendar range.
    #[error("date out of range: {date} shifted by {days} days")]
    DateOutOfRange { date: String, days: i64 },

    /// Rendering a chart failed.
    #[error("plot '{plot}' failed: {reason}")]
    Plot { plot: PathBuf, reason: String },

    /// I/O error during file or console output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ReportError {
    /// Create a new invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a new invalid distribution error.
    #[must_use]
    pub fn invalid_distribution(reason: impl Into<String>) -> Self {
        Self::InvalidDistribution {
            reason: reason.into(),
        }
    }

    /// Create a plotting error for the chart written to `plot`.
    #[must_use]
    pub fn plot(plot: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Plot {
            plot: plot.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
