//! # Date Accuracy
//!
//! Scores predicted calendar dates against ground truth. A run synthesizes
//! a seeded table of `(entity_type, date_gt, date_pred)` rows, derives
//! per-row comparison columns, aggregates them, renders two charts and
//! prints the result.
//!
//! ## Modules
//!
//! - **generator**: seeded synthetic records
//! - **metrics**: derived columns, distribution summary, tolerance accuracy
//! - **density**: histogram bins and Gaussian KDE
//! - **plot**: SVG box/strip chart and histogram
//! - **report**: the end-to-end run and its text/JSON output

pub mod config;
pub mod context;
pub mod density;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod plot;
pub mod report;

pub use error::{ReportError, Result};

/// Re-exports for convenient access
pub mod prelude {
    pub use crate::config::{EntityType, MagnitudeWeight, ReportConfig};
    pub use crate::context::{MetricValue, RunContext};
    pub use crate::error::{ReportError, Result};
    pub use crate::generator::{generate_records, DateGenerator, DateRecord};
    pub use crate::metrics::{
        score_records, AccuracyMetrics, CategoryAccuracy, DistributionSummary, ScoredRecord,
    };
    pub use crate::plot::Charts;
    pub use crate::report::DateAccuracyReport;
}
