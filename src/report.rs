//! The date accuracy report: generate, score, aggregate, render, print.
//!
//! # Example
//!
//! ```no_run
//! use date_accuracy::prelude::*;
//!
//! fn main() -> date_accuracy::Result<()> {
//!     let config = ReportConfig::default();
//!     let mut ctx = RunContext::from_config("date-accuracy", &config)?;
//!     let mut report = DateAccuracyReport::build(&config, &mut ctx)?;
//!     report.render(&mut ctx, &config)?;
//!     report.write_text(&mut std::io::stdout().lock())?;
//!     Ok(())
//! }
//! ```

use crate::config::ReportConfig;
use crate::context::RunContext;
use crate::error::Result;
use crate::generator::generate_records;
use crate::metrics::{score_records, AccuracyMetrics, DistributionSummary, ScoredRecord};
use crate::plot::{self, Charts};
use serde::Serialize;
use std::io::Write;
use std::time::Instant;

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct DateAccuracyReport {
    seed: u64,
    records: Vec<ScoredRecord>,
    metrics: AccuracyMetrics,
    charts: Option<Charts>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    seed: u64,
    rows: usize,
    summary: &'a DistributionSummary,
    exact_match_pct: f64,
    within_7_days_pct: f64,
    within_14_days_pct: f64,
    grouped: &'a [crate::metrics::CategoryAccuracy],
    charts: Option<JsonCharts>,
    records: &'a [ScoredRecord],
}

#[derive(Serialize)]
struct JsonCharts {
    box_plot: String,
    histogram: String,
}

impl DateAccuracyReport {
    /// Generate and score the records, then compute all aggregates.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a date overflows.
    pub fn build(config: &ReportConfig, ctx: &mut RunContext) -> Result<Self> {
        let started = Instant::now();
        let records = generate_records(config, ctx)?;
        ctx.record_duration("generate", started.elapsed());

        let started = Instant::now();
        let scored = score_records(&records);
        let metrics = AccuracyMetrics::compute(&scored);
        ctx.record_duration("metrics", started.elapsed());
        ctx.record_float_metric("within_7_days_pct", metrics.within_7_days_pct);
        ctx.record_float_metric("within_14_days_pct", metrics.within_14_days_pct);

        tracing::info!(
            rows = scored.len(),
            within_7 = metrics.within_7_days_pct,
            within_14 = metrics.within_14_days_pct,
            "metrics computed"
        );

        Ok(Self {
            seed: ctx.seed(),
            records: scored,
            metrics,
            charts: None,
        })
    }

    /// Render both charts into the context's output directory.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Plot` if either chart fails to draw.
    pub fn render(&mut self, ctx: &mut RunContext, config: &ReportConfig) -> Result<&Charts> {
        let started = Instant::now();
        let charts = plot::render_all(ctx, &self.records, config)?;
        ctx.record_duration("render", started.elapsed());
        Ok(self.charts.insert(charts))
    }

    /// Scored records in generation order.
    #[must_use]
    pub fn records(&self) -> &[ScoredRecord] {
        &self.records
    }

    /// Aggregated metrics.
    #[must_use]
    pub fn metrics(&self) -> &AccuracyMetrics {
        &self.metrics
    }

    /// Rendered chart paths, if [`render`](Self::render) has run.
    #[must_use]
    pub fn charts(&self) -> Option<&Charts> {
        self.charts.as_ref()
    }

    /// Print the summary, the two global percentages and the grouped table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_text<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Overall Metrics Summary:")?;
        write_summary(out, &self.metrics.summary)?;

        writeln!(out)?;
        writeln!(
            out,
            "Within ±7 Days Accuracy: {:.2}%",
            self.metrics.within_7_days_pct
        )?;
        writeln!(
            out,
            "Within ±14 Days Accuracy: {:.2}%",
            self.metrics.within_14_days_pct
        )?;

        writeln!(out)?;
        writeln!(out, "Grouped Metrics (By Entity Type):")?;
        write_grouped(out, &self.metrics)?;
        Ok(())
    }

    /// Write the full report, records included, as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_json<W: Write>(&self, out: &mut W) -> Result<()> {
        let report = JsonReport {
            seed: self.seed,
            rows: self.records.len(),
            summary: &self.metrics.summary,
            exact_match_pct: self.metrics.exact_match_pct,
            within_7_days_pct: self.metrics.within_7_days_pct,
            within_14_days_pct: self.metrics.within_14_days_pct,
            grouped: &self.metrics.grouped,
            charts: self.charts.as_ref().map(|c| JsonCharts {
                box_plot: c.box_plot.display().to_string(),
                histogram: c.histogram.display().to_string(),
            }),
            records: &self.records,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        Ok(())
    }
}

fn write_summary<W: Write>(out: &mut W, summary: &DistributionSummary) -> Result<()> {
    let rows = summary.rows();
    let cells: Vec<String> = rows.iter().map(|(_, v)| format!("{v:.6}")).collect();
    let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    let value_width = cells.iter().map(String::len).max().unwrap_or(0);

    for ((label, _), cell) in rows.iter().zip(&cells) {
        writeln!(out, "{label:<label_width$}    {cell:>value_width$}")?;
    }
    writeln!(out, "Name: day_difference, dtype: float64")?;
    Ok(())
}

fn write_grouped<W: Write>(out: &mut W, metrics: &AccuracyMetrics) -> Result<()> {
    const INDEX: &str = "entity_type";
    const COLUMNS: [&str; 2] = ["within_7_days", "within_14_days"];

    let cells: Vec<[String; 2]> = metrics
        .grouped
        .iter()
        .map(|g| {
            [
                format!("{:.6}", g.within_7_days),
                format!("{:.6}", g.within_14_days),
            ]
        })
        .collect();

    let index_width = metrics
        .grouped
        .iter()
        .map(|g| g.entity_type.as_str().len())
        .chain(std::iter::once(INDEX.len()))
        .max()
        .unwrap_or(INDEX.len());
    let widths: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(header.len())
        })
        .collect();

    let header: String = COLUMNS
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("  {h:>w$}"))
        .collect();
    writeln!(out, "{:index_width$}{header}", "")?;
    writeln!(out, "{INDEX:<index_width$}")?;

    for (g, row) in metrics.grouped.iter().zip(&cells) {
        let values: String = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("  {v:>w$}"))
            .collect();
        writeln!(out, "{:<index_width$}{values}", g.entity_type.as_str())?;
    }
    Ok(())
}
