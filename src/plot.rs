//! Chart rendering for the day-difference distribution.
//!
//! Two SVG charts are written to the run's output directory:
//!
//! - a box plot per entity type with the individual rows overlaid as a
//!   jittered strip, a dashed reference line at zero and the y-axis limited
//!   to the configured window;
//! - a histogram of all day differences with a Gaussian KDE overlay scaled
//!   to bin counts.
//!
//! Drawing errors are not handled here; they surface as `ReportError::Plot`.

use crate::config::{EntityType, ReportConfig};
use crate::context::RunContext;
use crate::density::{GaussianKde, Histogram};
use crate::error::{ReportError, Result};
use crate::metrics::{quantile_sorted, ScoredRecord};
use plotters::prelude::*;
use rand::Rng;
use std::path::{Path, PathBuf};

/// File name of the box/strip chart.
pub const BOX_PLOT_FILE: &str = "day_difference_by_entity.svg";

/// File name of the histogram chart.
pub const HISTOGRAM_FILE: &str = "day_difference_histogram.svg";

/// Half-width of the strip-plot jitter, in category units.
pub const JITTER: f64 = 0.15;

const BOX_HALF_WIDTH: f64 = 0.3;
const KDE_POINTS: usize = 200;

const BLUES: [RGBColor; 3] = [
    RGBColor(198, 219, 239),
    RGBColor(107, 174, 214),
    RGBColor(33, 113, 181),
];

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Paths of the rendered charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charts {
    pub box_plot: PathBuf,
    pub histogram: PathBuf,
}

/// Five-number box statistics with Tukey whiskers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`
    pub whisker_low: f64,
    /// Largest value within `q3 + 1.5 * IQR`
    pub whisker_high: f64,
}

impl BoxStats {
    /// Compute box statistics, or `None` for empty input.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
        })
    }
}

/// Entity types in order of first appearance.
#[must_use]
pub fn categories_in_order(scored: &[ScoredRecord]) -> Vec<EntityType> {
    let mut seen = Vec::new();
    for s in scored {
        if !seen.contains(&s.entity_type()) {
            seen.push(s.entity_type());
        }
    }
    seen
}

/// Render both charts into the context's output directory.
///
/// # Errors
///
/// Returns `ReportError::Plot` if either chart fails to draw.
pub fn render_all(
    ctx: &mut RunContext,
    scored: &[ScoredRecord],
    config: &ReportConfig,
) -> Result<Charts> {
    let charts = Charts {
        box_plot: ctx.path(BOX_PLOT_FILE),
        histogram: ctx.path(HISTOGRAM_FILE),
    };

    let mut jitter = ctx.stream_rng("strip-jitter");
    render_box_strip(&charts.box_plot, scored, config, &mut jitter)?;
    render_histogram(&charts.histogram, scored, config)?;

    ctx.record_string_metric("box_plot", charts.box_plot.display().to_string());
    ctx.record_string_metric("histogram", charts.histogram.display().to_string());
    tracing::info!(dir = %ctx.output_dir().display(), "charts rendered");
    Ok(charts)
}

/// Render the box + strip chart of day differences by entity type.
///
/// # Errors
///
/// Returns `ReportError::Plot` if drawing fails.
pub fn render_box_strip<R: Rng>(
    path: &Path,
    scored: &[ScoredRecord],
    config: &ReportConfig,
    rng: &mut R,
) -> Result<()> {
    draw_box_strip(path, scored, config, rng).map_err(|e| ReportError::plot(path, e))?;
    tracing::debug!(path = %path.display(), "box plot written");
    Ok(())
}

/// Render the histogram of day differences with its KDE overlay.
///
/// # Errors
///
/// Returns `ReportError::Plot` if drawing fails.
pub fn render_histogram(path: &Path, scored: &[ScoredRecord], config: &ReportConfig) -> Result<()> {
    draw_histogram(path, scored, config).map_err(|e| ReportError::plot(path, e))?;
    tracing::debug!(path = %path.display(), "histogram written");
    Ok(())
}

fn draw_box_strip<R: Rng>(
    path: &Path,
    scored: &[ScoredRecord],
    config: &ReportConfig,
    rng: &mut R,
) -> DrawResult {
    let categories = categories_in_order(scored);
    let labels: Vec<&'static str> = categories.iter().map(EntityType::as_str).collect();
    let (y_lo, y_hi) = config.y_window;
    let clip = |v: f64| (v as f32).clamp(y_lo, y_hi);
    let x_max = categories.len().max(1) as f64 - 0.5;

    let root = SVGBackend::new(path, (config.figure.width, config.figure.height))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Day Difference Distribution by Entity Type", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..x_max, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() * 2 + 1)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc("Entity Type")
        .y_desc("Day Difference")
        .draw()?;

    for (i, entity) in categories.iter().enumerate() {
        let values: Vec<f64> = scored
            .iter()
            .filter(|s| s.entity_type() == *entity)
            .map(|s| s.day_difference as f64)
            .collect();
        let Some(stats) = BoxStats::from_values(&values) else {
            continue;
        };

        let x = i as f64;
        let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);
        let cap = BOX_HALF_WIDTH / 2.0;
        let fill = BLUES[i % BLUES.len()];

        chart.draw_series([
            Rectangle::new([(left, clip(stats.q1)), (right, clip(stats.q3))], fill.filled()),
            Rectangle::new([(left, clip(stats.q1)), (right, clip(stats.q3))], BLACK.stroke_width(1)),
        ])?;
        chart.draw_series([
            PathElement::new(vec![(left, clip(stats.median)), (right, clip(stats.median))], BLACK.stroke_width(2)),
            PathElement::new(vec![(x, clip(stats.q1)), (x, clip(stats.whisker_low))], BLACK.stroke_width(1)),
            PathElement::new(vec![(x, clip(stats.q3)), (x, clip(stats.whisker_high))], BLACK.stroke_width(1)),
            PathElement::new(vec![(x - cap, clip(stats.whisker_low)), (x + cap, clip(stats.whisker_low))], BLACK.stroke_width(1)),
            PathElement::new(vec![(x - cap, clip(stats.whisker_high)), (x + cap, clip(stats.whisker_high))], BLACK.stroke_width(1)),
        ])?;

        // Points outside the window are clipped, not clamped.
        let points: Vec<(f64, f32)> = values
            .iter()
            .map(|&v| (x + rng.gen_range(-JITTER..=JITTER), v as f32))
            .filter(|&(_, y)| (y_lo..=y_hi).contains(&y))
            .collect();
        chart.draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, 4, RED.mix(0.5).filled())),
        )?;
    }

    let dashes = dash_segments(-0.5, x_max, 0.08, 0.05);
    chart
        .draw_series(
            dashes
                .into_iter()
                .map(|(a, b)| PathElement::new(vec![(a, 0f32), (b, 0f32)], RED.stroke_width(2))),
        )?
        .label("Exact Match")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_histogram(path: &Path, scored: &[ScoredRecord], config: &ReportConfig) -> DrawResult {
    let values: Vec<f64> = scored.iter().map(|s| s.day_difference as f64).collect();
    let hist = Histogram::new(&values, config.histogram_bins)
        .ok_or("no day differences to plot")?;
    let lo = hist.edges[0];
    let hi = hist.edges[hist.edges.len() - 1];

    let kde_curve = GaussianKde::fit(&values)
        .map(|kde| kde.curve(lo, hi, KDE_POINTS, values.len() as f64 * hist.bin_width()))
        .unwrap_or_default();
    let kde_peak = kde_curve.iter().map(|&(_, y)| y).fold(0.0, f64::max);
    let y_top = (hist.max_count() as f64).max(kde_peak) * 1.1;

    let root = SVGBackend::new(path, (config.figure.width, config.figure.height))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of Day Differences", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0f64..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Day Difference")
        .y_desc("Frequency")
        .draw()?;

    let bar = BLUES[2];
    chart.draw_series(
        hist.bins()
            .filter(|&(_, _, count)| count > 0)
            .map(|(l, r, count)| Rectangle::new([(l, 0.0), (r, count as f64)], bar.mix(0.6).filled())),
    )?;
    chart.draw_series(
        hist.bins()
            .filter(|&(_, _, count)| count > 0)
            .map(|(l, r, count)| Rectangle::new([(l, 0.0), (r, count as f64)], bar.stroke_width(1))),
    )?;

    if !kde_curve.is_empty() {
        chart.draw_series(LineSeries::new(kde_curve, bar.stroke_width(2)))?;
    }

    root.present()?;
    Ok(())
}

/// Category label for an x-axis tick; blank between categories.
fn category_label(labels: &[&str], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels
        .get(nearest as usize)
        .map(|s| (*s).to_string())
        .unwrap_or_default()
}

/// `(start, end)` pairs of a dashed line over `[from, to]`.
fn dash_segments(from: f64, to: f64, dash: f64, gap: f64) -> Vec<(f64, f64)> {
    let mut segments = Vec::new();
    let mut start = from;
    while start < to {
        segments.push((start, (start + dash).min(to)));
        start += dash + gap;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::DateRecord;
    use crate::metrics::score_records;
    use chrono::NaiveDate;

    fn scored(entries: &[(EntityType, i64)]) -> Vec<ScoredRecord> {
        let gt = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records: Vec<DateRecord> = entries
            .iter()
            .map(|&(e, off)| DateRecord::with_offset(e, gt, off).unwrap())
            .collect();
        score_records(&records)
    }

    #[test]
    fn test_box_stats_whiskers() {
        let stats = BoxStats::from_values(&[-1.0, -1.0, 1.0, 1.0, 1.0, 50.0]).unwrap();
        assert_eq!(stats.median, 1.0);
        assert_eq!(stats.q1, -0.5);
        assert_eq!(stats.q3, 1.0);
        assert_eq!(stats.whisker_low, -1.0);
        // 50 is beyond q3 + 1.5 * IQR = 3.25
        assert_eq!(stats.whisker_high, 1.0);
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_categories_in_order_of_appearance() {
        let data = scored(&[
            (EntityType::DiagnosisDate, 1),
            (EntityType::MedicationStartDate, 1),
            (EntityType::DiagnosisDate, -1),
        ]);
        assert_eq!(
            categories_in_order(&data),
            vec![EntityType::DiagnosisDate, EntityType::MedicationStartDate]
        );
    }

    #[test]
    fn test_category_label() {
        let labels = ["a", "b"];
        assert_eq!(category_label(&labels, 0.0), "a");
        assert_eq!(category_label(&labels, 1.0), "b");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
    }

    #[test]
    fn test_dash_segments_cover_range() {
        let segments = dash_segments(0.0, 1.0, 0.2, 0.1);
        assert_eq!(segments.first().map(|s| s.0), Some(0.0));
        assert!(segments.iter().all(|&(a, b)| a < b && b <= 1.0));
        assert!(segments.windows(2).all(|w| w[0].1 < w[1].0));
    }

    #[test]
    fn test_render_writes_svg_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::default().with_output_dir(dir.path());
        let mut ctx = RunContext::from_config("plots", &config).unwrap();
        let data = scored(&[
            (EntityType::DiagnosisDate, 1),
            (EntityType::DiagnosisDate, -10),
            (EntityType::MedicationEndDate, 50),
            (EntityType::MedicationEndDate, -1),
            (EntityType::MedicationStartDate, 1),
        ]);

        let charts = render_all(&mut ctx, &data, &config).unwrap();

        for path in [&charts.box_plot, &charts.histogram] {
            let svg = std::fs::read_to_string(path).unwrap();
            assert!(svg.contains("<svg"), "{} is not an SVG", path.display());
        }
        let box_svg = std::fs::read_to_string(&charts.box_plot).unwrap();
        assert!(box_svg.contains("Day Difference Distribution by Entity Type"));
        assert!(box_svg.contains("Exact Match"));
        let hist_svg = std::fs::read_to_string(&charts.histogram).unwrap();
        assert!(hist_svg.contains("Distribution of Day Differences"));
    }

    #[test]
    fn test_render_single_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::default().with_output_dir(dir.path());
        let data = scored(&[(EntityType::DiagnosisDate, 10)]);
        let path = dir.path().join("single.svg");
        render_histogram(&path, &data, &config).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_render_histogram_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::default();
        let path = dir.path().join("empty.svg");
        let err = render_histogram(&path, &[], &config).unwrap_err();
        assert!(matches!(err, ReportError::Plot { .. }));
    }
}
