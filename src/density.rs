//! Histogram binning and Gaussian kernel density estimation.

use std::f64::consts::PI;

/// Equal-width histogram over the data range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges
    pub edges: Vec<f64>,
    /// Count per bin
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning `[min, max]`.
    ///
    /// The last bin is closed on the right. A constant input is widened to
    /// `[v - 0.5, v + 0.5]`. Returns `None` for empty input or zero bins.
    #[must_use]
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }
        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Some(Self { edges, counts })
    }

    /// Width of each bin.
    #[must_use]
    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    /// Total number of binned values.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Largest bin count.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(left, right, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| (w[0], w[1], c))
    }
}

/// Gaussian KDE with Scott's rule bandwidth.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKde {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Fit to `samples`.
    ///
    /// Returns `None` when the sample standard deviation is zero or
    /// undefined (fewer than two values), where no smooth density exists.
    #[must_use]
    pub fn fit(samples: &[f64]) -> Option<Self> {
        let n = samples.len();
        if n < 2 {
            return None;
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std = var.sqrt();
        if !(std.is_finite() && std > 0.0) {
            return None;
        }

        let scott = (n as f64).powf(-0.2);
        Some(Self {
            samples: samples.to_vec(),
            bandwidth: std * scott,
        })
    }

    /// Kernel bandwidth.
    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Density at `x`.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / ((2.0 * PI).sqrt() * h * self.samples.len() as f64);
        self.samples
            .iter()
            .map(|s| (-0.5 * ((x - s) / h).powi(2)).exp())
            .sum::<f64>()
            * norm
    }

    /// `points` evenly spaced `(x, density * scale)` pairs over `[lo, hi]`.
    ///
    /// Use `scale = n * bin_width` to overlay the curve on a count histogram.
    #[must_use]
    pub fn curve(&self, lo: f64, hi: f64, points: usize, scale: f64) -> Vec<(f64, f64)> {
        if points < 2 {
            return vec![(lo, self.evaluate(lo) * scale)];
        }
        let step = (hi - lo) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = lo + step * i as f64;
                (x, self.evaluate(x) * scale)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_and_edges() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        let hist = Histogram::new(&values, 4).unwrap();
        assert_eq!(hist.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        // right edge of the last bin is inclusive
        assert_eq!(hist.counts, vec![1, 1, 1, 2]);
        assert_eq!(hist.total(), 5);
        assert_eq!(hist.max_count(), 2);
        assert_eq!(hist.bin_width(), 1.0);
    }

    #[test]
    fn test_histogram_constant_input() {
        let hist = Histogram::new(&[3.0, 3.0], 2).unwrap();
        assert_eq!(hist.edges, vec![2.5, 3.0, 3.5]);
        assert_eq!(hist.counts, vec![0, 2]);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(Histogram::new(&[], 30).is_none());
        assert!(Histogram::new(&[1.0], 0).is_none());
    }

    #[test]
    fn test_histogram_bins_iter() {
        let hist = Histogram::new(&[-10.0, 10.0], 2).unwrap();
        let bins: Vec<_> = hist.bins().collect();
        assert_eq!(bins, vec![(-10.0, 0.0, 1), (0.0, 10.0, 1)]);
    }

    #[test]
    fn test_kde_scott_bandwidth() {
        let samples = [-1.0, 1.0];
        let kde = GaussianKde::fit(&samples).unwrap();
        let expected = 2.0f64.sqrt() * 2.0f64.powf(-0.2);
        assert!((kde.bandwidth() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_kde_integrates_to_one() {
        let samples = [-50.0, -10.0, -1.0, -1.0, 1.0, 1.0, 1.0, 10.0];
        let kde = GaussianKde::fit(&samples).unwrap();
        let lo = -150.0;
        let hi = 150.0;
        let n = 6000;
        let dx = (hi - lo) / n as f64;
        let area: f64 = (0..n).map(|i| kde.evaluate(lo + (i as f64 + 0.5) * dx) * dx).sum();
        assert!((area - 1.0).abs() < 1e-3, "area = {area}");
    }

    #[test]
    fn test_kde_degenerate() {
        assert!(GaussianKde::fit(&[1.0]).is_none());
        assert!(GaussianKde::fit(&[2.0, 2.0, 2.0]).is_none());
    }

    #[test]
    fn test_kde_curve_shape() {
        let kde = GaussianKde::fit(&[0.0, 1.0, 2.0]).unwrap();
        let curve = kde.curve(0.0, 2.0, 5, 3.0);
        assert_eq!(curve.len(), 5);
        assert_eq!(curve[0].0, 0.0);
        assert_eq!(curve[4].0, 2.0);
        // symmetric samples give a symmetric curve
        assert!((curve[0].1 - curve[4].1).abs() < 1e-12);
        assert!(curve[2].1 > curve[0].1);
    }
}
