//! Run context: seeded randomness, output location and run metrics.
//!
//! A `RunContext` is created once per report. It owns the only random
//! source of the run, so two contexts with the same seed produce the same
//! records and the same chart jitter.

use crate::config::ReportConfig;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Execution context for one report run.
#[derive(Debug)]
pub struct RunContext {
    /// Run name, used in the summary and for name-derived seeds
    name: String,
    /// Seed the RNG was created from
    seed: u64,
    /// Data-generation RNG
    rng: StdRng,
    /// Directory receiving rendered charts
    output_dir: PathBuf,
    /// Start time for duration tracking
    start_time: Instant,
    /// Collected run metrics, ordered by name
    metrics: BTreeMap<String, MetricValue>,
}

/// A metric value that can be recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Integer metric (e.g., row count)
    Int(i64),
    /// Float metric (e.g., accuracy percentage)
    Float(f64),
    /// Duration metric
    Duration(Duration),
    /// String metric
    String(String),
}

impl RunContext {
    /// Create a context with an explicit seed.
    ///
    /// The output directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created.
    pub fn new(name: &str, seed: u64, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        tracing::debug!(run = name, seed, dir = %output_dir.display(), "run context created");

        Ok(Self {
            name: name.to_string(),
            seed,
            rng: StdRng::seed_from_u64(seed),
            output_dir,
            start_time: Instant::now(),
            metrics: BTreeMap::new(),
        })
    }

    /// Create a context whose seed is derived from the run name.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created.
    pub fn named(name: &str, output_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(name, hash_name_to_seed(name), output_dir)
    }

    /// Create a context from a run configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created.
    pub fn from_config(name: &str, config: &ReportConfig) -> Result<Self> {
        Self::new(name, config.seed, &config.output_dir)
    }

    /// Get a path within the output directory.
    #[must_use]
    pub fn path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    /// Get the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Get mutable access to the data-generation RNG.
    #[must_use]
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Independent RNG for a named auxiliary stream (e.g. plot jitter).
    ///
    /// Drawing from it never advances the data-generation RNG.
    #[must_use]
    pub fn stream_rng(&self, stream: &str) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ hash_name_to_seed(stream))
    }

    /// Rewind the data-generation RNG to its initial state.
    pub fn reset_rng(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    /// Get the run name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get elapsed time since context creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Record an integer metric.
    pub fn record_metric(&mut self, name: &str, value: i64) {
        self.metrics.insert(name.to_string(), MetricValue::Int(value));
    }

    /// Record a float metric.
    pub fn record_float_metric(&mut self, name: &str, value: f64) {
        self.metrics
            .insert(name.to_string(), MetricValue::Float(value));
    }

    /// Record a duration metric.
    pub fn record_duration(&mut self, name: &str, duration: Duration) {
        self.metrics
            .insert(name.to_string(), MetricValue::Duration(duration));
    }

    /// Record a string metric.
    pub fn record_string_metric(&mut self, name: &str, value: impl Into<String>) {
        self.metrics
            .insert(name.to_string(), MetricValue::String(value.into()));
    }

    /// Get a recorded metric.
    #[must_use]
    pub fn get_metric(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    /// Write a run summary (name, seed, duration, recorded metrics).
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn report<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "=== Run: {} (seed {}) ===", self.name, self.seed)?;
        writeln!(
            out,
            "Duration: {:.2}ms",
            self.elapsed().as_secs_f64() * 1000.0
        )?;

        if !self.metrics.is_empty() {
            writeln!(out, "Metrics:")?;
            for (name, value) in &self.metrics {
                match value {
                    MetricValue::Int(v) => writeln!(out, "  {}: {}", name, v)?,
                    MetricValue::Float(v) => writeln!(out, "  {}: {:.4}", name, v)?,
                    MetricValue::Duration(d) => {
                        writeln!(out, "  {}: {:.2}ms", name, d.as_secs_f64() * 1000.0)?;
                    }
                    MetricValue::String(s) => writeln!(out, "  {}: {}", name, s)?,
                }
            }
        }

        Ok(())
    }

    /// Check that running `f` twice from a fresh RNG gives the same result.
    #[must_use]
    pub fn verify_idempotency<F, T>(&mut self, f: F) -> bool
    where
        F: Fn(&mut Self) -> T,
        T: PartialEq,
    {
        self.reset_rng();
        let first = f(self);

        self.reset_rng();
        let second = f(self);

        first == second
    }
}

/// Hash a run name to a deterministic u64 seed.
///
/// Uses BLAKE3 for consistent cross-platform hashing.
#[must_use]
pub fn hash_name_to_seed(name: &str) -> u64 {
    let hash = blake3::hash(name.as_bytes());
    let bytes = hash.as_bytes();
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}
