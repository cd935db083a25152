//! Generation and aggregation benchmarks.

#![allow(clippy::disallowed_methods)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use date_accuracy::config::ReportConfig;
use date_accuracy::density::{GaussianKde, Histogram};
use date_accuracy::generator::DateGenerator;
use date_accuracy::metrics::{score_records, AccuracyMetrics};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn benchmark_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_records");
    for rows in [20usize, 1_000, 100_000] {
        let generator = DateGenerator::new(&ReportConfig::default().with_rows(rows)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &generator, |b, g| {
            b.iter(|| {
                let records = g.generate(&mut StdRng::seed_from_u64(42)).unwrap();
                black_box(records.len())
            });
        });
    }
    group.finish();
}

fn benchmark_metrics(c: &mut Criterion) {
    let generator = DateGenerator::new(&ReportConfig::default().with_rows(10_000)).unwrap();
    let records = generator.generate(&mut StdRng::seed_from_u64(42)).unwrap();

    c.bench_function("score_and_aggregate_10k", |b| {
        b.iter(|| {
            let scored = score_records(black_box(&records));
            black_box(AccuracyMetrics::compute(&scored))
        });
    });
}

fn benchmark_density(c: &mut Criterion) {
    let generator = DateGenerator::new(&ReportConfig::default().with_rows(1_000)).unwrap();
    let records = generator.generate(&mut StdRng::seed_from_u64(42)).unwrap();
    let values: Vec<f64> = records.iter().map(|r| r.day_difference() as f64).collect();

    c.bench_function("histogram_and_kde_1k", |b| {
        b.iter(|| {
            let hist = Histogram::new(black_box(&values), 30).unwrap();
            let kde = GaussianKde::fit(&values).unwrap();
            black_box(kde.curve(hist.edges[0], hist.edges[30], 200, hist.bin_width()))
        });
    });
}

criterion_group!(benches, benchmark_generate, benchmark_metrics, benchmark_density);
criterion_main!(benches);
