//! Benchmarks for anomaly scoring and window statistics.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pulsewatch::anomaly::AnomalyScorer;
use pulsewatch::stats::{SeasonalityDetector, WindowStats};
use pulsewatch::{MetricKind, Sample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_stream(len: usize) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(42);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..len)
        .map(|i| {
            let value = 50.0 + 10.0 * (i as f64 / 24.0).sin() + rng.gen_range(-2.0..2.0);
            Sample::new(start + Duration::minutes(i as i64), value, MetricKind::Cpu)
        })
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let scorer = AnomalyScorer::default();
    let mut group = c.benchmark_group("anomaly_score");

    for len in [100, 1_000, 10_000, 100_000].iter() {
        let stream = create_stream(*len);

        group.throughput(Throughput::Elements(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, _| {
            b.iter(|| scorer.score(black_box(&stream), None))
        });
    }
    group.finish();
}

fn bench_window_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_stats");
    let stream = create_stream(10_000);

    for window in [10, 50, 200].iter() {
        group.throughput(Throughput::Elements(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(window), window, |b, &w| {
            b.iter(|| WindowStats::compute(black_box(&stream), w))
        });
    }
    group.finish();
}

fn bench_seasonality(c: &mut Criterion) {
    let values: Vec<f64> = create_stream(2_000).iter().map(|s| s.value).collect();

    c.bench_function("seasonality_detect", |b| {
        b.iter(|| SeasonalityDetector::detect(black_box(&values), &[24, 168]))
    });
}

criterion_group!(benches, bench_score, bench_window_stats, bench_seasonality);
criterion_main!(benches);
