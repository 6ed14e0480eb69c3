//! Performance benchmarks for the preprocessing kernel
//!
//! The numeric core runs per request on every ingestion, so the
//! normalizer and peak detector need to stay far below request latency.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ecg_processing::{PeakDetector, PeakParams, SignalNormalizer};
use std::f64::consts::TAU;

fn ecg_like_window(samples: usize) -> Vec<f32> {
    (0..samples)
        .map(|i| {
            let t = i as f64 / 360.0;
            (2000.0 + 800.0 * (TAU * 1.2 * t).sin() + 60.0 * (TAU * 13.0 * t).sin()) as f32
        })
        .collect()
}

fn bench_normalizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalizer");
    let normalizer = SignalNormalizer::new(1024);

    for &size in &[256usize, 1024, 4096] {
        let raw = ecg_like_window(size);
        group.bench_with_input(BenchmarkId::new("normalize", size), &raw, |b, raw| {
            b.iter(|| normalizer.normalize(black_box(raw)));
        });
    }
    group.finish();
}

fn bench_peak_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("peaks");
    let normalizer = SignalNormalizer::new(1024);
    let detector = PeakDetector::new(PeakParams::default());
    let normalized = normalizer.normalize(&ecg_like_window(1024));

    group.bench_function("detect_peaks_1024", |b| {
        b.iter(|| detector.detect_peaks(black_box(normalized.samples())));
    });
    group.finish();
}

criterion_group!(benches, bench_normalizer, bench_peak_detection);
criterion_main!(benches);
