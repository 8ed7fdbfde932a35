use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vod_highlighter::analysis::peaks::find_peaks;
use vod_highlighter::analysis::{rank, RankParams};

/// Deterministic stand-in for a few hours of chat activity: a low baseline
/// with periodic bursts of varying height.
fn synthetic_histogram(len: usize) -> Vec<u32> {
    (0..len)
        .map(|i| {
            let baseline = (i % 7) as u32 % 3;
            if i % 400 == 0 && i > 0 {
                baseline + 10 + (i / 400) as u32 % 20
            } else {
                baseline
            }
        })
        .collect()
}

fn bench_find_peaks(c: &mut Criterion) {
    let histogram = synthetic_histogram(6 * 3600);
    c.bench_function("find_peaks_6h", |b| {
        b.iter(|| find_peaks(black_box(&histogram), 1.0, 150, 1.0))
    });
}

fn bench_rank(c: &mut Criterion) {
    let histogram = synthetic_histogram(6 * 3600);
    let params = RankParams::default();
    c.bench_function("rank_6h", |b| b.iter(|| rank(black_box(&histogram), &params)));
}

criterion_group!(benches, bench_find_peaks, bench_rank);
criterion_main!(benches);
