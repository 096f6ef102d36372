//! Criterion benchmarks for the plus/minus diff engine.
//!
//! Every edit of a diff-encoded field computes a delta and every read
//! replays one, so both paths run once per field refresh.
//!
//! Run with:
//! ```bash
//! cargo bench --package confoverlay-core --bench diff_bench
//! ```

use confoverlay_core::{apply_delta, compute_delta, join_words, split_words};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ── Fixture builders ──────────────────────────────────────────────────────────

/// Builds a base list of `n` patterns and an edited copy with every third
/// entry dropped and `n / 4` new entries added.
fn build_lists(n: usize) -> (Vec<String>, Vec<String>) {
    let base: Vec<String> = (0..n).map(|i| format!("*.ext{i}")).collect();
    let mut edited: Vec<String> = base
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(_, s)| s.clone())
        .collect();
    edited.extend((0..n / 4).map(|i| format!("added-{i}")));
    (base, edited)
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_compute_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_delta");
    for n in [16usize, 128, 1024] {
        let (base, edited) = build_lists(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| compute_delta(black_box(&base), black_box(&edited)));
        });
    }
    group.finish();
}

fn bench_apply_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_delta");
    for n in [16usize, 128, 1024] {
        let (base, edited) = build_lists(n);
        let delta = compute_delta(&base, &edited);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| apply_delta(black_box(&base), black_box(&delta)));
        });
    }
    group.finish();
}

fn bench_words_round_trip(c: &mut Criterion) {
    let (base, _) = build_lists(256);
    let text = join_words(&base);
    c.bench_function("split_words_256", |b| {
        b.iter(|| split_words(black_box(&text)));
    });
}

criterion_group!(
    benches,
    bench_compute_delta,
    bench_apply_delta,
    bench_words_round_trip
);
criterion_main!(benches);
