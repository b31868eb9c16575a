//! State store benchmarks.

use connhub_bench::file_names;
use connhub_sync_protocol::Version;
use connhub_sync_server::SyncState;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Benchmark polls that find nothing new versus full resends.
fn bench_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("poll");
    let state = SyncState::new();
    state.set_text("x".repeat(4096));
    let current = state.text_version();

    group.bench_function("text_unchanged", |b| {
        b.iter(|| black_box(state.text_if_newer(black_box(current))));
    });
    group.bench_function("text_resend", |b| {
        b.iter(|| black_box(state.text_if_newer(black_box(Version::ZERO))));
    });

    group.finish();
}

/// Benchmark file-list commits on lists of increasing length.
fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit_file");

    for count in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let state = SyncState::new();
            let names = file_names(count);
            for name in &names {
                state.commit_file(name);
            }
            let first = &names[0];
            b.iter(|| black_box(state.commit_file(black_box(first))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_poll, bench_commit);
criterion_main!(benches);
