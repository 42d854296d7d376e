//! Criterion benchmarks for the sequential and parallel executors.
//!
//! Run with: `cargo bench --bench executors --features synthetic`
//!
//! No artificial per-track delay is used here, so the numbers reflect the
//! geodesic computation plus partitioning and pool overhead.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use trackdist::synthetic::SyntheticScenario;
use trackdist::{EngineConfig, Executor, ParallelExecutor, SequentialExecutor, partition_tracks};

fn bench_partitioning(c: &mut Criterion) {
    let mut group = c.benchmark_group("partitioning");

    for interleave in [false, true] {
        let dataset = SyntheticScenario {
            track_count: 32,
            fixes_per_track: 1_000,
            interleave,
            ..SyntheticScenario::default()
        }
        .generate();

        let label = if interleave { "interleaved" } else { "contiguous" };
        group.bench_with_input(
            BenchmarkId::new("partition_tracks", label),
            &dataset.collection,
            |b, collection| {
                b.iter(|| partition_tracks(collection));
            },
        );
    }

    group.finish();
}

fn bench_executors(c: &mut Criterion) {
    let config = EngineConfig::default();
    let sequential = SequentialExecutor::new(&config);
    let parallel = ParallelExecutor::new(config);

    let mut group = c.benchmark_group("executors");
    group.sample_size(20);

    for track_count in [4, 16, 64] {
        let dataset = SyntheticScenario {
            track_count,
            fixes_per_track: 2_000,
            ..SyntheticScenario::default()
        }
        .generate();

        group.bench_with_input(
            BenchmarkId::new("sequential", track_count),
            &dataset.collection,
            |b, collection| {
                b.iter(|| sequential.run(collection).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", track_count),
            &dataset.collection,
            |b, collection| {
                b.iter(|| parallel.run(collection).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_partitioning, bench_executors);
criterion_main!(benches);
