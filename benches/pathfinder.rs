//! Benchmarks for the pathfinder race and map generation.
//!
//! Run with: `cargo bench --bench pathfinder`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use warren::generation::utils::create_rng;
use warren::{GenerationConfig, Generator, PathfinderPool, RandomGraphGenerator};

fn bench_race(c: &mut Criterion) {
    let mut group = c.benchmark_group("race");
    let config = GenerationConfig::new(42, 128);
    let graph = RandomGraphGenerator::new()
        .generate(&config, &mut create_rng(&config))
        .unwrap();
    let topology = graph.topology_handle();

    for workers in [1, 10, 100] {
        group.bench_with_input(BenchmarkId::new("workers", workers), &workers, |b, &workers| {
            let pool = PathfinderPool::new(workers).unwrap().with_seed(7);
            b.iter(|| black_box(pool.race(&topology, 0, 127).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("early_exit", workers), &workers, |b, &workers| {
            let pool = PathfinderPool::new(workers).unwrap().with_seed(7).with_early_exit(true);
            b.iter(|| black_box(pool.race(&topology, 0, 127).unwrap()))
        });
    }

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_map");

    for size in [16, 128, 512] {
        group.bench_with_input(BenchmarkId::new("generate", size), &size, |b, &size| {
            let config = GenerationConfig::new(42, size);
            b.iter(|| {
                black_box(
                    RandomGraphGenerator::new()
                        .generate(&config, &mut create_rng(&config))
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_race, bench_generation);
criterion_main!(benches);
