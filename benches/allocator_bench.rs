//! Benchmarks for best-fit allocation.
//!
//! Measures placement, release, and scan replay across block table sizes.

use bestfit_sim::scan::best_fit;
use bestfit_sim::{Allocator, AllocatorConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

fn capacities(num_blocks: usize) -> Vec<u64> {
    // Spread of sizes so the best fit is rarely the first candidate.
    (0..num_blocks as u64).map(|i| 64 + (i * 37) % 1000).collect()
}

/// Benchmark allocation until the table is exhausted.
fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator/allocate");

    for num_blocks in [6, 64, 512] {
        let config = AllocatorConfig::with_capacities(capacities(num_blocks));

        group.bench_with_input(
            BenchmarkId::new("blocks", num_blocks),
            &num_blocks,
            |b, _| {
                b.iter(|| {
                    let mut allocator = Allocator::new(config.clone()).unwrap();
                    let mut placed = 0;
                    for size in (1..200u64).map(|s| 10 + s * 3) {
                        if allocator.allocate(size).unwrap().is_placed() {
                            placed += 1;
                        }
                    }
                    black_box(placed)
                });
            },
        );
    }

    group.finish();
}

/// Benchmark allocate/release cycles.
fn bench_alloc_release_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator/alloc_release_cycle");
    group.throughput(Throughput::Elements(100));

    let config = AllocatorConfig::with_capacities(capacities(64));

    group.bench_function("100_cycles", |b| {
        b.iter(|| {
            let mut allocator = Allocator::new(config.clone()).unwrap();
            for i in 0..100u64 {
                if let Some(id) = allocator.allocate(1 + i % 50).unwrap().id() {
                    allocator.release(id);
                }
            }
        });
    });

    group.finish();
}

/// Benchmark the selection routine alone.
fn bench_best_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator/best_fit");

    for num_blocks in [6, 64, 512, 4096] {
        let frees = capacities(num_blocks);

        group.bench_with_input(
            BenchmarkId::new("blocks", num_blocks),
            &frees,
            |b, frees| {
                b.iter(|| black_box(best_fit(frees.iter().copied(), black_box(500))));
            },
        );
    }

    group.finish();
}

/// Benchmark scan replay and status snapshots.
fn bench_scan_and_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator/observe");

    let mut allocator = Allocator::new(AllocatorConfig::with_capacities(capacities(512))).unwrap();
    for size in 1..300u64 {
        let _ = allocator.allocate(size);
    }

    group.bench_function("scan_512", |b| {
        b.iter(|| black_box(allocator.scan(black_box(400))));
    });

    group.bench_function("status_512", |b| {
        b.iter(|| black_box(allocator.status()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_allocate,
    bench_alloc_release_cycle,
    bench_best_fit,
    bench_scan_and_status
);
criterion_main!(benches);
