//! Benchmarks for stream network algorithms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hydronet_algorithms::network::{
    drainage_area, path_length, terminals, FlowNetwork, PathOrigin,
};
use hydronet_core::network::{NetworkOptions, NodeTable};

/// Create a network of complete binary trees: each basin has `depth`
/// levels, and there are enough basins to reach roughly `size` nodes.
fn create_binary_forest(size: usize, depth: u32) -> NodeTable<i64> {
    let per_basin = (1usize << depth) - 1;
    let basins = (size / per_basin).max(1);

    let mut ids = Vec::with_capacity(basins * per_basin);
    let mut to_ids = Vec::with_capacity(basins * per_basin);
    for b in 0..basins {
        let offset = (b * per_basin) as i64;
        // Heap layout: node k drains into k / 2, root 1 drains to the outlet
        for k in 1..=per_basin as i64 {
            ids.push(offset + k);
            to_ids.push(if k == 1 { 0 } else { offset + k / 2 });
        }
    }

    let n = ids.len();
    let area = (0..n).map(|i| 1.0 + (i % 7) as f64 * 0.5).collect();
    let length = (0..n).map(|i| 0.5 + (i % 11) as f64 * 0.1).collect();
    NodeTable::new(ids, to_ids)
        .unwrap()
        .with_column("area", area)
        .unwrap()
        .with_column("length", length)
        .unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/build");
    for size in [10_000, 100_000, 1_000_000] {
        let table = create_binary_forest(size, 12);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| FlowNetwork::build(black_box(&table), &NetworkOptions::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_drainage_area(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/drainage_area");
    for size in [10_000, 100_000, 1_000_000] {
        let table = create_binary_forest(size, 12);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| drainage_area(black_box(&table), "area", &NetworkOptions::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_terminals(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/terminals");
    for size in [10_000, 100_000, 1_000_000] {
        let table = create_binary_forest(size, 12);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| terminals(black_box(&table), &NetworkOptions::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_path_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("network/path_length");
    for size in [10_000, 100_000, 1_000_000] {
        let table = create_binary_forest(size, 12);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                path_length(
                    black_box(&table),
                    "length",
                    PathOrigin::UpstreamEnd,
                    &NetworkOptions::default(),
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_drainage_area,
    bench_terminals,
    bench_path_length,
);
criterion_main!(benches);
