//! Shape Operations Benchmarks
//!
//! Benchmarks for building and walking synthetic trees in the reference
//! hierarchy.
//!
//! Run with: `cargo bench --bench shape_ops`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use treescale::{
    BreadthFirstWalker, LabelInitializer, MemoryEnvironment, Mode, Shape, TreeBuilder, Workload,
};

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for shape in Shape::ALL {
        for mode in [Mode::Eager, Mode::Virtual] {
            for size in [1_000, 10_000] {
                group.bench_with_input(
                    BenchmarkId::new(format!("{shape}_{mode}"), size),
                    &size,
                    |bench, &n| {
                        bench.iter(|| {
                            let mut env = MemoryEnvironment::new();
                            let workload = Workload::new(shape, black_box(n), mode);
                            let tree = TreeBuilder::build(&mut env, &workload, LabelInitializer::new());
                            black_box(tree.map(|tree| tree.node_count()).ok());
                        });
                    },
                );
            }
        }
    }

    group.finish();
}

fn bench_build_and_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_and_walk");

    for shape in Shape::ALL {
        for size in [1_000, 10_000] {
            group.bench_with_input(
                BenchmarkId::new(format!("{shape}_virtual"), size),
                &size,
                |bench, &n| {
                    bench.iter(|| {
                        let mut env = MemoryEnvironment::new();
                        let workload = Workload::new(shape, n, Mode::Virtual);
                        let visited = TreeBuilder::build(&mut env, &workload, LabelInitializer::new())
                            .and_then(|mut tree| BreadthFirstWalker::count(&mut tree));
                        black_box(visited.ok());
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_last_item(c: &mut Criterion) {
    let mut group = c.benchmark_group("last_item");

    for shape in Shape::ALL {
        let size = 100_000;
        let mut env = MemoryEnvironment::new();
        let Ok(mut tree) = TreeBuilder::build(
            &mut env,
            &Workload::new(shape, size, Mode::Eager),
            LabelInitializer::new(),
        ) else {
            continue;
        };
        group.bench_function(BenchmarkId::new(shape.name(), size), |bench| {
            bench.iter(|| black_box(shape.last_item(&mut tree).ok()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_build_and_walk, bench_last_item);
criterion_main!(benches);
