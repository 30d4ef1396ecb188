use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gridfield_core::{FftEngine, GridConfig, GridField, RustFftEngine};
use ndarray::Array3;
use num_complex::Complex64;
use std::hint::black_box;

fn bench_construction(c: &mut Criterion) {
    c.bench_function("grid_field_new_64", |b| {
        b.iter(|| GridField::new(GridConfig::new(black_box([1000.0, 1000.0, 1000.0]), 64)))
    });
}

fn bench_forward_threads(c: &mut Criterion) {
    let gf = GridField::from_box([1000.0, 1000.0, 1000.0], 64, true).unwrap();
    let field = Array3::from_shape_fn(gf.dims(), |(i, j, k)| {
        Complex64::new(((i * 7 + j * 3 + k) % 11) as f64, 0.0)
    });

    let mut group = c.benchmark_group("forward_64^3");
    group.sample_size(10);
    for threads in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &t| {
            b.iter(|| gf.forward(black_box(&field), Some(t)))
        });
    }
    group.finish();
}

/// Cached plans and pools against a fresh engine per call.
fn bench_engine_reuse(c: &mut Criterion) {
    let dims = (32, 32, 32);
    let data: Vec<Complex64> = (0..dims.0 * dims.1 * dims.2)
        .map(|i| Complex64::new((i % 13) as f64, 0.0))
        .collect();

    let mut group = c.benchmark_group("repeated_transform_32^3");
    group.sample_size(20);
    let cached = RustFftEngine::new();
    group.bench_function("cached_engine", |b| {
        b.iter(|| {
            let mut buf = data.clone();
            cached.transform_3d(black_box(&mut buf), dims, 2)
        })
    });
    group.bench_function("fresh_engine", |b| {
        b.iter(|| {
            let mut buf = data.clone();
            RustFftEngine::new().transform_3d(black_box(&mut buf), dims, 2)
        })
    });
    group.finish();
}

fn bench_los(c: &mut Criterion) {
    let mut gf = GridField::from_box([1000.0, 500.0, 500.0], 64, false).unwrap();
    c.bench_function("set_los_64x32x32", |b| {
        b.iter(|| gf.set_los(black_box([0.3, 0.4, 0.5])))
    });
}

criterion_group!(
    benches,
    bench_construction,
    bench_forward_threads,
    bench_engine_reuse,
    bench_los
);
criterion_main!(benches);
