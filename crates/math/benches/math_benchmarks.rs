//! Benchmarks for factorlab-math operations.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use factorlab_math::{max_drawdown, ols, qcut, spearman, winsorize};
use ndarray::{Array1, Array2};
use rand::Rng;

fn random_vec(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.r#gen::<f64>() * 0.1 - 0.05).collect()
}

fn random_design(rows: usize, cols: usize) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |(_, j)| if j == 0 { 1.0 } else { rng.r#gen::<f64>() })
}

fn bench_spearman(c: &mut Criterion) {
    let mut group = c.benchmark_group("spearman");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let x = random_vec(size);
            let y = random_vec(size);
            b.iter(|| spearman(black_box(&x), black_box(&y)));
        });
    }

    group.finish();
}

fn bench_qcut(c: &mut Criterion) {
    let mut group = c.benchmark_group("qcut");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let x = random_vec(size);
            b.iter(|| qcut(black_box(&x), 10));
        });
    }

    group.finish();
}

fn bench_winsorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("winsorize");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let data = Array1::from(random_vec(size));
            b.iter(|| winsorize(black_box(&data), 0.01, 0.99).unwrap());
        });
    }

    group.finish();
}

fn bench_ols(c: &mut Criterion) {
    let mut group = c.benchmark_group("ols");

    for n_obs in [252, 1260, 5040] {
        group.bench_with_input(BenchmarkId::from_parameter(n_obs), &n_obs, |b, &n_obs| {
            let y = Array1::from(random_vec(n_obs));
            let x = random_design(n_obs, 7);
            b.iter(|| ols(black_box(&y), black_box(&x)).unwrap());
        });
    }

    group.finish();
}

fn bench_max_drawdown(c: &mut Criterion) {
    c.bench_function("max_drawdown_5040", |b| {
        let returns = random_vec(5040);
        b.iter(|| max_drawdown(black_box(&returns)));
    });
}

criterion_group!(benches, bench_spearman, bench_qcut, bench_winsorize, bench_ols, bench_max_drawdown);
criterion_main!(benches);
