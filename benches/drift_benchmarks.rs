use criterion::{black_box, criterion_group, criterion_main, Criterion};
use driftwatch::stats::{kolmogorov_smirnov_stat, population_stability_index, DEFAULT_MIN_FRACTION};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn synthetic_samples(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(7);
    let reference: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..100.0)).collect();
    let production: Vec<f64> = (0..n).map(|_| rng.gen_range(10.0..110.0)).collect();
    (reference, production)
}

pub fn psi_benchmarks(c: &mut Criterion) {
    let (reference, production) = synthetic_samples(10_000);
    c.bench_function("psi 10k rows 10 bins", |b| {
        b.iter(|| {
            population_stability_index(
                black_box(&reference),
                black_box(&production),
                10,
                DEFAULT_MIN_FRACTION,
            )
            .unwrap()
        })
    });
}

pub fn ks_benchmarks(c: &mut Criterion) {
    let (reference, production) = synthetic_samples(10_000);
    c.bench_function("ks 10k rows", |b| {
        b.iter(|| kolmogorov_smirnov_stat(black_box(&reference), black_box(&production)).unwrap())
    });
}

criterion_group!(benches, psi_benchmarks, ks_benchmarks);
criterion_main!(benches);
