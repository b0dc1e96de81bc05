use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use orbitfit::kepler::{solve_kepler_equation, KeplerSolverConfig};

/// Uniform random in [0, 2π)
#[inline]
fn rand_angle(rng: &mut StdRng) -> f64 {
    rng.random::<f64>() * std::f64::consts::TAU
}

fn bench_eccentricity_range(c: &mut Criterion, name: &str, seed: u64, lo: f64, hi: f64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let config = KeplerSolverConfig::default();
    let samples = 10_000usize;

    c.bench_function(name, |b| {
        b.iter_batched(
            || {
                // inputs drawn outside the timed section
                (0..samples)
                    .map(|_| (rand_angle(&mut rng), rng.random_range(lo..hi)))
                    .collect::<Vec<_>>()
            },
            |cases| {
                for (mean_anomaly, ecc) in cases {
                    let ecc_anomaly =
                        solve_kepler_equation(black_box(mean_anomaly), black_box(ecc), &config);
                    black_box(ecc_anomaly.ok());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Typical regime: e ∈ [0.0, 0.7)
fn bench_typical(c: &mut Criterion) {
    bench_eccentricity_range(c, "solve_kepler_equation/typical_e<0.7", 0xDEADBEEF, 0.0, 0.7);
}

/// High eccentricity: e ∈ [0.7, 0.99)
fn bench_high_e(c: &mut Criterion) {
    bench_eccentricity_range(c, "solve_kepler_equation/high_e_0.7..0.99", 0xBADF00D, 0.7, 0.99);
}

/// Near-circular regime: e ≈ 1e-12
fn bench_near_circular(c: &mut Criterion) {
    bench_eccentricity_range(
        c,
        "solve_kepler_equation/near_circular_e=1e-12",
        0xFEEDFACE,
        1e-12,
        2e-12,
    );
}

/// Slowest region of the Newton iteration: small M, e close to 1.
fn bench_fixed_stress(c: &mut Criterion) {
    let config = KeplerSolverConfig::default();
    let (mean_anomaly, ecc) = (1e-3, 0.99);

    c.bench_function("solve_kepler_equation/fixed_stress_case", |b| {
        b.iter(|| {
            let ecc_anomaly =
                solve_kepler_equation(black_box(mean_anomaly), black_box(ecc), &config);
            black_box(ecc_anomaly.ok());
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_typical, bench_high_e, bench_near_circular, bench_fixed_stress
);
criterion_main!(benches);
