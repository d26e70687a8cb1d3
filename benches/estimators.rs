//! Benchmarks for the disentanglement estimators and the full engine

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use disentangle::estimators::{CorrelationEstimator, CovarianceEstimator, KnnInformationEstimator};
use disentangle::{CorrelationConfig, EvaluationData, InformationConfig, MetricsEngine, SapConfig};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn generate_test_data(samples: usize, codes: usize, attributes: usize) -> EvaluationData {
    let mut rng = StdRng::seed_from_u64(7);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let attrs = DMatrix::from_fn(samples, attributes, |_, _| normal.sample(&mut rng));
    let codes = DMatrix::from_fn(samples, codes, |i, j| {
        let noise = normal.sample(&mut rng);
        if j < attributes {
            attrs[(i, j)] + 0.2 * noise
        } else {
            noise
        }
    });
    EvaluationData::new(codes, attrs).unwrap()
}

fn bench_information(c: &mut Criterion) {
    let mut group = c.benchmark_group("information");

    let data = generate_test_data(500, 8, 3);
    let estimator = KnnInformationEstimator::new(InformationConfig::default());

    group.throughput(Throughput::Elements(500));

    group.bench_function("continuous_mutual_info_500x8x3", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(0);
            let mi = estimator
                .continuous_mutual_info(data.codes(), data.attributes(), &mut rng)
                .unwrap();
            black_box(mi);
        })
    });

    group.bench_function("continuous_entropy_500x3", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(0);
            black_box(estimator.continuous_entropy(data.attributes(), &mut rng).unwrap());
        })
    });

    group.finish();
}

fn bench_score_matrices(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_matrices");

    let data = generate_test_data(1000, 8, 3);
    let correlation = CorrelationEstimator::new(CorrelationConfig::default());
    let covariance = CovarianceEstimator::new(SapConfig::default());

    group.bench_function("spearman_1000x8x3", |b| {
        b.iter(|| {
            black_box(
                correlation
                    .score_matrix(data.codes(), data.attributes())
                    .unwrap(),
            )
        })
    });

    group.bench_function("sap_1000x8x3", |b| {
        b.iter(|| {
            black_box(
                covariance
                    .score_matrix(data.codes(), data.attributes())
                    .unwrap(),
            )
        })
    });

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.sample_size(10);

    let data = generate_test_data(1000, 4, 2);

    group.bench_function("evaluate_1000x4x2", |b| {
        b.iter(|| {
            let mut engine = MetricsEngine::default();
            black_box(engine.evaluate(&data).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_information, bench_score_matrices, bench_engine);
criterion_main!(benches);
