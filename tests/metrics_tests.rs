// Disentangle - Metrics Tests
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Integration tests for the disentanglement metrics engine.
//!
//! These tests verify:
//! - End-to-end scores on a synthetic disentangled latent space
//! - Seeded determinism
//! - Output ranges and guarded branches
//! - Cache load / compute / persist behaviour

use disentangle::estimators::{spearman, CorrelationEstimator, CovarianceEstimator};
use disentangle::report::{CORRELATION, INTERPRETABILITY, MEAN_ENTRY, MIG, MODULARITY, SAP};
use disentangle::scores;
use disentangle::{
    compute_metrics, AttributeScore, CorrelationConfig, EvaluationData, InformationConfig,
    MetricsConfig, MetricsEngine, MetricsError, ResultsCache, SapConfig,
};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tempfile::tempdir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Attribute 0 is encoded (noisily) by code 0; everything else is noise.
fn create_disentangled_data(n: usize, seed: u64) -> EvaluationData {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();

    let attr0: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
    let attr1: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
    let attributes = DMatrix::from_fn(n, 2, |i, j| if j == 0 { attr0[i] } else { attr1[i] });

    let mut codes = DMatrix::zeros(n, 4);
    for i in 0..n {
        codes[(i, 0)] = 2.0 * attr0[i] + 0.3 * normal.sample(&mut rng);
        for j in 1..4 {
            codes[(i, j)] = normal.sample(&mut rng);
        }
    }

    EvaluationData::with_names(
        codes,
        attributes,
        vec!["signal".to_string(), "nuisance".to_string()],
    )
    .unwrap()
}

/// Same attributes as the disentangled set, but every code is noise.
fn create_noise_data(n: usize, seed: u64) -> EvaluationData {
    let reference = create_disentangled_data(n, seed);
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1000));
    let normal = Normal::new(0.0, 1.0).unwrap();
    let codes = DMatrix::from_fn(n, 4, |_, _| normal.sample(&mut rng));
    EvaluationData::with_names(
        codes,
        reference.attributes().clone(),
        reference.names().to_vec(),
    )
    .unwrap()
}

// ============================================================================
// Section 1: End-to-end scenario
// ============================================================================

#[test]
fn test_interpretability_selects_signal_code() {
    let data = create_disentangled_data(1000, 42);
    let mut engine = MetricsEngine::default();
    let report = engine.evaluate(&data).unwrap();

    let signal = report.interpretability("signal").unwrap();
    assert_eq!(signal.dimension(), Some(0));
    assert!(signal.score() > 0.8, "R² = {}", signal.score());

    let mean = report.interpretability(MEAN_ENTRY).unwrap();
    assert!(matches!(mean, AttributeScore::Ranked(-1, _)));
}

#[test]
fn test_sap_and_correlation_driven_by_signal_code() {
    let data = create_disentangled_data(1000, 42);

    let sap = CovarianceEstimator::new(SapConfig::default())
        .score_matrix(data.codes(), data.attributes())
        .unwrap();
    let corr = CorrelationEstimator::new(CorrelationConfig::default())
        .score_matrix(data.codes(), data.attributes())
        .unwrap();

    for j in 1..4 {
        assert!(sap[(0, 0)] > 10.0 * sap[(j, 0)]);
        assert!(corr[(0, 0)] > 5.0 * corr[(j, 0)]);
    }
    assert!(sap[(0, 0)] > 0.9);
    assert!(corr[(0, 0)] > 0.9);

    let mut engine = MetricsEngine::default();
    let report = engine.evaluate(&data).unwrap();
    assert!(report.scalar(SAP).unwrap() > 0.4);
    assert!(report.scalar(CORRELATION).unwrap() > 0.45);
}

#[test]
fn test_mig_exceeds_noise_control() {
    let mut engine = MetricsEngine::default();
    let structured = engine
        .evaluate(&create_disentangled_data(1000, 42))
        .unwrap()
        .scalar(MIG)
        .unwrap();
    let control = engine
        .evaluate(&create_noise_data(1000, 42))
        .unwrap()
        .scalar(MIG)
        .unwrap();

    assert!(structured > 0.05, "MIG = {}", structured);
    assert!(control >= 0.0);
    assert!(
        structured > 5.0 * control,
        "structured {} vs control {}",
        structured,
        control
    );
}

// ============================================================================
// Section 2: Ranges and guards
// ============================================================================

#[test]
fn test_scores_in_range() {
    for seed in [1, 2, 3] {
        let data = create_disentangled_data(300, seed);
        let report = MetricsEngine::default().evaluate(&data).unwrap();

        let modularity = report.scalar(MODULARITY).unwrap();
        let sap = report.scalar(SAP).unwrap();
        let corr = report.scalar(CORRELATION).unwrap();
        let mig = report.scalar(MIG).unwrap();

        assert!((0.0..=1.0).contains(&modularity), "modularity {}", modularity);
        assert!((0.0..=1.0).contains(&sap), "sap {}", sap);
        assert!((0.0..=1.0).contains(&corr), "corr {}", corr);
        assert!(mig >= 0.0, "mig {}", mig);
    }
}

#[test]
fn test_insignificant_correlations_are_zero() {
    let data = create_noise_data(200, 9);
    let matrix = CorrelationEstimator::new(CorrelationConfig::default())
        .score_matrix(data.codes(), data.attributes())
        .unwrap();

    let mut suppressed = 0;
    for i in 0..data.num_codes() {
        let code: Vec<f64> = data.codes().column(i).iter().copied().collect();
        for j in 0..data.num_attributes() {
            let attr: Vec<f64> = data.attributes().column(j).iter().copied().collect();
            let result = spearman(&code, &attr).unwrap().unwrap();
            if result.p_value > 0.05 {
                assert_eq!(matrix[(i, j)], 0.0);
                suppressed += 1;
            } else {
                assert_eq!(matrix[(i, j)], result.rho.abs());
            }
        }
    }
    assert!(suppressed > 0);
}

#[test]
fn test_collapsed_code_has_zero_sap_row() {
    let data = create_disentangled_data(200, 5);
    let mut codes = data.codes().clone();
    codes.column_mut(2).fill(0.25);

    let matrix = CovarianceEstimator::new(SapConfig::default())
        .score_matrix(&codes, data.attributes())
        .unwrap();
    assert!(matrix.row(2).iter().all(|&v| v == 0.0));
}

#[test]
fn test_empty_names_give_scalar_mean() {
    let data = create_disentangled_data(100, 3);
    let estimator = disentangle::estimators::KnnInformationEstimator::new(
        InformationConfig::default(),
    );
    let mut rng = StdRng::seed_from_u64(0);
    let report =
        scores::interpretability(data.codes(), data.attributes(), &[], &estimator, &mut rng)
            .unwrap();

    assert_eq!(
        report.interpretability(MEAN_ENTRY),
        Some(AttributeScore::Scalar(0.0))
    );
    let json = report.to_json_compact().unwrap();
    assert!(json.contains("\"mean\":0.0"), "{}", json);
}

#[test]
fn test_shape_mismatch_detected_up_front() {
    let err = EvaluationData::new(DMatrix::zeros(10, 3), DMatrix::zeros(12, 2)).unwrap_err();
    assert!(matches!(
        err,
        MetricsError::ShapeMismatch {
            codes: 10,
            attributes: 12
        }
    ));
}

// ============================================================================
// Section 3: Determinism
// ============================================================================

#[test]
fn test_same_seed_same_report() {
    let data = create_disentangled_data(300, 11);
    let config = MetricsConfig {
        seed: 1234,
        ..Default::default()
    };

    let a = MetricsEngine::new(config.clone()).evaluate(&data).unwrap();
    let b = MetricsEngine::new(config).evaluate(&data).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_repeated_evaluation_is_stable() {
    let data = create_disentangled_data(300, 11);
    let mut engine = MetricsEngine::default();
    let first = engine.evaluate(&data).unwrap();
    let second = engine.evaluate(&data).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.evaluation_count(), 2);
}

// ============================================================================
// Section 4: Cache behaviour
// ============================================================================

#[test]
fn test_cache_hit_skips_evaluation() {
    let dir = tempdir().unwrap();
    let cache = ResultsCache::in_dir(dir.path());
    let data = create_disentangled_data(200, 8);
    let mut engine = MetricsEngine::new(MetricsConfig {
        persist: true,
        ..Default::default()
    });

    let first = compute_metrics(&mut engine, &cache, &data).unwrap();
    assert_eq!(engine.evaluation_count(), 1);
    assert!(cache.exists());

    let second = compute_metrics(&mut engine, &cache, &data).unwrap();
    let third = compute_metrics(&mut engine, &cache, &data).unwrap();
    assert_eq!(engine.evaluation_count(), 1);
    assert_eq!(engine.aggregator_count(), 5);
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn test_cache_not_written_without_persist() {
    let dir = tempdir().unwrap();
    let cache = ResultsCache::in_dir(dir.path());
    let data = create_disentangled_data(200, 8);
    let mut engine = MetricsEngine::default();

    compute_metrics(&mut engine, &cache, &data).unwrap();
    assert!(!cache.exists());
    compute_metrics(&mut engine, &cache, &data).unwrap();
    assert_eq!(engine.evaluation_count(), 2);
}

#[test]
fn test_existing_artifact_returned_verbatim() {
    let dir = tempdir().unwrap();
    let cache = ResultsCache::in_dir(dir.path());
    std::fs::write(
        cache.path(),
        r#"{"interpretability": {"a": [1, 0.5], "mean": [-1, 0.5]}, "mig": 0.125, "SAP_score": 0.25}"#,
    )
    .unwrap();

    // Inputs are irrelevant on a cache hit, even degenerate ones
    let data = EvaluationData::new(DMatrix::zeros(2, 1), DMatrix::zeros(2, 1)).unwrap();
    let mut engine = MetricsEngine::default();
    let report = compute_metrics(&mut engine, &cache, &data).unwrap();

    assert_eq!(engine.evaluation_count(), 0);
    assert_eq!(engine.aggregator_count(), 0);
    assert_eq!(report.scalar(MIG), Some(0.125));
    assert_eq!(
        report.interpretability("a"),
        Some(AttributeScore::Ranked(1, 0.5))
    );
    assert!(report.get(INTERPRETABILITY).is_some());
}

#[test]
fn test_nan_attribute_never_reaches_cache() {
    let dir = tempdir().unwrap();
    let cache = ResultsCache::in_dir(dir.path());
    let reference = create_disentangled_data(50, 4);
    let mut attributes = reference.attributes().clone();
    attributes[(10, 0)] = f64::NAN;

    let err = EvaluationData::with_names(
        reference.codes().clone(),
        attributes,
        reference.names().to_vec(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MetricsError::NonFiniteInput {
            matrix: "attributes",
            row: 10,
            column: 0
        }
    ));

    // The clean set still round-trips through the artifact
    let mut engine = MetricsEngine::new(MetricsConfig {
        persist: true,
        ..Default::default()
    });
    let first = compute_metrics(&mut engine, &cache, &reference).unwrap();
    let second = compute_metrics(&mut engine, &cache, &reference).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.evaluation_count(), 1);
}
