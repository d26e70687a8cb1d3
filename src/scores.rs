// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Metric aggregators.
//!
//! Each aggregator reduces a K × M dependency matrix to scalars and returns a
//! report fragment keyed by its metric name:
//!
//! | Metric | Matrix | Reduction |
//! |--------|--------|-----------|
//! | Interpretability | MI column per attribute | argmax code, R² of that code |
//! | MIG | MI + entropy | (top1 − top2) / H, mean over attributes |
//! | Modularity | MI² | 1 − off-max mass / (max · (M − 1)), mean over codes |
//! | Correlation score | gated \|ρ\| | max over codes, mean over attributes |
//! | SAP | covariance R² | top1 − top2, mean over attributes |
//!
//! Every division has a guarded branch that yields 0 instead of NaN.

use crate::data::check_aligned;
use crate::error::{MetricsError, Result};
use crate::estimators::{
    argmax, r_squared, CorrelationEstimator, CovarianceEstimator, InformationMatrix,
    KnnInformationEstimator, ScoreMatrix,
};
use crate::report::{
    AttributeScore, MetricValue, MetricsReport, AGGREGATE_DIM, CORRELATION, INTERPRETABILITY,
    MEAN_ENTRY, MIG, MODULARITY, SAP,
};
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use std::collections::BTreeMap;

/// Best single code per attribute and how linearly it predicts the
/// attribute.
///
/// `names` are parallel to the first `names.len()` attribute columns. With no
/// names the `"mean"` entry is the bare scalar 0.
pub fn interpretability<R: Rng + ?Sized>(
    codes: &DMatrix<f64>,
    attributes: &DMatrix<f64>,
    names: &[String],
    estimator: &KnnInformationEstimator,
    rng: &mut R,
) -> Result<MetricsReport> {
    check_aligned(codes, attributes)?;
    if names.len() > attributes.ncols() {
        return Err(MetricsError::NameCountMismatch {
            names: names.len(),
            attributes: attributes.ncols(),
        });
    }

    let mut entries = BTreeMap::new();
    let mut total = 0.0;
    for (j, name) in names.iter().enumerate() {
        let labels: Vec<f64> = attributes.column(j).iter().copied().collect();
        let mutual_info = estimator.mutual_info_regression(codes, &labels, rng)?;
        let dim = argmax(mutual_info.as_slice())
            .ok_or(MetricsError::InsufficientDimensions { needed: 1, got: 0 })?;

        let predictor: Vec<f64> = codes.column(dim).iter().copied().collect();
        let score = r_squared(&predictor, &labels)?;
        tracing::debug!(attribute = %name, dim, score, "interpretability");

        entries.insert(name.clone(), AttributeScore::Ranked(dim as i64, score));
        total += score;
    }

    let mean = if names.is_empty() {
        AttributeScore::Scalar(0.0)
    } else {
        AttributeScore::Ranked(AGGREGATE_DIM, total / names.len() as f64)
    };
    entries.insert(MEAN_ENTRY.to_string(), mean);

    Ok(fragment(INTERPRETABILITY, MetricValue::PerAttribute(entries)))
}

/// Mutual information gap.
pub fn mig<R: Rng + ?Sized>(
    codes: &DMatrix<f64>,
    attributes: &DMatrix<f64>,
    estimator: &KnnInformationEstimator,
    rng: &mut R,
) -> Result<MetricsReport> {
    require_dimensions(codes.ncols(), 2)?;
    require_attributes(attributes.ncols())?;
    let m = estimator.continuous_mutual_info(codes, attributes, rng)?;
    let entropy = estimator.continuous_entropy(attributes, rng)?;
    Ok(fragment(MIG, MetricValue::Scalar(mig_from_information(&m, &entropy))))
}

/// Mean over attributes of the normalized gap between the two most
/// informative codes. Attributes with no entropy contribute 0.
pub fn mig_from_information(m: &InformationMatrix, entropy: &DVector<f64>) -> f64 {
    let gaps: Vec<f64> = m
        .column_iter()
        .zip(entropy.iter())
        .map(|(column, &h)| {
            let (first, second) = top_two(column.iter().copied());
            if h > 0.0 {
                (first - second) / h
            } else {
                0.0
            }
        })
        .collect();
    mean(&gaps)
}

/// Modularity of the codes with respect to the attributes.
pub fn modularity<R: Rng + ?Sized>(
    codes: &DMatrix<f64>,
    attributes: &DMatrix<f64>,
    estimator: &KnnInformationEstimator,
    rng: &mut R,
) -> Result<MetricsReport> {
    require_dimensions(codes.ncols(), 1)?;
    require_attributes(attributes.ncols())?;
    let m = estimator.continuous_mutual_info(codes, attributes, rng)?;
    Ok(fragment(MODULARITY, MetricValue::Scalar(modularity_from_information(&m))))
}

/// Mean over codes of how concentrated each code's squared MI is on a single
/// attribute. A code with no information scores 0.
pub fn modularity_from_information(m: &InformationMatrix) -> f64 {
    let num_attributes = m.ncols();
    let squared = m.map(|v| v * v);
    let per_code: Vec<f64> = squared
        .row_iter()
        .map(|row| {
            let max = row.iter().copied().fold(0.0f64, f64::max);
            if max == 0.0 {
                return 0.0;
            }
            if num_attributes < 2 {
                return 1.0;
            }
            let numerator = row.sum() - max;
            let denominator = max * (num_attributes as f64 - 1.0);
            1.0 - numerator / denominator
        })
        .collect();
    mean(&per_code)
}

/// Correlation score: strongest significant rank correlation per attribute.
pub fn correlation_score(
    codes: &DMatrix<f64>,
    attributes: &DMatrix<f64>,
    estimator: &CorrelationEstimator,
) -> Result<MetricsReport> {
    require_dimensions(codes.ncols(), 1)?;
    require_attributes(attributes.ncols())?;
    let matrix = estimator.score_matrix(codes, attributes)?;
    let best: Vec<f64> = matrix
        .column_iter()
        .map(|c| c.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        .collect();
    Ok(fragment(CORRELATION, MetricValue::Scalar(mean(&best))))
}

/// Separated attribute predictability.
pub fn sap_score(
    codes: &DMatrix<f64>,
    attributes: &DMatrix<f64>,
    estimator: &CovarianceEstimator,
) -> Result<MetricsReport> {
    require_dimensions(codes.ncols(), 2)?;
    require_attributes(attributes.ncols())?;
    let matrix = estimator.score_matrix(codes, attributes)?;
    debug_assert_eq!(matrix.shape(), (codes.ncols(), attributes.ncols()));
    Ok(fragment(SAP, MetricValue::Scalar(avg_diff_top_two(&matrix))))
}

/// Mean over columns of (largest − second largest) entry.
pub fn avg_diff_top_two(matrix: &ScoreMatrix) -> f64 {
    let diffs: Vec<f64> = matrix
        .column_iter()
        .map(|c| {
            let (first, second) = top_two(c.iter().copied());
            first - second
        })
        .collect();
    mean(&diffs)
}

/// Largest and second largest values (duplicates count twice). Fewer than
/// two values give a zero gap.
fn top_two(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(|a, b| b.total_cmp(a));
    match sorted.as_slice() {
        [first, second, ..] => (*first, *second),
        [only] => (*only, *only),
        [] => (0.0, 0.0),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn fragment(name: &str, value: MetricValue) -> MetricsReport {
    let mut report = MetricsReport::new();
    report.insert(name, value);
    report
}

fn require_dimensions(got: usize, needed: usize) -> Result<()> {
    if got < needed {
        return Err(MetricsError::InsufficientDimensions { needed, got });
    }
    Ok(())
}

fn require_attributes(got: usize) -> Result<()> {
    if got == 0 {
        return Err(MetricsError::EmptyAttributes);
    }
    Ok(())
}
