// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Mutual information and entropy estimators.
//!
//! Two families:
//!
//! | Family | Estimator | Shape |
//! |--------|-----------|-------|
//! | Discrete | Contingency table over exact values | pairwise per (code, attribute) |
//! | Continuous | Kraskov k-NN (Chebyshev metric) | all codes against one attribute |
//!
//! All values are in nats.

use crate::config::InformationConfig;
use crate::error::{MetricsError, Result};
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;
use statrs::function::gamma::digamma;
use std::collections::HashMap;

/// K × M matrix of mutual information between codes and attributes.
pub type InformationMatrix = DMatrix<f64>;

// ============================================================================
// Discrete estimators
// ============================================================================

/// Pairwise discrete mutual information, each code column against each
/// attribute column, values treated as categories.
pub fn discrete_mutual_info(codes: &DMatrix<f64>, attributes: &DMatrix<f64>) -> InformationMatrix {
    let mut m = DMatrix::zeros(codes.ncols(), attributes.ncols());
    for i in 0..codes.ncols() {
        let code: Vec<f64> = codes.column(i).iter().copied().collect();
        for j in 0..attributes.ncols() {
            let attr: Vec<f64> = attributes.column(j).iter().copied().collect();
            m[(i, j)] = mutual_info_score(&attr, &code);
        }
    }
    m
}

/// Discrete entropy of every attribute column (MI of a column with itself).
pub fn discrete_entropy(attributes: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(
        attributes.ncols(),
        attributes.column_iter().map(|c| {
            let col: Vec<f64> = c.iter().copied().collect();
            mutual_info_score(&col, &col)
        }),
    )
}

/// Mutual information between two label sequences from their contingency
/// table.
pub fn mutual_info_score(labels_a: &[f64], labels_b: &[f64]) -> f64 {
    let n = labels_a.len().min(labels_b.len());
    if n == 0 {
        return 0.0;
    }

    let a = encode_labels(&labels_a[..n]);
    let b = encode_labels(&labels_b[..n]);
    let na = a.iter().max().map_or(0, |m| m + 1);
    let nb = b.iter().max().map_or(0, |m| m + 1);

    // A single class on either side carries no information
    if na <= 1 || nb <= 1 {
        return 0.0;
    }

    let mut pa = vec![0usize; na];
    let mut pb = vec![0usize; nb];
    let mut pab: HashMap<(usize, usize), usize> = HashMap::new();
    for (&x, &y) in a.iter().zip(&b) {
        pa[x] += 1;
        pb[y] += 1;
        *pab.entry((x, y)).or_insert(0) += 1;
    }

    let n = n as f64;
    let mi: f64 = pab
        .iter()
        .map(|(&(x, y), &count)| {
            let p_xy = count as f64 / n;
            let p_x = pa[x] as f64 / n;
            let p_y = pb[y] as f64 / n;
            p_xy * (p_xy / (p_x * p_y)).ln()
        })
        .sum();
    mi.max(0.0)
}

/// Map float labels to dense class ids by exact value (`-0.0 == 0.0`).
fn encode_labels(values: &[f64]) -> Vec<usize> {
    let mut ids: HashMap<u64, usize> = HashMap::new();
    values
        .iter()
        .map(|&v| {
            let key = if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
            let next = ids.len();
            *ids.entry(key).or_insert(next)
        })
        .collect()
}

// ============================================================================
// Continuous estimator
// ============================================================================

/// Kraskov–Stögbauer–Grassberger mutual information estimator.
///
/// Inputs are scaled to unit variance and perturbed with a tiny Gaussian
/// jitter drawn from the caller's generator, so results are reproducible for
/// a fixed seed.
#[derive(Debug, Clone)]
pub struct KnnInformationEstimator {
    config: InformationConfig,
}

impl KnnInformationEstimator {
    pub fn new(config: InformationConfig) -> Self {
        Self { config }
    }

    pub fn n_neighbors(&self) -> usize {
        self.config.n_neighbors
    }

    /// MI of every code column with each attribute: column j of the result
    /// holds the K estimates for attribute j.
    pub fn continuous_mutual_info<R: Rng + ?Sized>(
        &self,
        codes: &DMatrix<f64>,
        attributes: &DMatrix<f64>,
        rng: &mut R,
    ) -> Result<InformationMatrix> {
        crate::data::check_aligned(codes, attributes)?;
        let mut m = DMatrix::zeros(codes.ncols(), attributes.ncols());
        for j in 0..attributes.ncols() {
            let target: Vec<f64> = attributes.column(j).iter().copied().collect();
            let mi = self.mutual_info_regression(codes, &target, rng)?;
            m.set_column(j, &mi);
        }
        tracing::debug!(
            codes = codes.ncols(),
            attributes = attributes.ncols(),
            "continuous mutual information computed"
        );
        Ok(m)
    }

    /// Continuous entropy of every attribute column, estimated as the MI of
    /// the column with itself.
    pub fn continuous_entropy<R: Rng + ?Sized>(
        &self,
        attributes: &DMatrix<f64>,
        rng: &mut R,
    ) -> Result<DVector<f64>> {
        let mut h = DVector::zeros(attributes.ncols());
        for j in 0..attributes.ncols() {
            let target: Vec<f64> = attributes.column(j).iter().copied().collect();
            let column = DMatrix::from_column_slice(target.len(), 1, &target);
            h[j] = self.mutual_info_regression(&column, &target, rng)?[0];
        }
        Ok(h)
    }

    /// MI between each column of `features` and a continuous `target`.
    pub fn mutual_info_regression<R: Rng + ?Sized>(
        &self,
        features: &DMatrix<f64>,
        target: &[f64],
        rng: &mut R,
    ) -> Result<DVector<f64>> {
        let n = features.nrows();
        if target.len() != n {
            return Err(MetricsError::ShapeMismatch {
                codes: n,
                attributes: target.len(),
            });
        }
        let k = self.config.n_neighbors;
        if k == 0 {
            return Err(MetricsError::InvalidConfig(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        if n <= k {
            return Err(MetricsError::InsufficientSamples {
                needed: k + 1,
                got: n,
            });
        }

        let mut columns: Vec<Vec<f64>> = features
            .column_iter()
            .map(|c| c.iter().copied().collect())
            .collect();
        for column in columns.iter_mut() {
            scale_unit_variance(column);
            self.add_jitter(column, rng);
        }

        // Constant target: nothing to explain
        if is_constant(target) {
            return Ok(DVector::zeros(columns.len()));
        }

        let mut y = target.to_vec();
        scale_unit_variance(&mut y);
        self.add_jitter(&mut y, rng);

        let mi = columns
            .iter()
            .map(|x| ksg_mutual_info(x, &y, k))
            .collect::<Vec<_>>();
        Ok(DVector::from_vec(mi))
    }

    fn add_jitter<R: Rng + ?Sized>(&self, values: &mut [f64], rng: &mut R) {
        if self.config.jitter_scale == 0.0 || values.is_empty() {
            return;
        }
        let mean_abs = values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64;
        let amplitude = self.config.jitter_scale * mean_abs.max(1.0);
        for v in values.iter_mut() {
            let noise: f64 = rng.sample(StandardNormal);
            *v += amplitude * noise;
        }
    }
}

/// KSG estimate for two 1-D samples of equal length `n > k`.
fn ksg_mutual_info(x: &[f64], y: &[f64], k: usize) -> f64 {
    let n = x.len();
    let radius = kth_neighbor_radius(x, y, k);

    let count_x = marginal_counts(x, &radius);
    let count_y = marginal_counts(y, &radius);

    let mean_psi = |counts: &[usize]| -> f64 {
        counts.iter().map(|&c| digamma(c as f64 + 1.0)).sum::<f64>() / n as f64
    };

    let mi = digamma(n as f64) + digamma(k as f64) - mean_psi(&count_x) - mean_psi(&count_y);
    mi.max(0.0)
}

/// Chebyshev distance from each point to its k-th nearest neighbour in the
/// joint space (self excluded), nudged one ulp towards zero.
///
/// Candidates are visited outward from each point in x order; the walk stops
/// once the x gap alone reaches the current k-th distance. Requires
/// `1 <= k < x.len()`.
fn kth_neighbor_radius(x: &[f64], y: &[f64], k: usize) -> Vec<f64> {
    let n = x.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));

    let mut radius = vec![0.0; n];
    let mut nearest: Vec<f64> = Vec::with_capacity(k + 1);
    for (pos, &i) in order.iter().enumerate() {
        nearest.clear();
        let mut left = pos;
        let mut right = pos + 1;
        loop {
            let gap_left = (left > 0).then(|| (x[i] - x[order[left - 1]]).abs());
            let gap_right = (right < n).then(|| (x[order[right]] - x[i]).abs());
            let (j, gap) = match (gap_left, gap_right) {
                (Some(l), Some(r)) if l <= r => {
                    left -= 1;
                    (order[left], l)
                }
                (Some(l), None) => {
                    left -= 1;
                    (order[left], l)
                }
                (_, Some(r)) => {
                    right += 1;
                    (order[right - 1], r)
                }
                (None, None) => break,
            };
            if nearest.len() == k && gap >= nearest[k - 1] {
                break;
            }
            let d = gap.max((y[i] - y[j]).abs());
            let at = nearest.partition_point(|&v| v <= d);
            if at < k {
                nearest.insert(at, d);
                nearest.truncate(k);
            }
        }
        radius[i] = nearest.last().map_or(0.0, |&kth| next_toward_zero(kth));
    }
    radius
}

/// Number of other points within `radius[i]` of point i (inclusive).
fn marginal_counts(values: &[f64], radius: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    values
        .iter()
        .zip(radius)
        .map(|(&v, &r)| {
            let lower = sorted.partition_point(|&s| v - s > r);
            let upper = sorted.partition_point(|&s| s - v <= r);
            // Self is always inside its own ball
            upper.saturating_sub(lower).saturating_sub(1)
        })
        .collect()
}

fn next_toward_zero(value: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        f64::from_bits(value.to_bits() - 1)
    } else {
        value
    }
}

pub(crate) fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Divide by the population standard deviation; constant columns are left
/// untouched.
fn scale_unit_variance(values: &mut [f64]) {
    let std = population_variance(values).sqrt();
    if std > 0.0 && std.is_finite() {
        for v in values.iter_mut() {
            *v /= std;
        }
    }
}

/// Index of the first maximum. NaN entries never win.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if !(v > b) => {}
            _ if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
