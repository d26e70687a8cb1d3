// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Spearman rank correlation with significance gating.
//!
//! Entry (i, j) of the score matrix is |ρ| when the two-sided p-value of
//! code i against attribute j is at most the significance level, else 0.

use super::ScoreMatrix;
use crate::config::CorrelationConfig;
use crate::error::{MetricsError, Result};
use nalgebra::DMatrix;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Spearman coefficient and its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpearmanResult {
    pub rho: f64,
    pub p_value: f64,
}

/// Gated rank-correlation score matrix builder.
#[derive(Debug, Clone)]
pub struct CorrelationEstimator {
    config: CorrelationConfig,
}

impl CorrelationEstimator {
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    /// K × M matrix of significant |ρ| values.
    pub fn score_matrix(
        &self,
        codes: &DMatrix<f64>,
        attributes: &DMatrix<f64>,
    ) -> Result<ScoreMatrix> {
        crate::data::check_aligned(codes, attributes)?;
        let attr_columns: Vec<Vec<f64>> = attributes
            .column_iter()
            .map(|c| c.iter().copied().collect())
            .collect();

        let mut scores = DMatrix::zeros(codes.ncols(), attributes.ncols());
        for i in 0..codes.ncols() {
            let code: Vec<f64> = codes.column(i).iter().copied().collect();
            for (j, attr) in attr_columns.iter().enumerate() {
                scores[(i, j)] = match spearman(&code, attr)? {
                    Some(r) => self.gate(r),
                    None => 0.0,
                };
            }
        }
        Ok(scores)
    }

    fn gate(&self, result: SpearmanResult) -> f64 {
        if result.p_value <= self.config.significance {
            result.rho.abs()
        } else {
            0.0
        }
    }
}

/// Spearman correlation of two equal-length samples.
///
/// Returns `None` when either sample is constant (ρ undefined).
pub fn spearman(a: &[f64], b: &[f64]) -> Result<Option<SpearmanResult>> {
    let n = a.len();
    if b.len() != n {
        return Err(MetricsError::ShapeMismatch {
            codes: n,
            attributes: b.len(),
        });
    }
    if n < 3 {
        return Err(MetricsError::InsufficientSamples { needed: 3, got: n });
    }

    let ra = rank_average(a);
    let rb = rank_average(b);
    let rho = match pearson(&ra, &rb) {
        Some(rho) => rho.clamp(-1.0, 1.0),
        None => return Ok(None),
    };

    let dof = (n - 2) as f64;
    let p_value = if (1.0 - rho.abs()) <= 0.0 {
        0.0
    } else {
        let t = rho * (dof / ((rho + 1.0) * (1.0 - rho))).sqrt();
        let dist = StudentsT::new(0.0, 1.0, dof)
            .map_err(|e| MetricsError::Distribution(e.to_string()))?;
        (2.0 * dist.sf(t.abs())).min(1.0)
    };

    Ok(Some(SpearmanResult { rho, p_value }))
}

/// Ranks starting at 1, ties get the mean of the ranks they span.
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&x, &y| values[x].total_cmp(&values[y]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end hold ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len() as f64;
    let ma = a.iter().sum::<f64>() / n;
    let mb = b.iter().sum::<f64>() / n;
    let cov: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    let sa = a.iter().map(|x| (x - ma).powi(2)).sum::<f64>().sqrt();
    let sb = b.iter().map(|y| (y - mb).powi(2)).sum::<f64>().sqrt();
    if sa == 0.0 || sb == 0.0 {
        None
    } else {
        Some(cov / (sa * sb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rank_average_ties() {
        let ranks = rank_average(&[10.0, 20.0, 20.0, 5.0]);
        assert_eq!(ranks, vec![2.0, 3.5, 3.5, 1.0]);
    }

    #[test]
    fn test_perfect_monotone() {
        let a: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let b: Vec<f64> = a.iter().map(|x| x.powi(3)).collect();
        let r = spearman(&a, &b).unwrap().unwrap();
        assert_relative_eq!(r.rho, 1.0, epsilon = 1e-12);
        assert_eq!(r.p_value, 0.0);
    }

    #[test]
    fn test_known_p_value() {
        // scipy.stats.spearmanr([1,2,3,4,5], [5,6,7,8,7]) -> (0.8207826816681233, 0.08858700531354381)
        let r = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 6.0, 7.0, 8.0, 7.0])
            .unwrap()
            .unwrap();
        assert_relative_eq!(r.rho, 0.8207826816681233, epsilon = 1e-9);
        assert_relative_eq!(r.p_value, 0.08858700531354381, epsilon = 1e-6);
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [7.0; 4];
        assert!(spearman(&a, &b).unwrap().is_none());
    }

    #[test]
    fn test_insignificant_correlation_suppressed() {
        // Strong but insignificant: rho = 0.82, p = 0.089 > 0.05
        let codes = DMatrix::from_column_slice(5, 1, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let attrs = DMatrix::from_column_slice(5, 1, &[5.0, 6.0, 7.0, 8.0, 7.0]);
        let estimator = CorrelationEstimator::new(CorrelationConfig::default());
        let scores = estimator.score_matrix(&codes, &attrs).unwrap();
        assert_eq!(scores[(0, 0)], 0.0);

        // Same data passes a looser gate
        let loose = CorrelationEstimator::new(CorrelationConfig { significance: 0.1 });
        let scores = loose.score_matrix(&codes, &attrs).unwrap();
        assert_relative_eq!(scores[(0, 0)], 0.8207826816681233, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_correlation_scored_by_magnitude() {
        let a: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let b: Vec<f64> = a.iter().map(|x| -x).collect();
        let codes = DMatrix::from_column_slice(30, 1, &a);
        let attrs = DMatrix::from_column_slice(30, 1, &b);
        let estimator = CorrelationEstimator::new(CorrelationConfig::default());
        let scores = estimator.score_matrix(&codes, &attrs).unwrap();
        assert_relative_eq!(scores[(0, 0)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_too_few_samples() {
        assert!(matches!(
            spearman(&[1.0, 2.0], &[2.0, 1.0]),
            Err(MetricsError::InsufficientSamples { .. })
        ));
    }
}
