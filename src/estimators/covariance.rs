// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Covariance-based predictability matrix for the SAP score.
//!
//! For code i and attribute j: `cov(i, j)² / (var(i) · var(j))`, i.e. the R²
//! of a linear fit, using sample covariance (N − 1 denominator).

use super::ScoreMatrix;
use crate::config::SapConfig;
use crate::error::{MetricsError, Result};
use nalgebra::{DMatrix, DVector};

/// SAP score matrix builder.
#[derive(Debug, Clone)]
pub struct CovarianceEstimator {
    config: SapConfig,
}

impl CovarianceEstimator {
    pub fn new(config: SapConfig) -> Self {
        Self { config }
    }

    /// K × M score matrix. Rows of collapsed codes (variance at or below
    /// `variance_epsilon`) are exactly 0.
    pub fn score_matrix(
        &self,
        codes: &DMatrix<f64>,
        attributes: &DMatrix<f64>,
    ) -> Result<ScoreMatrix> {
        crate::data::check_aligned(codes, attributes)?;
        let n = codes.nrows();
        if n < 2 {
            return Err(MetricsError::InsufficientSamples { needed: 2, got: n });
        }

        let mut scores = DMatrix::zeros(codes.ncols(), attributes.ncols());
        let mut pair = DMatrix::<f64>::zeros(n, 2);
        for i in 0..codes.ncols() {
            pair.set_column(0, &codes.column(i));
            for j in 0..attributes.ncols() {
                pair.set_column(1, &attributes.column(j));
                let cov = covariance_matrix(&pair);
                let var_code = cov[(0, 0)];
                let var_attr = cov[(1, 1)];
                scores[(i, j)] = if var_code > self.config.variance_epsilon && var_attr > 0.0 {
                    cov[(0, 1)].powi(2) / (var_code * var_attr)
                } else {
                    0.0
                };
            }
        }
        Ok(scores)
    }
}

/// Sample covariance of the columns of `data` (rows are observations).
pub fn covariance_matrix(data: &DMatrix<f64>) -> DMatrix<f64> {
    let n_samples = data.nrows();
    let n_vars = data.ncols();

    if n_samples < 2 {
        return DMatrix::<f64>::zeros(n_vars, n_vars);
    }

    let means: DVector<f64> = DVector::from_iterator(
        n_vars,
        data.column_iter().map(|c| c.iter().sum::<f64>() / n_samples as f64),
    );

    let mut centered = data.clone();
    for (j, mut column) in centered.column_iter_mut().enumerate() {
        column.add_scalar_mut(-means[j]);
    }

    // Covariance = (1/(n-1)) * X^T * X
    let cov = centered.transpose() * &centered;
    cov / (n_samples - 1) as f64
}
