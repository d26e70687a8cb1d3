// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Ordinary least squares with a single predictor and an intercept.

use super::information::is_constant;
use crate::error::{MetricsError, Result};

/// Fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Least-squares fit. A constant predictor gets slope 0 (the minimum-norm
    /// solution), so the fit degenerates to the target mean.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(MetricsError::ShapeMismatch {
                codes: x.len(),
                attributes: y.len(),
            });
        }
        if x.is_empty() {
            return Err(MetricsError::InsufficientSamples { needed: 1, got: 0 });
        }

        let n = x.len() as f64;
        let mx = x.iter().sum::<f64>() / n;
        let my = y.iter().sum::<f64>() / n;
        let sxx: f64 = x.iter().map(|v| (v - mx).powi(2)).sum();
        let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Ok(Self {
            slope,
            intercept: my - slope * mx,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Coefficient of determination R² of this fit on (x, y).
    ///
    /// A constant target scores 1 when predicted exactly and 0 otherwise.
    pub fn score(&self, x: &[f64], y: &[f64]) -> f64 {
        let n = y.len() as f64;
        let my = y.iter().sum::<f64>() / n;
        let ss_res: f64 = x
            .iter()
            .zip(y)
            .map(|(&a, &b)| (b - self.predict(a)).powi(2))
            .sum();
        if is_constant(y) {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        let ss_tot: f64 = y.iter().map(|b| (b - my).powi(2)).sum();
        1.0 - ss_res / ss_tot
    }
}

/// Fit y on x and return the in-sample R².
pub fn r_squared(x: &[f64], y: &[f64]) -> Result<f64> {
    let fit = LinearFit::fit(x, y)?;
    Ok(fit.score(x, y))
}
