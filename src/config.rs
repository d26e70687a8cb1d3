// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Metrics engine configuration.
//!
//! Defaults: 3 nearest neighbours, `1e-10` jitter, a 5% significance gate
//! and a `1e-12` variance guard.

use crate::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};

/// Master configuration for the metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Seed for the per-evaluation random generator.
    pub seed: u64,

    /// Nearest-neighbour mutual information settings.
    pub information: InformationConfig,

    /// Rank-correlation settings.
    pub correlation: CorrelationConfig,

    /// SAP score matrix settings.
    pub sap: SapConfig,

    /// Write freshly computed reports back to the cache artifact.
    pub persist: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            information: InformationConfig::default(),
            correlation: CorrelationConfig::default(),
            sap: SapConfig::default(),
            persist: false,
        }
    }
}

impl MetricsConfig {
    /// Check that every setting is usable by the estimators.
    pub fn validate(&self) -> Result<()> {
        if self.information.n_neighbors == 0 {
            return Err(MetricsError::InvalidConfig(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        if !(self.information.jitter_scale >= 0.0) {
            return Err(MetricsError::InvalidConfig(format!(
                "jitter_scale must be non-negative, got {}",
                self.information.jitter_scale
            )));
        }
        let alpha = self.correlation.significance;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(MetricsError::InvalidConfig(format!(
                "significance must lie in (0, 1), got {}",
                alpha
            )));
        }
        if !(self.sap.variance_epsilon >= 0.0) {
            return Err(MetricsError::InvalidConfig(format!(
                "variance_epsilon must be non-negative, got {}",
                self.sap.variance_epsilon
            )));
        }
        Ok(())
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Kraskov nearest-neighbour estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationConfig {
    /// Neighbour rank k used for the joint-space radius.
    pub n_neighbors: usize,
    /// Relative amplitude of the Gaussian jitter that breaks ties.
    /// Zero disables jitter.
    pub jitter_scale: f64,
}

impl Default for InformationConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 3,
            jitter_scale: 1e-10,
        }
    }
}

/// Spearman correlation gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Two-sided p-value threshold (inclusive).
    pub significance: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { significance: 0.05 }
    }
}

/// Covariance score matrix settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SapConfig {
    /// Latent variance at or below this is treated as collapsed.
    pub variance_epsilon: f64,
}

impl Default for SapConfig {
    fn default() -> Self {
        Self {
            variance_epsilon: 1e-12,
        }
    }
}
