// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! MetricsEngine - runs every aggregator over one evaluation set.

use crate::config::MetricsConfig;
use crate::data::EvaluationData;
use crate::error::{MetricsError, Result};
use crate::estimators::{CorrelationEstimator, CovarianceEstimator, KnnInformationEstimator};
use crate::report::MetricsReport;
use crate::scores;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Main metrics engine.
///
/// Each call to [`MetricsEngine::evaluate`] seeds its own generator from
/// `config.seed`, so identical inputs give identical reports.
pub struct MetricsEngine {
    config: MetricsConfig,
    information: KnnInformationEstimator,
    correlation: CorrelationEstimator,
    covariance: CovarianceEstimator,

    evaluation_count: u64,
    aggregator_count: u64,
    last_report: Option<MetricsReport>,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            information: KnnInformationEstimator::new(config.information.clone()),
            correlation: CorrelationEstimator::new(config.correlation.clone()),
            covariance: CovarianceEstimator::new(config.sap.clone()),
            config,
            evaluation_count: 0,
            aggregator_count: 0,
            last_report: None,
        }
    }

    /// Compute interpretability, correlation score, modularity, MIG and SAP
    /// and merge them into one report. Any failing aggregator fails the call.
    pub fn evaluate(&mut self, data: &EvaluationData) -> Result<MetricsReport> {
        self.config.validate()?;
        self.check_shape(data)?;

        self.evaluation_count += 1;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let codes = data.codes();
        let attributes = data.attributes();

        tracing::debug!(
            samples = data.num_samples(),
            codes = data.num_codes(),
            attributes = data.num_attributes(),
            seed = self.config.seed,
            "evaluating disentanglement metrics"
        );

        let mut report = scores::interpretability(
            codes,
            attributes,
            data.names(),
            &self.information,
            &mut rng,
        )?;
        self.aggregator_count += 1;
        report.merge(scores::correlation_score(
            codes,
            attributes,
            &self.correlation,
        )?);
        self.aggregator_count += 1;
        report.merge(scores::modularity(
            codes,
            attributes,
            &self.information,
            &mut rng,
        )?);
        self.aggregator_count += 1;
        report.merge(scores::mig(codes, attributes, &self.information, &mut rng)?);
        self.aggregator_count += 1;
        report.merge(scores::sap_score(codes, attributes, &self.covariance)?);
        self.aggregator_count += 1;

        tracing::info!(metrics = report.len(), "evaluation complete");
        self.last_report = Some(report.clone());
        Ok(report)
    }

    /// Get the last computed report.
    pub fn last_report(&self) -> Option<&MetricsReport> {
        self.last_report.as_ref()
    }

    /// Number of evaluations actually computed (cache hits excluded).
    pub fn evaluation_count(&self) -> u64 {
        self.evaluation_count
    }

    /// Number of aggregator runs that completed.
    pub fn aggregator_count(&self) -> u64 {
        self.aggregator_count
    }

    /// Get current configuration.
    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Clear the last report and reset counters.
    pub fn reset(&mut self) {
        self.evaluation_count = 0;
        self.aggregator_count = 0;
        self.last_report = None;
    }

    /// Fail before any estimator runs when the inputs cannot be scored.
    fn check_shape(&self, data: &EvaluationData) -> Result<()> {
        let needed = (self.config.information.n_neighbors + 1).max(3);
        if data.num_samples() < needed {
            return Err(MetricsError::InsufficientSamples {
                needed,
                got: data.num_samples(),
            });
        }
        if data.num_codes() < 2 {
            return Err(MetricsError::InsufficientDimensions {
                needed: 2,
                got: data.num_codes(),
            });
        }
        if data.num_attributes() == 0 {
            return Err(MetricsError::EmptyAttributes);
        }
        Ok(())
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(MetricsConfig::default())
    }
}
