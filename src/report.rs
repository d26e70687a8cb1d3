// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! MetricsReport: the unified evaluation result and its JSON form.
//!
//! The JSON layout is the cache artifact format:
//!
//! ```text
//! {
//!   "Corr_score": 0.41,
//!   "SAP_score": 0.37,
//!   "interpretability": { "thickness": [0, 0.93], "mean": [-1, 0.93] },
//!   "mig": 0.52,
//!   "modularity_score": 0.88
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the per-attribute interpretability entry.
pub const INTERPRETABILITY: &str = "interpretability";
/// Key of the mutual information gap.
pub const MIG: &str = "mig";
/// Key of the modularity score.
pub const MODULARITY: &str = "modularity_score";
/// Key of the correlation score.
pub const CORRELATION: &str = "Corr_score";
/// Key of the SAP score.
pub const SAP: &str = "SAP_score";

/// Entry name of the interpretability aggregate.
pub const MEAN_ENTRY: &str = "mean";

/// Dimension marker of the aggregate entry (not a single dimension).
pub const AGGREGATE_DIM: i64 = -1;

/// Interpretability result for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeScore {
    /// Selected latent dimension and its R².
    Ranked(i64, f64),
    /// Bare score (the mean entry when there are no attributes).
    Scalar(f64),
}

impl AttributeScore {
    pub fn score(&self) -> f64 {
        match self {
            AttributeScore::Ranked(_, score) | AttributeScore::Scalar(score) => *score,
        }
    }

    /// Selected latent dimension, if this entry names one.
    pub fn dimension(&self) -> Option<usize> {
        match self {
            AttributeScore::Ranked(dim, _) if *dim >= 0 => Some(*dim as usize),
            _ => None,
        }
    }
}

/// One metric: a scalar or a per-attribute mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    PerAttribute(BTreeMap<String, AttributeScore>),
}

impl MetricValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MetricValue::Scalar(v) => Some(*v),
            MetricValue::PerAttribute(_) => None,
        }
    }

    pub fn as_per_attribute(&self) -> Option<&BTreeMap<String, AttributeScore>> {
        match self {
            MetricValue::Scalar(_) => None,
            MetricValue::PerAttribute(map) => Some(map),
        }
    }
}

/// Metric name → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsReport {
    metrics: BTreeMap<String, MetricValue>,
}

impl MetricsReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: MetricValue) {
        self.metrics.insert(name.into(), value);
    }

    /// Merge another report. Keys of `other` win on collision.
    pub fn merge(&mut self, other: MetricsReport) {
        self.metrics.extend(other.metrics);
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    /// Scalar metric by name.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(MetricValue::as_scalar)
    }

    /// Interpretability entry for one attribute (or `"mean"`).
    pub fn interpretability(&self, attribute: &str) -> Option<AttributeScore> {
        self.get(INTERPRETABILITY)
            .and_then(MetricValue::as_per_attribute)
            .and_then(|m| m.get(attribute).copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Flat `name → score` pairs for logging. Per-attribute metrics expand
    /// into `"<metric>_<attribute>"` entries; the aggregate entry is kept.
    pub fn log_entries(&self) -> Vec<(String, f64)> {
        let mut entries = Vec::new();
        for (name, value) in &self.metrics {
            match value {
                MetricValue::Scalar(v) => entries.push((name.clone(), *v)),
                MetricValue::PerAttribute(map) => {
                    for (attr, score) in map {
                        entries.push((format!("{}_{}", name, attr), score.score()));
                    }
                }
            }
        }
        entries
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to compact JSON string.
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
