// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Disentangle - Disentanglement metrics for learned latent spaces
//!
//! Scores how well individual latent dimensions of a trained encoder align
//! with known generative attributes.
//!
//! ## Metrics
//!
//! | Key | Metric | Range |
//! |-----|--------|-------|
//! | `interpretability` | Best code per attribute and its linear R² | per attribute + `mean` |
//! | `mig` | Mutual information gap | ≥ 0 |
//! | `modularity_score` | One attribute per code | [0, 1] |
//! | `Corr_score` | Strongest significant Spearman \|ρ\| | [0, 1] |
//! | `SAP_score` | Separated attribute predictability | [0, 1] |
//!
//! ## Quick Start
//!
//! ```rust
//! use disentangle::{EvaluationData, MetricsConfig, MetricsEngine};
//! use nalgebra::DMatrix;
//!
//! // 50 samples, 2 latent codes, 1 attribute
//! let codes = DMatrix::from_fn(50, 2, |i, j| if j == 0 { i as f64 } else { ((i * 7) % 5) as f64 });
//! let attrs = DMatrix::from_fn(50, 1, |i, _| (i / 5) as f64);
//! let data = EvaluationData::with_names(codes, attrs, vec!["size".to_string()]).unwrap();
//!
//! let mut engine = MetricsEngine::new(MetricsConfig::default());
//! let report = engine.evaluate(&data).unwrap();
//!
//! let size = report.interpretability("size").unwrap();
//! assert_eq!(size.dimension(), Some(0));
//! println!("{}", report.to_json().unwrap());
//! ```
//!
//! ## Caching
//!
//! [`compute_metrics`] wraps the engine with a JSON artifact: an existing
//! artifact is returned as-is, otherwise the report is computed (and written
//! back when `persist` is set).
//!
//! ## Architecture
//!
//! ```text
//! compute_metrics ── cached artifact? ──yes──▶ MetricsReport
//!        │ no
//!        ▼
//! MetricsEngine::evaluate
//!   ├─ interpretability ─▶ k-NN mutual information + least squares
//!   ├─ Corr_score       ─▶ Spearman ρ, p ≤ 0.05 gate
//!   ├─ modularity_score ─▶ k-NN mutual information
//!   ├─ mig              ─▶ k-NN mutual information + entropy
//!   └─ SAP_score        ─▶ covariance R²
//! ```

pub mod cache;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod estimators;
pub mod report;
pub mod scores;

// Re-exports for convenient access
pub use cache::{compute_metrics, ResultsCache};
pub use config::{CorrelationConfig, InformationConfig, MetricsConfig, SapConfig};
pub use data::{normalize, AttributeMatrix, EvaluationData, LatentCodeMatrix, Normalized};
pub use engine::MetricsEngine;
pub use error::{MetricsError, Result};
pub use report::{AttributeScore, MetricValue, MetricsReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
