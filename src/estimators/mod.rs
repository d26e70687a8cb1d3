// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Statistical estimators over (latent code, attribute) pairs.
//!
//! | Estimator | Output | Used by |
//! |-----------|--------|---------|
//! | [`information`] | K × M mutual information, entropies | MIG, modularity, interpretability |
//! | [`correlation`] | K × M gated \|ρ\| | correlation score |
//! | [`regression`] | R² of one code vs one attribute | interpretability |
//! | [`covariance`] | K × M covariance R² | SAP score |
//!
//! Estimators are pure: they read matrices and return new ones.

pub mod correlation;
pub mod covariance;
pub mod information;
pub mod regression;

use nalgebra::DMatrix;

/// K × M matrix of a normalized dependency score.
pub type ScoreMatrix = DMatrix<f64>;

pub use correlation::{rank_average, spearman, CorrelationEstimator, SpearmanResult};
pub use covariance::{covariance_matrix, CovarianceEstimator};
pub use information::{
    argmax, discrete_entropy, discrete_mutual_info, mutual_info_score, InformationMatrix,
    KnnInformationEstimator,
};
pub use regression::{r_squared, LinearFit};
