// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the metrics engine.

use thiserror::Error;

/// Result type alias for metrics operations
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Main error type for metrics operations
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Latent codes and attributes disagree on the sample count
    #[error("Shape mismatch: latent codes have {codes} samples, attributes have {attributes}")]
    ShapeMismatch { codes: usize, attributes: usize },

    /// Attribute names are not parallel to attribute columns
    #[error("Name count mismatch: {names} names for {attributes} attribute columns")]
    NameCountMismatch { names: usize, attributes: usize },

    /// Row-major input whose rows disagree on the column count
    #[error("Ragged rows: row {row} has {got} values, expected {expected}")]
    RaggedRows {
        row: usize,
        got: usize,
        expected: usize,
    },

    /// Per-column statistics that do not match the data's column count
    #[error("Statistics length mismatch: {got} values for {expected} columns")]
    StatisticsMismatch { expected: usize, got: usize },

    /// NaN or infinite value in the codes or attributes
    #[error("Non-finite input: {matrix} value at row {row}, column {column}")]
    NonFiniteInput {
        matrix: &'static str,
        row: usize,
        column: usize,
    },

    /// Too few samples for the requested estimator
    #[error("Insufficient samples: need at least {needed}, got {got}")]
    InsufficientSamples { needed: usize, got: usize },

    /// Too few latent dimensions (gap-based metrics need two)
    #[error("Insufficient latent dimensions: need at least {needed}, got {got}")]
    InsufficientDimensions { needed: usize, got: usize },

    /// No attribute columns to score against
    #[error("No attributes to evaluate")]
    EmptyAttributes,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Statistical distribution could not be built
    #[error("Distribution error: {0}")]
    Distribution(String),

    /// Cache file I/O
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
