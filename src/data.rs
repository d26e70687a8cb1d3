// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Evaluation inputs: latent codes, attributes and attribute names.

use crate::error::{MetricsError, Result};
use nalgebra::{DMatrix, DVector};

/// N samples × K latent dimensions.
pub type LatentCodeMatrix = DMatrix<f64>;

/// N samples × M attributes.
pub type AttributeMatrix = DMatrix<f64>;

/// Row-aligned latent codes and ground-truth attributes for one evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationData {
    codes: LatentCodeMatrix,
    attributes: AttributeMatrix,
    names: Vec<String>,
}

impl EvaluationData {
    /// Bundle codes and attributes. Names default to column indices.
    pub fn new(codes: LatentCodeMatrix, attributes: AttributeMatrix) -> Result<Self> {
        let names = (0..attributes.ncols()).map(|j| j.to_string()).collect();
        Self::with_names(codes, attributes, names)
    }

    /// Bundle codes and attributes with one name per attribute column.
    ///
    /// Every value must be finite.
    pub fn with_names(
        codes: LatentCodeMatrix,
        attributes: AttributeMatrix,
        names: Vec<String>,
    ) -> Result<Self> {
        check_aligned(&codes, &attributes)?;
        check_finite("codes", &codes)?;
        check_finite("attributes", &attributes)?;
        if names.len() != attributes.ncols() {
            return Err(MetricsError::NameCountMismatch {
                names: names.len(),
                attributes: attributes.ncols(),
            });
        }
        Ok(Self {
            codes,
            attributes,
            names,
        })
    }

    /// Build from row-major sample vectors.
    pub fn from_rows(
        code_rows: &[Vec<f64>],
        attribute_rows: &[Vec<f64>],
        names: Option<Vec<String>>,
    ) -> Result<Self> {
        let codes = matrix_from_rows(code_rows)?;
        let attributes = matrix_from_rows(attribute_rows)?;
        match names {
            Some(names) => Self::with_names(codes, attributes, names),
            None => Self::new(codes, attributes),
        }
    }

    pub fn codes(&self) -> &LatentCodeMatrix {
        &self.codes
    }

    pub fn attributes(&self) -> &AttributeMatrix {
        &self.attributes
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of samples (N).
    pub fn num_samples(&self) -> usize {
        self.codes.nrows()
    }

    /// Number of latent dimensions (K).
    pub fn num_codes(&self) -> usize {
        self.codes.ncols()
    }

    /// Number of attributes (M).
    pub fn num_attributes(&self) -> usize {
        self.attributes.ncols()
    }
}

/// Fail unless both matrices describe the same samples.
pub fn check_aligned(codes: &DMatrix<f64>, attributes: &DMatrix<f64>) -> Result<()> {
    if codes.nrows() != attributes.nrows() {
        return Err(MetricsError::ShapeMismatch {
            codes: codes.nrows(),
            attributes: attributes.nrows(),
        });
    }
    Ok(())
}

/// Fail on the first NaN or infinite entry (column-major scan).
pub fn check_finite(matrix: &'static str, values: &DMatrix<f64>) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(MetricsError::NonFiniteInput {
            matrix,
            row: index % values.nrows(),
            column: index / values.nrows(),
        }),
        None => Ok(()),
    }
}

fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let ncols = rows.first().map_or(0, |r| r.len());
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(MetricsError::RaggedRows {
            row: i,
            got: row.len(),
            expected: ncols,
        });
    }
    Ok(DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]))
}

/// Z-score normalized data with the statistics used to produce it.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub data: DMatrix<f64>,
    pub mean: DVector<f64>,
    pub stddev: DVector<f64>,
}

/// Column-wise z-score normalization.
///
/// Missing statistics are computed from `data` (population std). Passing the
/// statistics of a training split normalizes a test split consistently.
/// Columns with zero std come out as NaN. Supplied statistics must have one
/// entry per column.
pub fn normalize(
    data: &DMatrix<f64>,
    mean: Option<&DVector<f64>>,
    stddev: Option<&DVector<f64>>,
) -> Result<Normalized> {
    for stats in [mean, stddev].into_iter().flatten() {
        if stats.len() != data.ncols() {
            return Err(MetricsError::StatisticsMismatch {
                expected: data.ncols(),
                got: stats.len(),
            });
        }
    }
    let mean = mean.cloned().unwrap_or_else(|| column_means(data));
    let stddev = stddev
        .cloned()
        .unwrap_or_else(|| column_population_std(data, &mean));
    let normalized = DMatrix::from_fn(data.nrows(), data.ncols(), |i, j| {
        (data[(i, j)] - mean[j]) / stddev[j]
    });
    Ok(Normalized {
        data: normalized,
        mean,
        stddev,
    })
}

fn column_means(data: &DMatrix<f64>) -> DVector<f64> {
    let n = data.nrows().max(1) as f64;
    DVector::from_iterator(
        data.ncols(),
        data.column_iter().map(|c| c.iter().sum::<f64>() / n),
    )
}

fn column_population_std(data: &DMatrix<f64>, mean: &DVector<f64>) -> DVector<f64> {
    let n = data.nrows().max(1) as f64;
    DVector::from_iterator(
        data.ncols(),
        data.column_iter().enumerate().map(|(j, c)| {
            let ss: f64 = c.iter().map(|x| (x - mean[j]).powi(2)).sum();
            (ss / n).sqrt()
        }),
    )
}
