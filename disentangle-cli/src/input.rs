// Disentangle CLI - Command-line evaluator for disentanglement metrics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! CSV loading for latent codes and attributes.
//!
//! Both files carry a header row followed by one numeric row per sample.
//! Attribute headers become attribute names.

use disentangle::{normalize, EvaluationData, MetricsError};
use nalgebra::DMatrix;
use std::path::Path;
use tracing::debug;

/// CLI errors.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A numeric table read from CSV.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub values: DMatrix<f64>,
}

/// Read a headed numeric CSV into a samples × columns matrix.
pub fn read_table(path: &Path) -> Result<Table, CliError> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(CliError::InvalidFormat(format!(
            "{}: missing header row",
            path.display()
        )));
    }

    let mut data = Vec::new();
    let mut rows = 0;
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != headers.len() {
            return Err(CliError::InvalidFormat(format!(
                "{}: row {} has {} fields, expected {}",
                path.display(),
                line + 1,
                record.len(),
                headers.len()
            )));
        }
        for (field, header) in record.iter().zip(&headers) {
            let value: f64 = field.trim().parse().map_err(|_| {
                CliError::InvalidFormat(format!(
                    "{}: row {} column '{}' is not a number: '{}'",
                    path.display(),
                    line + 1,
                    header,
                    field
                ))
            })?;
            data.push(value);
        }
        rows += 1;
    }

    if rows == 0 {
        return Err(CliError::EmptyDataset(path.display().to_string()));
    }

    debug!(path = %path.display(), rows, columns = headers.len(), "table loaded");
    Ok(Table {
        values: DMatrix::from_row_slice(rows, headers.len(), &data),
        headers,
    })
}

/// Load codes and attributes into row-aligned evaluation data.
///
/// With `normalize_codes` the latent codes are z-scored column-wise first.
/// Non-finite values in either file are rejected.
pub fn load_evaluation_data(
    codes: &Path,
    attributes: &Path,
    normalize_codes: bool,
) -> Result<EvaluationData, CliError> {
    let codes = read_table(codes)?;
    let attributes = read_table(attributes)?;

    let code_values = if normalize_codes {
        normalize(&codes.values, None, None)?.data
    } else {
        codes.values
    };
    if normalize_codes && code_values.iter().any(|v| !v.is_finite()) {
        return Err(CliError::InvalidFormat(
            "constant latent code column cannot be normalized".to_string(),
        ));
    }

    Ok(EvaluationData::with_names(
        code_values,
        attributes.values,
        attributes.headers,
    )?)
}
