// Disentangle CLI - Command-line evaluator for disentanglement metrics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Building blocks of the `disentangle-cli` binary: CSV input and report
//! logging.

pub mod input;

pub use input::{load_evaluation_data, read_table, CliError, Table};

use disentangle::MetricsReport;
use tracing::info;

/// Log every metric as one `name = value` line.
///
/// Interpretability is expanded into one entry per attribute.
pub fn log_report(report: &MetricsReport) {
    for (name, value) in report.log_entries() {
        info!(metric = %name, value, "metric");
    }
}
