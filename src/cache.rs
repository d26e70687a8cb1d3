// Disentangle - Disentanglement metrics engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Results cache: load a stored report or compute and optionally persist it.
//!
//! The cache is not checked against the inputs. Whoever owns the path is
//! responsible for deleting stale artifacts.

use crate::data::EvaluationData;
use crate::engine::MetricsEngine;
use crate::error::Result;
use crate::report::MetricsReport;
use std::fs;
use std::path::{Path, PathBuf};

/// File name used inside a checkpoint directory.
pub const DEFAULT_FILE_NAME: &str = "results_dict.json";

/// A JSON report artifact at a fixed path.
#[derive(Debug, Clone)]
pub struct ResultsCache {
    path: PathBuf,
}

impl ResultsCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache file `results_dict.json` inside a checkpoint directory.
    pub fn in_dir(checkpoint_dir: impl AsRef<Path>) -> Self {
        Self::new(checkpoint_dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the stored report, or `None` when there is no artifact.
    pub fn load(&self) -> Result<Option<MetricsReport>> {
        if !self.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(Some(MetricsReport::from_json(&json)?))
    }

    /// Write the report, creating parent directories as needed.
    pub fn store(&self, report: &MetricsReport) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, report.to_json()?)?;
        Ok(())
    }
}

/// Return the cached report when present, else evaluate. Fresh reports are
/// written back when the engine is configured to persist.
pub fn compute_metrics(
    engine: &mut MetricsEngine,
    cache: &ResultsCache,
    data: &EvaluationData,
) -> Result<MetricsReport> {
    if let Some(report) = cache.load()? {
        tracing::info!(path = %cache.path().display(), "loaded cached metrics");
        return Ok(report);
    }

    tracing::info!(path = %cache.path().display(), "no cached metrics, evaluating");
    let report = engine.evaluate(data)?;
    if engine.config().persist {
        cache.store(&report)?;
        tracing::info!(path = %cache.path().display(), "metrics persisted");
    }
    Ok(report)
}
