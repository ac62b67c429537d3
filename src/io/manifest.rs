//! Write the run-manifest JSON.
//!
//! The manifest is the portable record of what a run produced:
//! - the full configuration surface (dates, levels, renames, target)
//! - resolved run geometry and dataset stats
//! - output row counts
//!
//! It travels alongside the submission CSV so a reviewer can audit a file
//! without re-running the pipeline.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{AggregateConfig, DatasetStats, RunSpec};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub tool: String,
    pub config: AggregateConfig,
    pub spec: RunSpec,
    pub stats: DatasetStats,
    pub n_weekly_rows: usize,
    pub n_quantile_rows: usize,
}

/// Write a manifest JSON file.
pub fn write_manifest_json(
    path: &Path,
    config: &AggregateConfig,
    spec: &RunSpec,
    stats: &DatasetStats,
    n_weekly_rows: usize,
    n_quantile_rows: usize,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create manifest JSON '{}': {e}", path.display()))
    })?;

    let manifest = RunManifest {
        tool: "hubcast".to_string(),
        config: config.clone(),
        spec: spec.clone(),
        stats: stats.clone(),
        n_weekly_rows,
        n_quantile_rows,
    };

    serde_json::to_writer_pretty(file, &manifest)
        .map_err(|e| AppError::new(2, format!("Failed to write manifest JSON: {e}")))?;

    Ok(())
}
