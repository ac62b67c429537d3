//! Debug bundle writer for inspecting a run's inputs and weekly aggregates.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::domain::{AggregateConfig, DatasetStats, RunSpec, WeeklyRecord};
use crate::epiweek::epi_week_of;
use crate::error::AppError;

/// Weekly rows included in the bundle per location.
const SAMPLE_ROWS_PER_LOCATION: usize = 6;

pub fn write_debug_bundle(
    config: &AggregateConfig,
    spec: &RunSpec,
    stats: &DatasetStats,
    weekly: &[WeeklyRecord],
) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(2, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("hubcast_debug_{}_{ts}.md", spec.reference_date));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create debug file: {e}")))?;

    writeln!(file, "# hubcast debug bundle")
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- generated: {}", Local::now().to_rfc3339())
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- forecast_date: {}", config.forecast_date)
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- reference_date: {}", spec.reference_date)
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(
        file,
        "- history: {} .. {} ({} days)",
        spec.history_start, spec.history_end, spec.n_history_days
    )
    .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(
        file,
        "- forecast: {} days through {}",
        spec.n_forecast_days, spec.forecast_end
    )
    .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(
        file,
        "- draws: {} | locations: {} | long rows: {}",
        spec.n_draws, stats.n_locations, stats.n_long_rows
    )
    .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(
        file,
        "- observed days: {} reported, {} missing",
        stats.n_observed_days, stats.n_missing_days
    )
    .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- levels: {:?}", config.levels)
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;
    writeln!(file, "- renames: {:?}", config.renames)
        .map_err(|e| AppError::new(2, format!("Failed to write debug header: {e}")))?;

    writeln!(file, "\n## Weekly aggregates (draw 1 sample)")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| location | epiweek | week_ending | horizon | n_days | count_7d | obs_sum |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    writeln!(file, "| - | - | - | - | - | - | - |")
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;

    let mut current_location: Option<&str> = None;
    let mut written = 0usize;
    for w in weekly.iter().filter(|w| w.draw == 1) {
        if current_location != Some(w.location.as_str()) {
            current_location = Some(w.location.as_str());
            written = 0;
        }
        if written >= SAMPLE_ROWS_PER_LOCATION {
            continue;
        }
        written += 1;
        writeln!(
            file,
            "| {} | {} | {} | {} | {} | {:.2} | {} |",
            w.location,
            epi_week_of(w.target_end_date),
            w.target_end_date,
            w.horizon,
            w.n_days_data,
            w.count_7d,
            w.obs_weekly_sum,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write debug: {e}")))?;
    }

    Ok(path)
}
