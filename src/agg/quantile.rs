//! Quantile summarization of weekly draw sums.
//!
//! For each `(location, target_end_date)` group we compute empirical
//! quantiles of `count_7d` across the draw dimension, using linear
//! interpolation between order statistics (the standard "type 7" definition,
//! matching R's default and NumPy's `linear`).
//!
//! Levels are validated before any aggregation work begins; everything else
//! in this module is infallible given validated weekly input.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{AggregateConfig, QuantileRecord, WeeklyRecord};
use crate::error::AppError;

/// The standard 23-point FluSight submission grid.
pub const FLUSIGHT_LEVELS: [f64; 23] = [
    0.01, 0.025, 0.05, 0.10, 0.15, 0.20, 0.25, 0.30, 0.35, 0.40, 0.45, 0.50, 0.55, 0.60, 0.65,
    0.70, 0.75, 0.80, 0.85, 0.90, 0.95, 0.975, 0.99,
];

/// Reject any probability level outside the open interval (0, 1).
///
/// Called before any aggregation work so a malformed grid never touches
/// trajectory data.
pub fn validate_levels(levels: &[f64]) -> Result<(), AppError> {
    if levels.is_empty() {
        return Err(AppError::new(2, "No quantile levels requested."));
    }
    for &level in levels {
        if !(level > 0.0 && level < 1.0) {
            return Err(AppError::invalid_quantile_level(level));
        }
    }
    Ok(())
}

/// Type-7 empirical quantile of an ascending-sorted, non-empty slice.
///
/// `h = (n - 1) * p`; the result interpolates linearly between the order
/// statistics bracketing `h`.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

#[derive(Debug, Clone)]
struct QuantileGroup {
    reference_date: NaiveDate,
    horizon: i32,
    obs_weekly_sum: f64,
    values: Vec<f64>,
}

/// Summarize weekly draw sums into one `QuantileRecord` per
/// `(location, target_end_date, level)`.
///
/// Locations are renamed through the caller-supplied lookup at emission time;
/// names absent from the table pass through unchanged. Output rows are
/// ordered by canonical location, then week, then ascending level, so the
/// `value` column is non-decreasing within each group by construction.
pub fn summarize_quantiles(
    weekly: &[WeeklyRecord],
    config: &AggregateConfig,
) -> Result<Vec<QuantileRecord>, AppError> {
    validate_levels(&config.levels)?;

    let mut levels = config.levels.clone();
    levels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // Group across draws; reference date, horizon, and the observed weekly
    // sum are fixed within a group since none of them depend on the draw.
    let mut groups: BTreeMap<(String, NaiveDate), QuantileGroup> = BTreeMap::new();
    for w in weekly {
        let group = groups
            .entry((w.location.clone(), w.target_end_date))
            .or_insert_with(|| QuantileGroup {
                reference_date: w.reference_date,
                horizon: w.horizon,
                obs_weekly_sum: w.obs_weekly_sum,
                values: Vec::new(),
            });
        group.values.push(w.count_7d);
    }

    let mut out = Vec::with_capacity(groups.len() * levels.len());
    for ((location, target_end_date), mut group) in groups {
        group
            .values
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let display_location = config
            .renames
            .get(&location)
            .cloned()
            .unwrap_or_else(|| location.clone());
        for &level in &levels {
            out.push(QuantileRecord {
                reference_date: group.reference_date,
                location: display_location.clone(),
                horizon: group.horizon,
                obs_weekly_sum: group.obs_weekly_sum,
                target: config.target.clone(),
                target_end_date,
                output_type: "quantile".to_string(),
                output_type_id: level,
                value: quantile_type7(&group.values, level),
            });
        }
    }

    Ok(out)
}
