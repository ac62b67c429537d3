//! Flatten per-location trajectory matrices into long-form daily records.
//!
//! Design goals:
//! - **Strict schema**: matrix dimensions must agree exactly with the day
//!   counts derived from the date range (clear errors + exit code 3)
//! - **Explicit joins**: calendar dates come from the shared `t -> date`
//!   mapping, observed counts from `(date, location)`; a join miss is a hard
//!   error, never a silently dropped row
//! - **Deterministic output**: locations iterate in `BTreeMap` order

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::domain::{
    AggregateConfig, DailyPoint, DatasetStats, LongRecord, Period, RunSpec, TrajectorySet,
};
use crate::epiweek::week_ending_saturday;
use crate::error::AppError;

/// Flatten output: long records + resolved run geometry + summary stats.
#[derive(Debug, Clone)]
pub struct FlattenOutput {
    pub records: Vec<LongRecord>,
    pub spec: RunSpec,
    pub stats: DatasetStats,
}

/// Flatten hindcast + forecast matrices for every location into one long
/// table, joining in calendar dates and observed counts.
///
/// Time indices are 1-based and shared across locations: hindcast columns map
/// to `t = 1..H`, forecast columns continue as `t = H+1..H+F`, and
/// `date = history_start + t - 1`.
pub fn flatten_trajectories(
    trajectories: &TrajectorySet,
    daily: &[DailyPoint],
    config: &AggregateConfig,
) -> Result<FlattenOutput, AppError> {
    let Some(first) = trajectories.values().next() else {
        return Err(AppError::new(2, "No trajectory matrices supplied."));
    };
    if daily.is_empty() {
        return Err(AppError::new(2, "Observed daily table is empty."));
    }

    let history_end = daily.iter().map(|p| p.date).max().unwrap_or(config.history_start);
    let daily_start = daily.iter().map(|p| p.date).min().unwrap_or(config.history_start);
    if daily_start != config.history_start {
        return Err(AppError::new(
            2,
            format!(
                "Observed daily table starts at {daily_start}, but history_start is {}.",
                config.history_start
            ),
        ));
    }
    let n_history_days = (history_end - config.history_start).num_days() + 1;
    if n_history_days <= 0 {
        return Err(AppError::new(
            2,
            format!(
                "Invalid history range: {} .. {history_end}.",
                config.history_start
            ),
        ));
    }
    let n_history_days = n_history_days as usize;

    // All locations share one time axis, so draw and forecast-day counts must
    // agree across the whole set.
    let n_draws = first.n_draws();
    let n_forecast_days = first.n_forecast_days();
    if n_draws == 0 {
        return Err(AppError::new(2, "Trajectory matrices contain zero draws."));
    }

    for (location, pair) in trajectories {
        if pair.n_hindcast_days() != n_history_days {
            return Err(AppError::schema_mismatch(format!(
                "{location}: hindcast matrix has {} day columns, expected {n_history_days} \
                 from the date range {} .. {history_end}.",
                pair.n_hindcast_days(),
                config.history_start,
            )));
        }
        if pair.forecast.nrows() != pair.hindcast.nrows() {
            return Err(AppError::schema_mismatch(format!(
                "{location}: hindcast has {} draws but forecast has {}; draw indices must align.",
                pair.hindcast.nrows(),
                pair.forecast.nrows(),
            )));
        }
        if pair.n_draws() != n_draws {
            return Err(AppError::schema_mismatch(format!(
                "{location}: {} draws, but other locations have {n_draws}.",
                pair.n_draws(),
            )));
        }
        if pair.n_forecast_days() != n_forecast_days {
            return Err(AppError::schema_mismatch(format!(
                "{location}: forecast matrix has {} day columns, but other locations have \
                 {n_forecast_days}.",
                pair.n_forecast_days(),
            )));
        }
    }

    // (location, date) -> observed. Presence in this map is what distinguishes
    // "observed missing" (None) from "no Daily Series Point at all" (join miss).
    let mut observed_index: HashMap<(&str, NaiveDate), Option<u32>> =
        HashMap::with_capacity(daily.len());
    for p in daily {
        observed_index.insert((p.location.as_str(), p.date), p.observed);
    }

    let mut records =
        Vec::with_capacity(trajectories.len() * n_draws * (n_history_days + n_forecast_days));
    let mut count_min = f64::INFINITY;
    let mut count_max = f64::NEG_INFINITY;

    for (location, pair) in trajectories {
        for draw_idx in 0..n_draws {
            for col in 0..n_history_days {
                let t = (col + 1) as u32;
                let date = config.history_start + Duration::days(col as i64);
                let Some(&observed) = observed_index.get(&(location.as_str(), date)) else {
                    return Err(AppError::schema_mismatch(format!(
                        "No observed daily point for ({location}, {date}); the daily table \
                         must be complete over the modeled history."
                    )));
                };
                let count = pair.hindcast[(draw_idx, col)];
                check_count(location, date, count)?;
                count_min = count_min.min(count);
                count_max = count_max.max(count);
                records.push(LongRecord {
                    draw: (draw_idx + 1) as u32,
                    t,
                    location: location.clone(),
                    count,
                    period: Period::Hindcast,
                    date,
                    observed: observed.map(f64::from),
                });
            }
            for col in 0..n_forecast_days {
                let t = (n_history_days + col + 1) as u32;
                let date = config.history_start + Duration::days((n_history_days + col) as i64);
                let count = pair.forecast[(draw_idx, col)];
                check_count(location, date, count)?;
                count_min = count_min.min(count);
                count_max = count_max.max(count);
                records.push(LongRecord {
                    draw: (draw_idx + 1) as u32,
                    t,
                    location: location.clone(),
                    count,
                    period: Period::Forecast,
                    date,
                    observed: None,
                });
            }
        }
    }

    let n_observed_days = daily.iter().filter(|p| p.observed.is_some()).count();
    let stats = DatasetStats {
        n_locations: trajectories.len(),
        n_long_rows: records.len(),
        count_min,
        count_max,
        n_observed_days,
        n_missing_days: daily.len() - n_observed_days,
    };
    let spec = RunSpec {
        reference_date: week_ending_saturday(config.forecast_date),
        history_start: config.history_start,
        history_end,
        forecast_end: history_end + Duration::days(n_forecast_days as i64),
        n_history_days,
        n_forecast_days,
        n_draws,
    };

    Ok(FlattenOutput { records, spec, stats })
}

fn check_count(location: &str, date: NaiveDate, count: f64) -> Result<(), AppError> {
    if !count.is_finite() || count < 0.0 {
        return Err(AppError::schema_mismatch(format!(
            "Trajectory value {count} for ({location}, {date}) is not a non-negative \
             finite number."
        )));
    }
    Ok(())
}
