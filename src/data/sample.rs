//! Synthetic surveillance sample generation for demos and test fixtures.
//!
//! The generator is fully deterministic for a given `SampleConfig`: one seeded
//! RNG drives everything, and per-location variation comes from hashing the
//! location name into the base level and seasonal phase. The forecast window
//! always ends on a Saturday so the generated trajectories satisfy the
//! full-week requirement at every horizon >= 0.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate};
use nalgebra::DMatrix;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Normal, Poisson};

use crate::domain::{DailyPoint, TrajectoryPair, TrajectorySet};
use crate::epiweek::week_ending_saturday;
use crate::error::AppError;

/// Knobs for the synthetic generator.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub locations: Vec<String>,
    pub history_start: NaiveDate,
    pub n_history_days: usize,
    /// Number of target weeks covered by the forecast window, counting the
    /// (possibly partial) current week as the first.
    pub n_forecast_weeks: usize,
    pub n_draws: usize,
    pub seed: u64,
    /// Probability that any observed day is reported as missing.
    pub missing_prob: f64,
}

/// Relative amplitude of the seasonal cycle around each location's base level.
const SEASONAL_AMPLITUDE: f64 = 0.35;

/// Std dev of the per-draw lognormal level shift.
const DRAW_LEVEL_SIGMA: f64 = 0.10;

/// Std dev of the per-day lognormal noise within a draw.
const DAILY_NOISE_SIGMA: f64 = 0.05;

/// A generated dataset in exactly the shape the pipeline consumes.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub daily: Vec<DailyPoint>,
    pub trajectories: TrajectorySet,
    /// Last observed day; the natural as-of date for a demo run.
    pub forecast_date: NaiveDate,
}

/// Generate a synthetic observed series + posterior trajectories.
pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.locations.is_empty() {
        return Err(AppError::new(2, "Sample generation needs at least one location."));
    }
    if config.n_history_days < 14 {
        return Err(AppError::new(2, "Sample history must cover at least 14 days."));
    }
    if config.n_draws == 0 {
        return Err(AppError::new(2, "Sample draw count must be > 0."));
    }
    if config.n_forecast_weeks == 0 {
        return Err(AppError::new(2, "Sample forecast horizon must be >= 1 week."));
    }
    if !(0.0..1.0).contains(&config.missing_prob) {
        return Err(AppError::new(2, "Missing-observation probability must be in [0, 1)."));
    }

    let history_end = config.history_start + Duration::days(config.n_history_days as i64 - 1);
    let reference_date = week_ending_saturday(history_end);
    // Cover the (possibly partial) current week plus full weeks out to the
    // requested horizon, ending exactly on a Saturday.
    let forecast_end = reference_date + Duration::days(7 * (config.n_forecast_weeks as i64 - 1));
    let n_forecast_days = (forecast_end - history_end).num_days() as usize;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let level_shift = Normal::new(0.0, DRAW_LEVEL_SIGMA)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;
    let daily_noise = Normal::new(0.0, DAILY_NOISE_SIGMA)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;

    let mut daily = Vec::with_capacity(config.locations.len() * config.n_history_days);
    let mut trajectories = TrajectorySet::new();

    for location in &config.locations {
        if trajectories.contains_key(location) {
            return Err(AppError::new(2, format!("Duplicate sample location '{location}'.")));
        }
        let (base_level, phase) = location_profile(location);

        for day in 0..config.n_history_days {
            let date = config.history_start + Duration::days(day as i64);
            let lambda = seasonal_baseline(base_level, phase, date);
            let observed = if rng.gen_bool(config.missing_prob) {
                None
            } else {
                let poisson = Poisson::new(lambda)
                    .map_err(|e| AppError::new(2, format!("Count distribution error: {e}")))?;
                Some(poisson.sample(&mut rng) as u32)
            };
            daily.push(DailyPoint {
                location: location.clone(),
                date,
                observed,
            });
        }

        let mut hindcast = DMatrix::zeros(config.n_draws, config.n_history_days);
        let mut forecast = DMatrix::zeros(config.n_draws, n_forecast_days);
        for draw in 0..config.n_draws {
            let shift = level_shift.sample(&mut rng).exp();
            for day in 0..config.n_history_days + n_forecast_days {
                let date = config.history_start + Duration::days(day as i64);
                let value = seasonal_baseline(base_level, phase, date)
                    * shift
                    * daily_noise.sample(&mut rng).exp();
                if day < config.n_history_days {
                    hindcast[(draw, day)] = value;
                } else {
                    forecast[(draw, day - config.n_history_days)] = value;
                }
            }
        }
        trajectories.insert(location.clone(), TrajectoryPair { hindcast, forecast });
    }

    Ok(SampleData {
        daily,
        trajectories,
        forecast_date: history_end,
    })
}

/// Base level and seasonal phase derived from the location name.
fn location_profile(location: &str) -> (f64, f64) {
    let mut hasher = DefaultHasher::new();
    location.hash(&mut hasher);
    let h = hasher.finish();
    // Base levels spread over [60, 360); phases over [0, 2pi).
    let base = 60.0 + (h % 1000) as f64 * 0.3;
    let phase = ((h >> 10) % 1000) as f64 / 1000.0 * std::f64::consts::TAU;
    (base, phase)
}

/// Smooth annual cycle: peaks in winter for phase 0.
fn seasonal_baseline(base: f64, phase: f64, date: NaiveDate) -> f64 {
    let day_angle = date.ordinal() as f64 / 365.0 * std::f64::consts::TAU;
    base * (1.0 + SEASONAL_AMPLITUDE * (day_angle + phase).cos())
}
