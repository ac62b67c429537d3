//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation
//! - exported to CSV/JSON
//! - reconstructed later for audits or resubmissions

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Whether a daily value comes from the reconstructed history or the
/// forecasted future of a posterior trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Hindcast,
    Forecast,
}

impl Period {
    /// Lowercase label used in exports and debug output.
    pub fn label(self) -> &'static str {
        match self {
            Period::Hindcast => "hindcast",
            Period::Forecast => "forecast",
        }
    }
}

/// One observed day for one location.
///
/// The observed series must be complete over the modeled range: a day with no
/// reported count is an explicit `None`, never an absent row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub location: String,
    pub date: NaiveDate,
    pub observed: Option<u32>,
}

/// Posterior draw trajectories for one location.
///
/// Rows are draws, columns are days. Draw `i` of `hindcast` and draw `i` of
/// `forecast` are the same posterior sample, so the two matrices must have the
/// same row count.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPair {
    pub hindcast: DMatrix<f64>,
    pub forecast: DMatrix<f64>,
}

impl TrajectoryPair {
    pub fn n_draws(&self) -> usize {
        self.hindcast.nrows()
    }

    pub fn n_hindcast_days(&self) -> usize {
        self.hindcast.ncols()
    }

    pub fn n_forecast_days(&self) -> usize {
        self.forecast.ncols()
    }
}

/// Per-location trajectory pairs, keyed by canonical location name.
///
/// A `BTreeMap` keeps iteration order deterministic, which in turn keeps the
/// output tables byte-identical across runs on identical inputs.
pub type TrajectorySet = BTreeMap<String, TrajectoryPair>;

/// One flattened trajectory entry: a single (draw, day, location) value joined
/// to its calendar date and the observed count for that day, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    /// Posterior draw identifier, 1-based.
    pub draw: u32,
    /// Time index, 1-based and contiguous; `t = 1` is the first modeled day
    /// for every location.
    pub t: u32,
    pub location: String,
    pub count: f64,
    pub period: Period,
    pub date: NaiveDate,
    pub observed: Option<f64>,
}

/// A draw-level weekly aggregate: one epi-week of one draw for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    /// Saturday ending the epi-week that contains the forecast date.
    pub reference_date: NaiveDate,
    /// Saturday ending the epi-week being aggregated.
    pub target_end_date: NaiveDate,
    pub location: String,
    pub draw: u32,
    /// Number of daily rows that contributed to this week (7 for full weeks).
    pub n_days_data: u32,
    /// Sum of the draw's daily counts over the week.
    pub count_7d: f64,
    /// Sum of the observed daily counts over the week. Missing observations
    /// are excluded from the sum, not treated as zero, so a week with missing
    /// observed days yields a smaller but still defined sum.
    pub obs_weekly_sum: f64,
    /// Signed epi-week offset from `reference_date`: negative = past, 0 =
    /// current week, positive = future.
    pub horizon: i32,
}

/// One row of the hub submission table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileRecord {
    pub reference_date: NaiveDate,
    /// Hub display label (after renaming from the canonical location name).
    pub location: String,
    pub horizon: i32,
    pub obs_weekly_sum: f64,
    /// Fixed descriptive string for the forecasting task.
    pub target: String,
    pub target_end_date: NaiveDate,
    /// Always `"quantile"` in this pipeline.
    pub output_type: String,
    /// Probability level in (0, 1).
    pub output_type_id: f64,
    /// Empirical quantile of the weekly count across draws.
    pub value: f64,
}

/// The full configuration surface of the aggregation pipeline.
///
/// These are parameters, not files: the pipeline itself does no I/O.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateConfig {
    /// The as-of date anchoring `reference_date`.
    pub forecast_date: NaiveDate,
    /// Calendar date of `t = 1` for every location's trajectory.
    pub history_start: NaiveDate,
    /// Probability levels for the quantile summary.
    pub levels: Vec<f64>,
    /// Canonical location name -> hub display label. Locations absent from
    /// the table pass through under their canonical name.
    pub renames: HashMap<String, String>,
    /// Descriptive string for the `target` column (e.g. "ILI ED visits").
    pub target: String,
}

/// Resolved run geometry, derived from the trajectories and the daily table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Saturday ending the epi-week containing the forecast date.
    pub reference_date: NaiveDate,
    pub history_start: NaiveDate,
    /// Last day of the modeled history (`t = n_history_days`).
    pub history_end: NaiveDate,
    /// Last day covered by the forecast matrices.
    pub forecast_end: NaiveDate,
    pub n_history_days: usize,
    pub n_forecast_days: usize,
    pub n_draws: usize,
}

/// Summary stats over the flattened records, for reports and manifests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_locations: usize,
    pub n_long_rows: usize,
    pub count_min: f64,
    pub count_max: f64,
    /// Days in the observed table that carry a reported count.
    pub n_observed_days: usize,
    /// Days in the observed table with an explicit missing value.
    pub n_missing_days: usize,
}
