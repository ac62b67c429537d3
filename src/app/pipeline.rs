//! Shared aggregation pipeline used by both the `run` and `demo` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! level validation -> flatten -> weekly aggregation -> quantile summary
//!
//! The commands then focus on I/O and presentation. The pipeline itself is a
//! pure function: no files, no clock, no shared state, so re-running it on
//! identical inputs yields a bit-identical output table.

use crate::agg::{aggregate_weekly, flatten_trajectories, summarize_quantiles, validate_levels};
use crate::domain::{
    AggregateConfig, DailyPoint, DatasetStats, QuantileRecord, RunSpec, TrajectorySet,
    WeeklyRecord,
};
use crate::error::AppError;

/// All computed outputs of a single aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub spec: RunSpec,
    pub stats: DatasetStats,
    pub weekly: Vec<WeeklyRecord>,
    pub quantiles: Vec<QuantileRecord>,
}

/// Execute the full aggregation pipeline.
///
/// Operations run strictly in sequence and the first failure aborts the whole
/// run; no partial table is ever returned. Quantile levels are rejected
/// before any trajectory data is touched.
pub fn run_pipeline(
    trajectories: &TrajectorySet,
    daily: &[DailyPoint],
    config: &AggregateConfig,
) -> Result<RunOutput, AppError> {
    validate_levels(&config.levels)?;

    let flat = flatten_trajectories(trajectories, daily, config)?;
    let weekly = aggregate_weekly(&flat.records, config.forecast_date)?;
    let quantiles = summarize_quantiles(&weekly, config)?;

    Ok(RunOutput {
        spec: flat.spec,
        stats: flat.stats,
        weekly,
        quantiles,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, NaiveDate};
    use nalgebra::DMatrix;

    use super::*;
    use crate::agg::FLUSIGHT_LEVELS;
    use crate::data::{SampleConfig, generate_sample};
    use crate::domain::TrajectoryPair;
    use crate::error::ErrorKind;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Two aligned Sun..Sat weeks of history plus one forecast week, with
    /// integer-valued counts so weekly sums are exact.
    fn integer_fixture() -> (TrajectorySet, Vec<DailyPoint>, AggregateConfig) {
        // 2024-12-15 is a Sunday; history runs through Saturday 2024-12-28.
        let history_start = d("2024-12-15");
        let hindcast = DMatrix::from_fn(2, 14, |draw, day| (draw * 14 + day + 1) as f64);
        let forecast = DMatrix::from_fn(2, 7, |draw, day| (draw + day + 1) as f64);

        let mut trajectories = TrajectorySet::new();
        trajectories.insert("Citywide".to_string(), TrajectoryPair { hindcast, forecast });

        let daily: Vec<DailyPoint> = (0..14)
            .map(|i| DailyPoint {
                location: "Citywide".to_string(),
                date: history_start + Duration::days(i),
                observed: Some(10 + i as u32),
            })
            .collect();

        let config = AggregateConfig {
            forecast_date: d("2024-12-28"),
            history_start,
            levels: vec![0.25, 0.5, 0.75],
            renames: HashMap::new(),
            target: "ILI ED visits".to_string(),
        };
        (trajectories, daily, config)
    }

    #[test]
    fn weekly_sums_conserve_daily_counts_exactly() {
        let (trajectories, daily, config) = integer_fixture();
        let run = run_pipeline(&trajectories, &daily, &config).unwrap();

        // Draw 1: days 1..14, so week sums are 28 and 77; forecast week 28.
        let draw1: Vec<_> = run.weekly.iter().filter(|w| w.draw == 1).collect();
        assert_eq!(
            draw1.iter().map(|w| w.count_7d).collect::<Vec<_>>(),
            vec![28.0, 77.0, 28.0]
        );
        assert_eq!(
            draw1.iter().map(|w| w.horizon).collect::<Vec<_>>(),
            vec![-1, 0, 1]
        );
        assert!(draw1.iter().all(|w| w.n_days_data == 7));

        // Observed sums: 10..16 and 17..23; the forecast week has none.
        assert_eq!(
            draw1.iter().map(|w| w.obs_weekly_sum).collect::<Vec<_>>(),
            vec![91.0, 140.0, 0.0]
        );
    }

    #[test]
    fn completeness_holds_for_current_and_future_weeks() {
        let (trajectories, daily, config) = integer_fixture();
        let run = run_pipeline(&trajectories, &daily, &config).unwrap();
        assert!(
            run.weekly
                .iter()
                .filter(|w| w.horizon >= 0)
                .all(|w| w.n_days_data == 7)
        );
    }

    #[test]
    fn pipeline_is_idempotent_on_identical_inputs() {
        let sample_config = SampleConfig {
            locations: vec!["Citywide".to_string(), "Queens".to_string()],
            history_start: d("2024-09-29"),
            n_history_days: 70,
            n_forecast_weeks: 4,
            n_draws: 80,
            seed: 11,
            missing_prob: 0.05,
        };
        let sample = generate_sample(&sample_config).unwrap();
        let config = AggregateConfig {
            forecast_date: sample.forecast_date,
            history_start: sample_config.history_start,
            levels: FLUSIGHT_LEVELS.to_vec(),
            renames: HashMap::new(),
            target: "ILI ED visits".to_string(),
        };

        let a = run_pipeline(&sample.trajectories, &sample.daily, &config).unwrap();
        let b = run_pipeline(&sample.trajectories, &sample.daily, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn quantiles_are_monotone_within_each_week() {
        let sample_config = SampleConfig {
            locations: vec!["Citywide".to_string()],
            history_start: d("2024-09-29"),
            n_history_days: 56,
            n_forecast_weeks: 3,
            n_draws: 200,
            seed: 3,
            missing_prob: 0.0,
        };
        let sample = generate_sample(&sample_config).unwrap();
        let config = AggregateConfig {
            forecast_date: sample.forecast_date,
            history_start: sample_config.history_start,
            levels: FLUSIGHT_LEVELS.to_vec(),
            renames: HashMap::new(),
            target: "ILI ED visits".to_string(),
        };
        let run = run_pipeline(&sample.trajectories, &sample.daily, &config).unwrap();

        let mut by_week: HashMap<(String, NaiveDate), Vec<&crate::domain::QuantileRecord>> =
            HashMap::new();
        for q in &run.quantiles {
            by_week
                .entry((q.location.clone(), q.target_end_date))
                .or_default()
                .push(q);
        }
        for records in by_week.values() {
            for pair in records.windows(2) {
                assert!(pair[0].output_type_id < pair[1].output_type_id);
                assert!(pair[0].value <= pair[1].value);
            }
            let at = |level: f64| {
                records
                    .iter()
                    .find(|q| q.output_type_id == level)
                    .unwrap()
                    .value
            };
            assert!(at(0.25) <= at(0.5) && at(0.5) <= at(0.75));
        }
    }

    #[test]
    fn bad_level_rejected_before_trajectory_validation() {
        // The trajectory set is deliberately malformed; a level outside (0, 1)
        // must win the race and surface first.
        let mut trajectories = TrajectorySet::new();
        trajectories.insert(
            "Citywide".to_string(),
            TrajectoryPair {
                hindcast: DMatrix::from_element(1, 99, 1.0),
                forecast: DMatrix::from_element(5, 1, 1.0),
            },
        );
        let daily = vec![DailyPoint {
            location: "Citywide".to_string(),
            date: d("2025-01-01"),
            observed: Some(1),
        }];
        let config = AggregateConfig {
            forecast_date: d("2025-01-03"),
            history_start: d("2025-01-01"),
            levels: vec![1.5],
            renames: HashMap::new(),
            target: "ILI ED visits".to_string(),
        };

        let err = run_pipeline(&trajectories, &daily, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantileLevel);
    }
}
