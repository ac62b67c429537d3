//! Weekly aggregation: collapse long-form daily records into per-draw
//! epi-week sums.
//!
//! Grouping runs over `(location, target_end_date, draw)` with the reference
//! date fixed for the whole run. `BTreeMap` keys make the output order
//! deterministic, so identical inputs produce byte-identical tables.
//!
//! The completeness gate is deliberately fatal: a current or future week with
//! fewer than 7 contributing days means the trajectory matrices are the wrong
//! length or the daily table has a hole, and publishing a sum over a partial
//! week would silently understate that week's forecast.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::{LongRecord, WeeklyRecord};
use crate::epiweek::{horizon_weeks, week_ending_saturday};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default)]
struct WeekAcc {
    n_days: u32,
    count_sum: f64,
    obs_sum: f64,
}

/// Aggregate long records into per-draw weekly sums.
///
/// `count_7d` sums every daily count in the week (trajectories have no missing
/// draws, so full weeks always sum 7 days). `obs_weekly_sum` sums only the
/// days with a reported observation; missing days are excluded, not zeroed.
///
/// Partial weeks are tolerated only in the fully historical range
/// (`horizon < 0`, e.g. a history that starts mid-week). Any week at
/// `horizon >= 0` with fewer than 7 days aborts the run.
pub fn aggregate_weekly(
    records: &[LongRecord],
    forecast_date: NaiveDate,
) -> Result<Vec<WeeklyRecord>, AppError> {
    let reference_date = week_ending_saturday(forecast_date);

    let mut groups: BTreeMap<(String, NaiveDate, u32), WeekAcc> = BTreeMap::new();
    for r in records {
        let target_end_date = week_ending_saturday(r.date);
        let acc = groups
            .entry((r.location.clone(), target_end_date, r.draw))
            .or_default();
        acc.n_days += 1;
        acc.count_sum += r.count;
        if let Some(obs) = r.observed {
            acc.obs_sum += obs;
        }
    }

    let mut incomplete: BTreeSet<(String, NaiveDate)> = BTreeSet::new();
    let mut weekly = Vec::with_capacity(groups.len());
    for ((location, target_end_date, draw), acc) in groups {
        let horizon = horizon_weeks(reference_date, target_end_date);
        if horizon >= 0 && acc.n_days != 7 {
            incomplete.insert((location.clone(), target_end_date));
            continue;
        }
        weekly.push(WeeklyRecord {
            reference_date,
            target_end_date,
            location,
            draw,
            n_days_data: acc.n_days,
            count_7d: acc.count_sum,
            obs_weekly_sum: acc.obs_sum,
            horizon,
        });
    }

    if !incomplete.is_empty() {
        let pairs: Vec<(String, NaiveDate)> = incomplete.into_iter().collect();
        return Err(AppError::incomplete_week(&pairs));
    }

    Ok(weekly)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::domain::Period;
    use crate::error::ErrorKind;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// One draw's worth of daily records starting at `start`.
    fn daily_records(
        location: &str,
        draw: u32,
        start: &str,
        counts: &[f64],
        observed: &[Option<f64>],
    ) -> Vec<LongRecord> {
        counts
            .iter()
            .zip(observed)
            .enumerate()
            .map(|(i, (c, o))| LongRecord {
                draw,
                t: (i + 1) as u32,
                location: location.to_string(),
                count: *c,
                period: Period::Hindcast,
                date: d(start) + Duration::days(i as i64),
                observed: *o,
            })
            .collect()
    }

    #[test]
    fn full_week_sums_counts_and_observed() {
        // 2024-12-29 is a Sunday; one full epi-week ending Saturday 2025-01-04.
        let counts = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let observed = [Some(1.0); 7];
        let records = daily_records("Citywide", 1, "2024-12-29", &counts, &observed);

        let weekly = aggregate_weekly(&records, d("2025-01-03")).unwrap();
        assert_eq!(weekly.len(), 1);
        let w = &weekly[0];
        assert_eq!(w.target_end_date, d("2025-01-04"));
        assert_eq!(w.reference_date, d("2025-01-04"));
        assert_eq!(w.n_days_data, 7);
        assert_eq!(w.count_7d, 28.0);
        assert_eq!(w.obs_weekly_sum, 7.0);
        assert_eq!(w.horizon, 0);
    }

    #[test]
    fn missing_observed_days_shrink_obs_sum_only() {
        let counts = [1.0; 7];
        let observed = [Some(3.0), None, Some(3.0), None, Some(3.0), Some(3.0), Some(3.0)];
        let records = daily_records("Citywide", 1, "2024-12-29", &counts, &observed);

        let weekly = aggregate_weekly(&records, d("2025-01-03")).unwrap();
        assert_eq!(weekly[0].count_7d, 7.0);
        assert_eq!(weekly[0].obs_weekly_sum, 15.0);
        assert_eq!(weekly[0].n_days_data, 7);
    }

    #[test]
    fn partial_current_week_aborts_with_offending_keys() {
        // Only Sunday..Thursday of the week ending 2025-01-04: 5 days at
        // horizon 0 must abort, naming the location and week.
        let counts = [1.0; 5];
        let observed = [None; 5];
        let records = daily_records("Queens", 1, "2024-12-29", &counts, &observed);

        let err = aggregate_weekly(&records, d("2025-01-03")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteWeek);
        assert!(err.to_string().contains("Queens"));
        assert!(err.to_string().contains("2025-01-04"));
    }

    #[test]
    fn partial_historical_week_is_tolerated() {
        // History starting Wednesday 2024-12-18 gives a 4-day leading week
        // ending Saturday 2024-12-21 (horizon -2) plus a full week ending
        // 2024-12-28 (horizon -1).
        let counts = [1.0; 11];
        let observed = [Some(2.0); 11];
        let records = daily_records("Citywide", 1, "2024-12-18", &counts, &observed);

        let weekly = aggregate_weekly(&records, d("2025-01-03")).unwrap();
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].target_end_date, d("2024-12-21"));
        assert_eq!(weekly[0].n_days_data, 4);
        assert_eq!(weekly[0].horizon, -2);
        assert_eq!(weekly[1].target_end_date, d("2024-12-28"));
        assert_eq!(weekly[1].n_days_data, 7);
        assert_eq!(weekly[1].horizon, -1);
    }

    #[test]
    fn groups_are_per_draw_and_per_location() {
        let mut records = daily_records("Bronx", 1, "2024-12-29", &[1.0; 7], &[None; 7]);
        records.extend(daily_records("Bronx", 2, "2024-12-29", &[2.0; 7], &[None; 7]));
        records.extend(daily_records("Citywide", 1, "2024-12-29", &[3.0; 7], &[None; 7]));

        let weekly = aggregate_weekly(&records, d("2025-01-03")).unwrap();
        assert_eq!(weekly.len(), 3);
        // BTreeMap order: (Bronx, 1), (Bronx, 2), (Citywide, 1).
        assert_eq!(weekly[0].count_7d, 7.0);
        assert_eq!(weekly[1].count_7d, 14.0);
        assert_eq!(weekly[2].count_7d, 21.0);
    }
}
