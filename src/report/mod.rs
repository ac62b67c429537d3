//! Reporting utilities: interval previews and formatted terminal output.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::QuantileRecord;

pub mod format;

pub use format::*;

/// A condensed per-week view of the quantile table, for terminal preview.
#[derive(Debug, Clone)]
pub struct PreviewRow {
    pub location: String,
    pub target_end_date: NaiveDate,
    pub horizon: i32,
    pub obs_weekly_sum: f64,
    /// Values at the levels nearest 0.025 / 0.25 / 0.5 / 0.75 / 0.975.
    pub lo95: f64,
    pub lo50: f64,
    pub median: f64,
    pub hi50: f64,
    pub hi95: f64,
}

/// Collapse the quantile table into one preview row per (location, week).
///
/// Interval endpoints use the requested level closest to each nominal
/// probability, so previews stay meaningful for custom level grids too.
pub fn preview_rows(quantiles: &[QuantileRecord]) -> Vec<PreviewRow> {
    let mut groups: BTreeMap<(String, NaiveDate), Vec<&QuantileRecord>> = BTreeMap::new();
    for q in quantiles {
        groups
            .entry((q.location.clone(), q.target_end_date))
            .or_default()
            .push(q);
    }

    let mut rows = Vec::with_capacity(groups.len());
    for ((location, target_end_date), records) in groups {
        let first = records[0];
        rows.push(PreviewRow {
            location,
            target_end_date,
            horizon: first.horizon,
            obs_weekly_sum: first.obs_weekly_sum,
            lo95: value_nearest(&records, 0.025),
            lo50: value_nearest(&records, 0.25),
            median: value_nearest(&records, 0.5),
            hi50: value_nearest(&records, 0.75),
            hi95: value_nearest(&records, 0.975),
        });
    }
    rows
}

fn value_nearest(records: &[&QuantileRecord], level: f64) -> f64 {
    let mut best = records[0];
    for r in records {
        if (r.output_type_id - level).abs() < (best.output_type_id - level).abs() {
            best = r;
        }
    }
    best.value
}
