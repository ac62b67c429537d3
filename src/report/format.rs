//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{AggregateConfig, DatasetStats, RunSpec};
use crate::epiweek::epi_week_of;
use crate::report::PreviewRow;

/// Format the run summary (geometry + dataset stats + config echo).
pub fn format_run_summary(
    spec: &RunSpec,
    stats: &DatasetStats,
    config: &AggregateConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== hubcast - Epiweek Quantile Aggregation ===\n");
    out.push_str(&format!("Target: {}\n", config.target));
    out.push_str(&format!(
        "Forecast date: {} (reference {})\n",
        config.forecast_date, spec.reference_date
    ));
    out.push_str(&format!(
        "History: {} .. {} ({} days, {} .. {})\n",
        spec.history_start,
        spec.history_end,
        spec.n_history_days,
        epi_week_of(spec.history_start),
        epi_week_of(spec.history_end),
    ));
    out.push_str(&format!(
        "Forecast: {} days, through {} ({})\n",
        spec.n_forecast_days,
        spec.forecast_end,
        epi_week_of(spec.forecast_end),
    ));
    out.push_str(&format!(
        "Draws: {} | Locations: {} | Long rows: {}\n",
        spec.n_draws, stats.n_locations, stats.n_long_rows
    ));
    out.push_str(&format!(
        "Observed days: {} reported, {} missing\n",
        stats.n_observed_days, stats.n_missing_days
    ));
    out.push_str(&format!(
        "Trajectory counts: [{:.2}, {:.2}]\n",
        stats.count_min, stats.count_max
    ));
    out.push_str(&format!("Levels: {} requested\n", config.levels.len()));
    out.push('\n');

    out
}

/// Format the per-week interval preview table.
pub fn format_preview(rows: &[PreviewRow], top: usize) -> String {
    let mut out = String::new();

    out.push_str("Weekly forecast preview (median and central intervals):\n");
    out.push_str(
        format!(
            "{:<16} {:>12} {:>4} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "location", "week_ending", "h", "obs", "q2.5%", "q25%", "median", "q75%", "q97.5%"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<16} {:-<12} {:-<4} {:-<10} {:-<10} {:-<10} {:-<10} {:-<10} {:-<10}\n",
            "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for row in rows.iter().take(top) {
        out.push_str(&format!(
            "{:<16} {:>12} {:>4} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>10.1}\n",
            row.location,
            row.target_end_date.to_string(),
            row.horizon,
            row.obs_weekly_sum,
            row.lo95,
            row.lo50,
            row.median,
            row.hi50,
            row.hi95,
        ));
    }
    if rows.len() > top {
        out.push_str(&format!("... ({} more rows)\n", rows.len() - top));
    }

    out
}
