//! Command-line parsing for the epiweek quantile aggregator.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "hubcast",
    version,
    about = "Aggregate posterior daily trajectories into epiweek quantile forecasts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate trajectory matrices + an observed daily series from files.
    Run(RunArgs),
    /// Generate a deterministic synthetic dataset and aggregate it.
    ///
    /// Useful for demos, benchmarking the output format, and producing input
    /// fixtures (`--write-inputs`) for `hubcast run`.
    Demo(DemoArgs),
}

/// Options for aggregating from files.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Observed daily series CSV (columns: location,date,count).
    #[arg(long, value_name = "CSV")]
    pub daily: PathBuf,

    /// Directory of per-location `<loc>__hindcast.csv` / `<loc>__forecast.csv`
    /// matrices (rows = draws, columns = days).
    #[arg(long, value_name = "DIR")]
    pub trajectories: PathBuf,

    /// As-of date anchoring the reference Saturday.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub forecast_date: NaiveDate,

    /// Calendar date of t = 1 (defaults to the earliest date in the daily CSV).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub history_start: Option<NaiveDate>,

    /// Comma-separated quantile levels in (0, 1). Defaults to the 23-point
    /// FluSight grid.
    #[arg(long, value_delimiter = ',', value_name = "P,P,...")]
    pub levels: Option<Vec<f64>>,

    /// Location rename for hub display labels, as FROM=TO (repeatable).
    /// Defaults to Citywide=NYC.
    #[arg(long, value_name = "FROM=TO")]
    pub rename: Vec<String>,

    /// Descriptive target string for the submission table.
    #[arg(long, default_value = "ILI ED visits")]
    pub target: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for the synthetic demo run.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Comma-separated location names.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "Citywide,Bronx,Brooklyn,Manhattan,Queens,StatenIsland"
    )]
    pub locations: Vec<String>,

    /// First day of the synthetic history.
    #[arg(long, value_name = "YYYY-MM-DD", default_value = "2024-10-01")]
    pub history_start: NaiveDate,

    /// Length of the synthetic history in days.
    #[arg(long, default_value_t = 120)]
    pub history_days: usize,

    /// Target weeks covered by the forecast window, counting the current week.
    #[arg(long, default_value_t = 4)]
    pub weeks: usize,

    /// Number of posterior draws per location.
    #[arg(long, default_value_t = 500)]
    pub draws: usize,

    /// Random seed for the generator.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Probability that an observed day is reported missing.
    #[arg(long, default_value_t = 0.02)]
    pub missing_prob: f64,

    /// Write the generated inputs (daily.csv + matrices) to this directory,
    /// in the formats `hubcast run` consumes.
    #[arg(long, value_name = "DIR")]
    pub write_inputs: Option<PathBuf>,

    /// Comma-separated quantile levels in (0, 1). Defaults to the 23-point
    /// FluSight grid.
    #[arg(long, value_delimiter = ',', value_name = "P,P,...")]
    pub levels: Option<Vec<f64>>,

    /// Location rename for hub display labels, as FROM=TO (repeatable).
    /// Defaults to Citywide=NYC.
    #[arg(long, value_name = "FROM=TO")]
    pub rename: Vec<String>,

    /// Descriptive target string for the submission table.
    #[arg(long, default_value = "ILI ED visits")]
    pub target: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output options shared by `run` and `demo`.
#[derive(Debug, Parser, Clone)]
pub struct OutputArgs {
    /// Export the hub submission table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export draw-level weekly aggregates to CSV.
    #[arg(long = "export-weekly", value_name = "CSV")]
    pub export_weekly: Option<PathBuf>,

    /// Export a run-manifest JSON alongside the submission.
    #[arg(long = "export-manifest", value_name = "JSON")]
    pub export_manifest: Option<PathBuf>,

    /// Write a markdown debug bundle under ./debug/.
    #[arg(long)]
    pub debug_bundle: bool,

    /// Preview rows to print.
    #[arg(long, default_value_t = 12)]
    pub top: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_parse_levels_and_renames() {
        let cli = Cli::try_parse_from([
            "hubcast",
            "run",
            "--daily",
            "daily.csv",
            "--trajectories",
            "traj",
            "--forecast-date",
            "2025-01-03",
            "--levels",
            "0.25,0.5,0.75",
            "--rename",
            "Citywide=NYC",
            "--rename",
            "StatenIsland=Staten Island",
        ])
        .unwrap();

        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.forecast_date, "2025-01-03".parse::<NaiveDate>().unwrap());
        assert_eq!(args.levels.as_deref(), Some(&[0.25, 0.5, 0.75][..]));
        assert_eq!(args.rename.len(), 2);
        assert_eq!(args.target, "ILI ED visits");
    }

    #[test]
    fn demo_args_have_usable_defaults() {
        let cli = Cli::try_parse_from(["hubcast", "demo"]).unwrap();
        let Command::Demo(args) = cli.command else {
            panic!("expected demo subcommand");
        };
        assert_eq!(args.locations.len(), 6);
        assert_eq!(args.draws, 500);
        assert_eq!(args.weeks, 4);
        assert!(args.levels.is_none());
    }
}
