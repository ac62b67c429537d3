//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads (or generates) the observed series and trajectory matrices
//! - runs the aggregation pipeline
//! - prints the run summary and forecast preview
//! - writes optional exports

use std::collections::HashMap;
use std::path::Path;

use clap::Parser;

use crate::cli::{Command, DemoArgs, OutputArgs, RunArgs};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::{AggregateConfig, DailyPoint, TrajectorySet};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `hubcast` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let daily = crate::io::read_daily_csv(&args.daily)?;
    let trajectories = crate::io::read_trajectory_dir(&args.trajectories)?;

    let history_start = match args.history_start {
        Some(date) => date,
        None => daily
            .iter()
            .map(|p| p.date)
            .min()
            .ok_or_else(|| AppError::new(2, "Observed daily table is empty."))?,
    };
    let config = AggregateConfig {
        forecast_date: args.forecast_date,
        history_start,
        levels: args
            .levels
            .unwrap_or_else(|| crate::agg::FLUSIGHT_LEVELS.to_vec()),
        renames: parse_renames(&args.rename)?,
        target: args.target,
    };

    execute(&trajectories, &daily, &config, &args.output)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let sample_config = SampleConfig {
        locations: args.locations,
        history_start: args.history_start,
        n_history_days: args.history_days,
        n_forecast_weeks: args.weeks,
        n_draws: args.draws,
        seed: args.seed,
        missing_prob: args.missing_prob,
    };
    let sample = generate_sample(&sample_config)?;

    if let Some(dir) = &args.write_inputs {
        write_demo_inputs(dir, &sample.daily, &sample.trajectories)?;
        println!("Wrote demo inputs to {}", dir.display());
    }

    let config = AggregateConfig {
        forecast_date: sample.forecast_date,
        history_start: sample_config.history_start,
        levels: args
            .levels
            .unwrap_or_else(|| crate::agg::FLUSIGHT_LEVELS.to_vec()),
        renames: parse_renames(&args.rename)?,
        target: args.target,
    };

    execute(&sample.trajectories, &sample.daily, &config, &args.output)
}

/// Run the pipeline and emit terminal output + requested exports.
fn execute(
    trajectories: &TrajectorySet,
    daily: &[DailyPoint],
    config: &AggregateConfig,
    output: &OutputArgs,
) -> Result<(), AppError> {
    let run = pipeline::run_pipeline(trajectories, daily, config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.spec, &run.stats, config)
    );
    let preview = crate::report::preview_rows(&run.quantiles);
    println!("{}", crate::report::format_preview(&preview, output.top));

    if let Some(path) = &output.export {
        crate::io::write_submission_csv(path, &run.quantiles)?;
        println!("Wrote submission table to {}", path.display());
    }
    if let Some(path) = &output.export_weekly {
        crate::io::write_weekly_csv(path, &run.weekly)?;
        println!("Wrote weekly aggregates to {}", path.display());
    }
    if let Some(path) = &output.export_manifest {
        crate::io::write_manifest_json(
            path,
            config,
            &run.spec,
            &run.stats,
            run.weekly.len(),
            run.quantiles.len(),
        )?;
        println!("Wrote run manifest to {}", path.display());
    }
    if output.debug_bundle {
        let path = crate::debug::write_debug_bundle(config, &run.spec, &run.stats, &run.weekly)?;
        println!("Wrote debug bundle to {}", path.display());
    }

    Ok(())
}

/// Parse repeated `FROM=TO` rename flags into a lookup table.
///
/// With no flags, the default hub rename for the citywide series applies.
pub fn parse_renames(args: &[String]) -> Result<HashMap<String, String>, AppError> {
    if args.is_empty() {
        let mut renames = HashMap::new();
        renames.insert("Citywide".to_string(), "NYC".to_string());
        return Ok(renames);
    }

    let mut renames = HashMap::new();
    for arg in args {
        let Some((from, to)) = arg.split_once('=') else {
            return Err(AppError::new(
                2,
                format!("Invalid --rename '{arg}': expected FROM=TO."),
            ));
        };
        if from.is_empty() || to.is_empty() {
            return Err(AppError::new(
                2,
                format!("Invalid --rename '{arg}': empty side."),
            ));
        }
        renames.insert(from.to_string(), to.to_string());
    }
    Ok(renames)
}

fn write_demo_inputs(
    dir: &Path,
    daily: &[DailyPoint],
    trajectories: &TrajectorySet,
) -> Result<(), AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(2, format!("Failed to create demo input dir '{}': {e}", dir.display()))
    })?;

    crate::io::write_daily_csv(&dir.join("daily.csv"), daily)?;
    for (location, pair) in trajectories {
        crate::io::write_matrix_csv(&dir.join(format!("{location}__hindcast.csv")), &pair.hindcast)?;
        crate::io::write_matrix_csv(&dir.join(format!("{location}__forecast.csv")), &pair.forecast)?;
    }
    Ok(())
}
