//! CSV ingest for the observed daily series and the trajectory matrices.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Line-numbered errors** so a bad row in a large export is findable
//! - **Deterministic behavior**: locations land in a `BTreeMap`, so the rest
//!   of the pipeline sees them in sorted order regardless of directory order
//!
//! The aggregation pipeline itself does no I/O; this module is the boundary
//! where files become typed records.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use nalgebra::DMatrix;

use crate::domain::{DailyPoint, TrajectoryPair, TrajectorySet};
use crate::error::AppError;

const HINDCAST_SUFFIX: &str = "__hindcast.csv";
const FORECAST_SUFFIX: &str = "__forecast.csv";

/// Read the observed daily series.
///
/// Expected header: `location,date,count`. Dates are ISO (`YYYY-MM-DD`); an
/// empty or `NA` count marks an explicitly missing observation.
pub fn read_daily_csv(path: &Path) -> Result<Vec<DailyPoint>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open daily CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read daily CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let location_idx = require_column(&header_map, "location", path)?;
    let date_idx = require_column(&header_map, "date", path)?;
    let count_idx = require_column(&header_map, "count", path)?;

    let mut points = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let record =
            record.map_err(|e| AppError::new(2, format!("Daily CSV line {line}: {e}")))?;

        let location = field(&record, location_idx);
        if location.is_empty() {
            return Err(AppError::new(2, format!("Daily CSV line {line}: empty location.")));
        }
        let date: NaiveDate = field(&record, date_idx).parse().map_err(|e| {
            AppError::new(2, format!("Daily CSV line {line}: invalid date: {e}"))
        })?;
        let raw_count = field(&record, count_idx);
        let observed = if raw_count.is_empty() || raw_count.eq_ignore_ascii_case("na") {
            None
        } else {
            Some(raw_count.parse::<u32>().map_err(|e| {
                AppError::new(
                    2,
                    format!("Daily CSV line {line}: invalid count '{raw_count}': {e}"),
                )
            })?)
        };

        points.push(DailyPoint {
            location: location.to_string(),
            date,
            observed,
        });
    }

    if points.is_empty() {
        return Err(AppError::new(2, format!("Daily CSV '{}' has no rows.", path.display())));
    }
    Ok(points)
}

/// Scan a directory for per-location trajectory matrix pairs.
///
/// Files are named `<location>__hindcast.csv` / `<location>__forecast.csv`,
/// headerless, one row per draw. Other files are ignored. A location with
/// only one of the two files is an error.
pub fn read_trajectory_dir(dir: &Path) -> Result<TrajectorySet, AppError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AppError::new(2, format!("Failed to read trajectory dir '{}': {e}", dir.display()))
    })?;

    let mut hindcasts: HashMap<String, PathBuf> = HashMap::new();
    let mut forecasts: HashMap<String, PathBuf> = HashMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            AppError::new(2, format!("Failed to read trajectory dir '{}': {e}", dir.display()))
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(location) = name.strip_suffix(HINDCAST_SUFFIX) {
            hindcasts.insert(location.to_string(), entry.path());
        } else if let Some(location) = name.strip_suffix(FORECAST_SUFFIX) {
            forecasts.insert(location.to_string(), entry.path());
        }
    }

    if hindcasts.is_empty() && forecasts.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "No '*{HINDCAST_SUFFIX}' / '*{FORECAST_SUFFIX}' files found in '{}'.",
                dir.display()
            ),
        ));
    }

    let mut trajectories = TrajectorySet::new();
    let mut locations: Vec<String> = hindcasts.keys().chain(forecasts.keys()).cloned().collect();
    locations.sort();
    locations.dedup();

    for location in locations {
        let hindcast_path = hindcasts.get(&location).ok_or_else(|| {
            AppError::new(
                2,
                format!("'{location}' has a forecast matrix but no '{location}{HINDCAST_SUFFIX}'."),
            )
        })?;
        let forecast_path = forecasts.get(&location).ok_or_else(|| {
            AppError::new(
                2,
                format!("'{location}' has a hindcast matrix but no '{location}{FORECAST_SUFFIX}'."),
            )
        })?;
        let pair = TrajectoryPair {
            hindcast: read_matrix_csv(hindcast_path)?,
            forecast: read_matrix_csv(forecast_path)?,
        };
        trajectories.insert(location, pair);
    }

    Ok(trajectories)
}

/// Read a headerless numeric matrix (rows = draws, columns = days).
pub fn read_matrix_csv(path: &Path) -> Result<DMatrix<f64>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open matrix CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut values: Vec<f64> = Vec::new();
    let mut n_cols: Option<usize> = None;
    let mut n_rows = 0usize;
    for (i, record) in reader.records().enumerate() {
        let line = i + 1;
        let record = record.map_err(|e| {
            AppError::new(2, format!("Matrix CSV '{}' line {line}: {e}", path.display()))
        })?;
        match n_cols {
            None => n_cols = Some(record.len()),
            Some(w) if w != record.len() => {
                return Err(AppError::new(
                    2,
                    format!(
                        "Matrix CSV '{}' line {line}: {} fields, expected {w} (ragged matrix).",
                        path.display(),
                        record.len()
                    ),
                ));
            }
            Some(_) => {}
        }
        for raw in record.iter() {
            let v: f64 = raw.parse().map_err(|e| {
                AppError::new(
                    2,
                    format!(
                        "Matrix CSV '{}' line {line}: invalid value '{raw}': {e}",
                        path.display()
                    ),
                )
            })?;
            values.push(v);
        }
        n_rows += 1;
    }

    let n_cols = n_cols.unwrap_or(0);
    if n_rows == 0 || n_cols == 0 {
        return Err(AppError::new(
            2,
            format!("Matrix CSV '{}' is empty.", path.display()),
        ));
    }
    Ok(DMatrix::from_row_iterator(n_rows, n_cols, values))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}

fn require_column(
    header_map: &HashMap<String, usize>,
    name: &str,
    path: &Path,
) -> Result<usize, AppError> {
    header_map.get(name).copied().ok_or_else(|| {
        AppError::new(
            2,
            format!("Daily CSV '{}' is missing required column '{name}'.", path.display()),
        )
    })
}

fn field<'a>(record: &'a StringRecord, idx: usize) -> &'a str {
    record.get(idx).unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hubcast-ingest-{}-{name}", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn daily_csv_parses_missing_counts() {
        let path = temp_file(
            "daily.csv",
            "location,date,count\nCitywide,2025-01-01,120\nCitywide,2025-01-02,\nCitywide,2025-01-03,NA\n",
        );
        let points = read_daily_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].observed, Some(120));
        assert_eq!(points[1].observed, None);
        assert_eq!(points[2].observed, None);
    }

    #[test]
    fn daily_csv_rejects_bad_rows_with_line_numbers() {
        let path = temp_file(
            "daily-bad.csv",
            "location,date,count\nCitywide,2025-01-01,120\nCitywide,not-a-date,5\n",
        );
        let err = read_daily_csv(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn daily_csv_requires_count_column() {
        let path = temp_file("daily-noheader.csv", "location,date\nCitywide,2025-01-01\n");
        let err = read_daily_csv(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn matrix_csv_roundtrip_and_ragged_rejection() {
        let path = temp_file("mat.csv", "1.0,2.0,3.0\n4.0,5.0,6.0\n");
        let m = read_matrix_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!((m.nrows(), m.ncols()), (2, 3));
        assert_eq!(m[(1, 2)], 6.0);

        let ragged = temp_file("mat-ragged.csv", "1.0,2.0\n3.0\n");
        let err = read_matrix_csv(&ragged).unwrap_err();
        std::fs::remove_file(&ragged).ok();
        assert!(err.to_string().contains("ragged"));
    }
}
