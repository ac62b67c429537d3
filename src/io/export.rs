//! Export the submission and diagnostics tables to CSV.
//!
//! The submission export matches the standard hub quantile-forecast schema
//! column-for-column; the weekly export is a draw-level diagnostic meant for
//! spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use nalgebra::DMatrix;

use crate::domain::{DailyPoint, QuantileRecord, WeeklyRecord};
use crate::error::AppError;

/// Column order required by the hub submission format.
pub const SUBMISSION_HEADER: &str =
    "reference_date,location,horizon,obs_weekly_sum,target,target_end_date,output_type,output_type_id,value";

/// Write the hub submission table.
pub fn write_submission_csv(path: &Path, records: &[QuantileRecord]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create submission CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "{SUBMISSION_HEADER}")
        .map_err(|e| AppError::new(2, format!("Failed to write submission CSV header: {e}")))?;

    for r in records {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{:.4}",
            r.reference_date,
            r.location,
            r.horizon,
            r.obs_weekly_sum,
            r.target,
            r.target_end_date,
            r.output_type,
            r.output_type_id,
            r.value,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write submission CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the draw-level weekly aggregates.
pub fn write_weekly_csv(path: &Path, records: &[WeeklyRecord]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create weekly CSV '{}': {e}", path.display()))
    })?;

    writeln!(
        file,
        "reference_date,target_end_date,location,draw,n_days_data,count_7d,obs_weekly_sum,horizon"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write weekly CSV header: {e}")))?;

    for r in records {
        writeln!(
            file,
            "{},{},{},{},{},{:.4},{},{}",
            r.reference_date,
            r.target_end_date,
            r.location,
            r.draw,
            r.n_days_data,
            r.count_7d,
            r.obs_weekly_sum,
            r.horizon,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write weekly CSV row: {e}")))?;
    }

    Ok(())
}

/// Write an observed daily series in the ingest format
/// (`location,date,count`; empty count = missing).
pub fn write_daily_csv(path: &Path, points: &[DailyPoint]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create daily CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "location,date,count")
        .map_err(|e| AppError::new(2, format!("Failed to write daily CSV header: {e}")))?;
    for p in points {
        let count = p.observed.map(|c| c.to_string()).unwrap_or_default();
        writeln!(file, "{},{},{count}", p.location, p.date)
            .map_err(|e| AppError::new(2, format!("Failed to write daily CSV row: {e}")))?;
    }
    Ok(())
}

/// Write a headerless trajectory matrix in the ingest format.
pub fn write_matrix_csv(path: &Path, matrix: &DMatrix<f64>) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create matrix CSV '{}': {e}", path.display()))
    })?;

    for row in 0..matrix.nrows() {
        let line = (0..matrix.ncols())
            .map(|col| matrix[(row, col)].to_string())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(file, "{line}")
            .map_err(|e| AppError::new(2, format!("Failed to write matrix CSV row: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::io::ingest::{read_daily_csv, read_matrix_csv};

    fn record() -> QuantileRecord {
        QuantileRecord {
            reference_date: "2025-01-04".parse().unwrap(),
            location: "NYC".to_string(),
            horizon: 1,
            obs_weekly_sum: 350.0,
            target: "ILI ED visits".to_string(),
            target_end_date: "2025-01-11".parse().unwrap(),
            output_type: "quantile".to_string(),
            output_type_id: 0.025,
            value: 312.5,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hubcast-export-{}-{name}", std::process::id()))
    }

    #[test]
    fn submission_csv_has_exact_schema() {
        let path = temp_path("sub.csv");
        write_submission_csv(&path, &[record()]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), SUBMISSION_HEADER);
        assert_eq!(
            lines.next().unwrap(),
            "2025-01-04,NYC,1,350,ILI ED visits,2025-01-11,quantile,0.025,312.5000"
        );
    }

    #[test]
    fn weekly_csv_carries_draw_level_rows() {
        let weekly = WeeklyRecord {
            reference_date: "2025-01-04".parse().unwrap(),
            target_end_date: "2024-12-28".parse().unwrap(),
            location: "Citywide".to_string(),
            draw: 12,
            n_days_data: 7,
            count_7d: 280.25,
            obs_weekly_sum: 275.0,
            horizon: -1,
        };
        let path = temp_path("weekly.csv");
        write_weekly_csv(&path, &[weekly]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            contents.lines().nth(1).unwrap(),
            "2025-01-04,2024-12-28,Citywide,12,7,280.2500,275,-1"
        );
    }

    #[test]
    fn daily_csv_roundtrips_through_ingest() {
        let points = vec![
            DailyPoint {
                location: "Citywide".to_string(),
                date: "2025-01-01".parse().unwrap(),
                observed: Some(120),
            },
            DailyPoint {
                location: "Citywide".to_string(),
                date: "2025-01-02".parse().unwrap(),
                observed: None,
            },
        ];
        let path = temp_path("daily-rt.csv");
        write_daily_csv(&path, &points).unwrap();
        let read_back = read_daily_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(read_back, points);
    }

    #[test]
    fn matrix_csv_roundtrips_through_ingest() {
        let matrix = DMatrix::from_row_slice(2, 3, &[1.5, 2.0, 3.25, 4.0, 5.5, 6.0]);
        let path = temp_path("mat-rt.csv");
        write_matrix_csv(&path, &matrix).unwrap();
        let read_back = read_matrix_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(read_back, matrix);
    }
}
