use chrono::NaiveDate;

/// Broad classification of pipeline failures.
///
/// Exit codes are stable so scripts wrapping the binary can branch on them:
///
/// - `Config` (2): unreadable/malformed inputs, bad CLI flags
/// - `SchemaMismatch` (3): trajectory dimensions or date/location joins disagree
/// - `IncompleteWeek` (4): a current/future epi-week has fewer than 7 days
/// - `InvalidQuantileLevel` (5): a requested probability level outside (0, 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    SchemaMismatch,
    IncompleteWeek,
    InvalidQuantileLevel,
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    /// Generic configuration/input error.
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Config,
            exit_code,
            message: message.into(),
        }
    }

    /// Trajectory matrix dimensions or a date/location join disagree with the
    /// expected day counts. Not recoverable.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::SchemaMismatch,
            exit_code: 3,
            message: message.into(),
        }
    }

    /// A week at horizon >= 0 aggregated fewer than 7 days.
    ///
    /// The offending `(location, target_end_date)` pairs are enumerated in the
    /// message so the upstream trajectory-length defect can be diagnosed.
    pub fn incomplete_week(pairs: &[(String, NaiveDate)]) -> Self {
        let listed = pairs
            .iter()
            .map(|(loc, week)| format!("{loc} @ {week}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            kind: ErrorKind::IncompleteWeek,
            exit_code: 4,
            message: format!(
                "Incomplete epi-week(s) at horizon >= 0 (expected 7 days): {listed}. \
                 No output was produced."
            ),
        }
    }

    /// A requested quantile probability level is outside the open interval (0, 1).
    pub fn invalid_quantile_level(level: f64) -> Self {
        Self {
            kind: ErrorKind::InvalidQuantileLevel,
            exit_code: 5,
            message: format!("Invalid quantile level {level}: levels must lie strictly inside (0, 1)."),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
