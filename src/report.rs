use std::{
    fmt,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use thiserror::Error;

use crate::{
    api::ApiError,
    pipeline::{Outcome, Trip},
};

pub const LOG_HEADER: &str = "Timestamp,Travel Time (minutes)";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FAILURE_SENTINEL: &str = "ERROR";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write travel time log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),
}

/// One row of the travel time log. `minutes` is `None` when the route could
/// not be fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub minutes: Option<u64>,
}

impl LogRecord {
    pub fn now(minutes: Option<u64>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            minutes,
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},", self.timestamp.format(TIMESTAMP_FORMAT))?;
        match self.minutes {
            Some(minutes) => write!(f, "{}", minutes),
            None => f.write_str(FAILURE_SENTINEL),
        }
    }
}

/// Appends `record` to the CSV log at `path`, writing the header first when
/// the file is new or empty.
pub fn append_record(path: &Path, record: &LogRecord) -> Result<(), ReportError> {
    let wrap = |source| ReportError::Log {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap)?;

    let mut lines = String::new();
    if file.metadata().map_err(wrap)?.len() == 0 {
        lines.push_str(LOG_HEADER);
        lines.push('\n');
    }
    lines.push_str(&record.to_string());
    lines.push('\n');

    file.write_all(lines.as_bytes()).map_err(wrap)
}

/// Human readable line for the terminal.
pub fn describe(trip: &Trip, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Travel(result) => format!(
            "Estimated travel time from {} to {} ({}): {} minutes",
            trip.origin,
            trip.destination,
            trip.mode,
            result.minutes()
        ),
        Outcome::RouteFailed(err @ (ApiError::Status { .. } | ApiError::NoRoute)) => err.to_string(),
        Outcome::RouteFailed(err) => format!("Route request failed: {}", err),
        Outcome::GeocodeSkipped { address, source } => {
            format!("Could not geocode {}, skipping: {}", address, source)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reporter {
    Stdout,
    Csv(PathBuf),
}

impl Reporter {
    pub fn report(&self, trip: &Trip, outcome: &Outcome) -> Result<(), ReportError> {
        match self {
            Reporter::Stdout => {
                let mut stdout = io::stdout().lock();
                self.report_to(&mut stdout, trip, outcome)
            }
            Reporter::Csv(_) => self.report_to(&mut io::sink(), trip, outcome),
        }
    }

    pub fn report_to<W: Write>(
        &self,
        out: &mut W,
        trip: &Trip,
        outcome: &Outcome,
    ) -> Result<(), ReportError> {
        match self {
            Reporter::Stdout => {
                writeln!(out, "{}", describe(trip, outcome)).map_err(ReportError::Stdout)
            }
            Reporter::Csv(path) => {
                let minutes = match outcome {
                    Outcome::Travel(result) => Some(result.minutes()),
                    Outcome::RouteFailed(_) => None,
                    Outcome::GeocodeSkipped { .. } => {
                        log::warn!("{}", describe(trip, outcome));
                        return Ok(());
                    }
                };
                let record = LogRecord::now(minutes);
                append_record(path, &record)?;
                log::info!("Logged {} to {}", record, path.display());
                Ok(())
            }
        }
    }
}
