//! Destinations for trail entries.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use derive_more::{Display, Error};
use tracing::{debug, instrument, warn};

use crate::game::LogEntry;

/// File name of the CSV trail.
pub const LOG_FILE_NAME: &str = "logs.csv";

/// Environment variable naming the directory for [`LOG_FILE_NAME`].
pub const LOG_DIR_ENV: &str = "STRICTLY_CLOCK_LOG_DIR";

/// Header row written to a new trail file.
pub const TRAIL_HEADER: [&str; 5] = ["DateTime", "PlayerName", "Turn", "Phase", "Message"];

/// Trail write error.
#[derive(Debug, Clone, Display, Error)]
#[display("Trail error: {} at {}:{}", message, file, line)]
pub struct TrailError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TrailError {
    /// Creates a new trail error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for TrailError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<csv::Error> for TrailError {
    #[track_caller]
    fn from(err: csv::Error) -> Self {
        Self::new(format!("CSV error: {}", err))
    }
}

/// Something that durably records trail entries.
///
/// Implementations are driven from a single drain thread, one entry at a
/// time.
pub trait TrailSink: Send {
    /// Records one entry.
    fn write(&mut self, entry: &LogEntry) -> Result<(), TrailError>;
}

/// Appends entries to a CSV file.
///
/// The file is opened on the first write. A header row is written only
/// when the file is new or empty, and every row is flushed before the
/// write returns.
#[derive(Debug)]
pub struct CsvTrail {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
}

impl CsvTrail {
    /// Creates a trail writing [`LOG_FILE_NAME`] inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(LOG_FILE_NAME),
            writer: None,
        }
    }

    /// Creates a trail in the directory named by [`LOG_DIR_ENV`], or in
    /// the working directory when it is unset.
    #[instrument]
    pub fn from_env() -> Self {
        match std::env::var(LOG_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => {
                debug!(dir = %dir, "Using trail directory from environment");
                Self::new(dir)
            }
            _ => Self::new("."),
        }
    }

    /// Path of the trail file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn open(&mut self) -> Result<csv::Writer<File>, TrailError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty())
            && let Err(e) = std::fs::create_dir_all(dir)
        {
            warn!(error = %e, "Could not create trail directory, using working directory");
            self.path = PathBuf::from(LOG_FILE_NAME);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(TRAIL_HEADER)?;
            writer.flush()?;
        }
        debug!(is_new, "Opened trail file");
        Ok(writer)
    }
}

impl TrailSink for CsvTrail {
    fn write(&mut self, entry: &LogEntry) -> Result<(), TrailError> {
        if self.writer.is_none() {
            self.writer = Some(self.open()?);
        }
        let Some(writer) = self.writer.as_mut() else {
            return Err(TrailError::new("Trail file is not open"));
        };

        let turn = entry.turn().to_string();
        let result = writer
            .write_record([
                entry.formatted_date_time().as_str(),
                entry.player_name().as_str(),
                turn.as_str(),
                entry.phase().as_str(),
                entry.message().as_str(),
            ])
            .map_err(TrailError::from)
            .and_then(|()| writer.flush().map_err(TrailError::from));

        if result.is_err() {
            // Reopen on the next write.
            self.writer = None;
        }
        result
    }
}
