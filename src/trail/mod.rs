//! CSV action trail.

mod logger;
mod sink;

pub use logger::{AsyncLogger, Submission, TRAIL_CAPACITY};
pub use sink::{CsvTrail, LOG_DIR_ENV, LOG_FILE_NAME, TRAIL_HEADER, TrailError, TrailSink};
