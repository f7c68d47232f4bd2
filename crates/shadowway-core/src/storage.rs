use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::time::format_time;

/// Text written to the store when no valid time exists yet.
pub const UNSET_RECORD: &str = "inf";

/// Errors from reading or writing a best-time record.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "best-time store I/O error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Persistence for the best full-run completion time.
pub trait BestTimeStore: Send {
    /// Read the stored record. Missing, corrupt, or non-positive records
    /// read as `None`; they are never an error. A file store rewrites them
    /// to the unset form.
    fn load_best_time(&mut self) -> Option<f64>;

    /// Persist a new record.
    fn save_best_time(&mut self, secs: f64) -> Result<(), StorageError>;
}

/// Interpret the text of a record. Returns `None` for anything that is not
/// a finite, strictly positive number.
pub fn parse_record(text: &str) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Best time kept in a single text file holding a float (or `inf`).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_unset(&self) {
        if let Err(e) = fs::write(&self.path, UNSET_RECORD) {
            warn!(path = %self.path.display(), error = %e, "Could not reset best-time file");
        }
    }
}

impl BestTimeStore for FileStore {
    fn load_best_time(&mut self) -> Option<f64> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Creating best-time file");
                self.write_unset();
                return None;
            },
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!(path = %self.path.display(), "Best-time file is not text, resetting");
                self.write_unset();
                return None;
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read best-time file");
                return None;
            },
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            warn!(path = %self.path.display(), "Best-time file empty, resetting");
            self.write_unset();
            return None;
        }

        let best = parse_record(trimmed);
        if best.is_none() && trimmed != UNSET_RECORD {
            match trimmed.parse::<f64>() {
                Ok(value) => warn!(value, "Stored best time is not positive, resetting"),
                Err(_) => warn!(content = trimmed, "Invalid best-time record, resetting"),
            }
            self.write_unset();
        }
        debug!(best = %format_time(best), "Loaded best time");
        best
    }

    fn save_best_time(&mut self, secs: f64) -> Result<(), StorageError> {
        if !secs.is_finite() {
            debug!("Skipping save: best time is unset");
            return Ok(());
        }
        fs::write(&self.path, secs.to_string()).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Could not save best time");
            StorageError::Io(e)
        })?;
        info!(best = %format_time(Some(secs)), "Saved new best time");
        Ok(())
    }
}
