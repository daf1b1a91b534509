//! Quarantine sinks for replies no recovery stage could decode
//!
//! Each record is the raw reply followed by a line holding only
//! [`QUARANTINE_SEPARATOR`]. A record is written as a unit so records from
//! concurrent workers never interleave.

use crate::error::ExtractorError;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use threadsift_domain::{QuarantineSink, QUARANTINE_SEPARATOR};
use tracing::debug;

fn format_record(raw: &str) -> String {
    format!("{}\n{}\n", raw, QUARANTINE_SEPARATOR)
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> io::Error {
    io::Error::other("quarantine lock poisoned")
}

/// Append-only quarantine log on disk
pub struct FileQuarantine {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileQuarantine {
    /// Open (or create) the log at `path` for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                ExtractorError::Quarantine(format!("cannot open {}: {}", path.display(), e))
            })?;

        debug!(path = %path.display(), "opened quarantine log");
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Location of the log
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&self) -> io::Result<MutexGuard<'_, BufWriter<File>>> {
        self.writer.lock().map_err(poisoned)
    }

    /// Flush and release the log
    pub fn close(self) -> Result<(), ExtractorError> {
        self.flush()
            .map_err(|e| ExtractorError::Quarantine(e.to_string()))
    }
}

impl QuarantineSink for FileQuarantine {
    fn record(&self, raw: &str) -> io::Result<()> {
        let mut writer = self.writer()?;
        writer.write_all(format_record(raw).as_bytes())?;
        writer.flush()
    }

    fn flush(&self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

/// In-memory quarantine, for tests and dry runs
#[derive(Default)]
pub struct MemoryQuarantine {
    records: Mutex<Vec<String>>,
}

impl MemoryQuarantine {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records captured so far, oldest first
    pub fn records(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Number of records captured
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether nothing has been quarantined
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The records in on-disk log format
    pub fn render(&self) -> String {
        self.records().iter().map(|r| format_record(r)).collect()
    }
}

impl QuarantineSink for MemoryQuarantine {
    fn record(&self, raw: &str) -> io::Result<()> {
        self.records.lock().map_err(poisoned)?.push(raw.to_string());
        Ok(())
    }
}
