//! Spool for reports that failed to deliver.
//!
//! A failed tick must leave the computed report available for inspection
//! and manual retry instead of discarding it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Writes failed reports into a directory, one file per report.
#[derive(Debug, Clone)]
pub struct Spool {
    dir: PathBuf,
}

impl Spool {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store a report; returns the written path.
    pub fn store(
        &self,
        instrument: &str,
        at: DateTime<Utc>,
        text: &str,
    ) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let name = format!(
            "{}-{}.txt",
            instrument.to_lowercase(),
            at.format("%Y%m%dT%H%M%SZ")
        );
        let path = self.dir.join(name);
        fs::write(&path, text)?;
        Ok(path)
    }
}
