//! File-based data source.
//!
//! Reads a snapshot from a JSON file on every request. Useful for replaying a
//! captured `/metrics` body or for driving the dashboard from a script.

use std::fs;
use std::path::{Path, PathBuf};

use super::{decode_snapshot, DataSource, FetchResult};

/// A data source that reads a snapshot from a JSON file.
///
/// The file is read synchronously when polled, so the outcome is always
/// available on the first poll after a request.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    requested: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            requested: false,
        }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> FetchResult {
        let content = fs::read(&self.path)?;
        decode_snapshot(&content)
    }
}

impl DataSource for FileSource {
    fn request(&mut self) -> bool {
        if self.requested {
            return false;
        }
        self.requested = true;
        true
    }

    fn poll(&mut self) -> Option<FetchResult> {
        if !self.requested {
            return None;
        }
        self.requested = false;
        Some(self.read_file())
    }

    fn in_flight(&self) -> bool {
        self.requested
    }

    fn cancel(&mut self) {
        self.requested = false;
    }

    fn description(&self) -> &str {
        &self.description
    }
}
