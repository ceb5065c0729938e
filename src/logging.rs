//! Tracing setup.
//!
//! The terminal belongs to the TUI, so log lines go to a file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, appending to `log_file`.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this twice is
/// harmless: the second subscriber is simply not installed.
pub fn init(log_file: &Path, default_filter: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostwatch.log");
        init(&path, "debug").unwrap();
        assert!(path.exists());

        // A second call must not fail
        init(&path, "debug").unwrap();
    }

    #[test]
    fn test_init_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("hostwatch.log");
        assert!(init(&path, "info").is_err());
    }
}
