//! Data source abstraction for receiving metrics snapshots.
//!
//! A refresh cycle asks its source for a fresh snapshot with
//! [`DataSource::request`] and then polls until the fetch completes. Sources
//! never run more than one fetch at a time.

mod channel;
mod file;
mod http;
mod snapshot;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use http::HttpSource;
pub use snapshot::{decode_snapshot, Decoded, HostMetrics, HostStatus, Sample, Snapshot};

use std::fmt::Debug;

use crate::error::SourceError;

/// Result of one completed fetch.
pub type FetchResult = Result<Decoded, SourceError>;

/// Trait for obtaining metrics snapshots from various backends.
///
/// # Example
///
/// ```
/// use hostwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("metrics.json");
/// if source.request() {
///     if let Some(Ok(decoded)) = source.poll() {
///         println!("Got {} hosts", decoded.snapshot.len());
///     }
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Start fetching a fresh snapshot.
    ///
    /// Returns `false` without doing anything when a fetch is already
    /// outstanding.
    fn request(&mut self) -> bool;

    /// Collect the outcome of the outstanding fetch.
    ///
    /// Returns `None` while the fetch is still running or when nothing was
    /// requested. Non-blocking.
    fn poll(&mut self) -> Option<FetchResult>;

    /// Whether a fetch is outstanding.
    fn in_flight(&self) -> bool;

    /// Drop any outstanding fetch.
    fn cancel(&mut self) {}

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
