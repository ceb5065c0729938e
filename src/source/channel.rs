//! Channel-based data source.
//!
//! Receives snapshots via a tokio watch channel. This is useful when the
//! dashboard is embedded in a process that already produces snapshots: the
//! producer pushes, and each refresh cycle takes the latest value.

use tokio::sync::watch;

use super::{DataSource, Decoded, FetchResult, Snapshot};
use crate::error::SourceError;

/// A data source that takes the latest snapshot pushed through a channel.
///
/// # Example
///
/// ```
/// use hostwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("in-process prober");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Snapshot>,
    description: String,
    requested: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - Where snapshots come from, for the status bar
    pub fn new(receiver: watch::Receiver<Snapshot>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            requested: false,
        }
    }

    /// Create a channel pair for sending snapshots to a ChannelSource.
    ///
    /// Returns (sender, source). The channel starts out holding an empty
    /// snapshot.
    pub fn create(source_description: &str) -> (watch::Sender<Snapshot>, Self) {
        let (tx, rx) = watch::channel(Snapshot::default());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
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

        if self.receiver.has_changed().is_err() {
            return Some(Err(SourceError::Cancelled));
        }
        let snapshot = self.receiver.borrow_and_update().clone();
        Some(Ok(Decoded {
            snapshot,
            rejected: Vec::new(),
        }))
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
