//! Error types for fetching snapshots.

use thiserror::Error;

/// Errors that can occur while obtaining a metrics snapshot.
///
/// None of these are fatal: the dashboard logs them and keeps showing the
/// last good state.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status.
    #[error("Endpoint returned status {0}")]
    Status(u16),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Reading a local snapshot failed.
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    /// The body was not a JSON object of hosts.
    #[error("Parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The fetch was dropped before it completed.
    #[error("Fetch cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Status(status.as_u16())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}
