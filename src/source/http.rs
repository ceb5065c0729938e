//! HTTP data source.
//!
//! Fetches snapshots from the monitoring backend's `/metrics` endpoint on a
//! background tokio task.

use std::time::Duration;

use reqwest::Client;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{decode_snapshot, DataSource, FetchResult};
use crate::error::SourceError;

/// A data source that GETs a snapshot URL.
///
/// Each [`request`](DataSource::request) spawns one fetch on the given
/// runtime. The outcome is handed back through a oneshot channel so the
/// caller's thread never blocks.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use hostwatch::{DataSource, HttpSource};
///
/// # tokio_test::block_on(async {
/// let runtime = tokio::runtime::Handle::current();
/// let source = HttpSource::new("http://127.0.0.1:8081/metrics", Duration::from_secs(4), runtime)
///     .unwrap();
/// assert_eq!(source.description(), "http: http://127.0.0.1:8081/metrics");
/// assert!(!source.in_flight());
/// # });
/// ```
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    url: String,
    runtime: Handle,
    description: String,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    receiver: oneshot::Receiver<FetchResult>,
    task: JoinHandle<()>,
}

impl HttpSource {
    /// Create a source for `url` with a per-request `timeout`.
    pub fn new(url: &str, timeout: Duration, runtime: Handle) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("hostwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            runtime,
            description: format!("http: {}", url),
            pending: None,
        })
    }
}

async fn fetch(client: Client, url: String) -> FetchResult {
    let response = client.get(&url).send().await?.error_for_status()?;
    let body = response.bytes().await?;
    decode_snapshot(&body)
}

impl DataSource for HttpSource {
    fn request(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }

        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        let url = self.url.clone();
        let task = self.runtime.spawn(async move {
            let result = fetch(client, url).await;
            // Receiver gone means the dashboard was torn down
            let _ = tx.send(result);
        });

        debug!(url = %self.url, "fetch started");
        self.pending = Some(Pending { receiver: rx, task });
        true
    }

    fn poll(&mut self) -> Option<FetchResult> {
        let pending = self.pending.as_mut()?;
        let outcome = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(SourceError::Cancelled),
        };
        self.pending = None;
        Some(outcome)
    }

    fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
            debug!(url = %self.url, "outstanding fetch cancelled");
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.cancel();
    }
}
