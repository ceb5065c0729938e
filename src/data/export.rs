//! JSON export of the current dashboard state.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::summary::DashboardSummary;
use super::window::{AggregatePoint, RollingWindow};
use crate::source::{HostStatus, Snapshot};

#[derive(Debug, Serialize)]
struct ExportedHost<'a> {
    host: &'a str,
    status: HostStatus,
    avg_latency: f64,
    avg_packet_loss: f64,
    samples: usize,
    last_latency: Option<f64>,
}

#[derive(Debug, Serialize)]
struct Export<'a> {
    summary: &'a DashboardSummary,
    hosts: Vec<ExportedHost<'a>>,
    trend: Vec<&'a AggregatePoint>,
}

/// Render summary, hosts and the rolling trend as pretty JSON.
pub fn export_json(
    summary: &DashboardSummary,
    snapshot: &Snapshot,
    window: &RollingWindow,
) -> Result<String> {
    let hosts = snapshot
        .iter()
        .map(|(host, m)| ExportedHost {
            host,
            status: m.status,
            avg_latency: m.avg_latency,
            avg_packet_loss: m.avg_packet_loss,
            samples: m.history.len(),
            last_latency: m.history.last().map(|s| s.latency),
        })
        .collect();

    let export = Export {
        summary,
        hosts,
        trend: window.iter().collect(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Write [`export_json`] output to `path`.
pub fn export_to_file(
    path: &Path,
    summary: &DashboardSummary,
    snapshot: &Snapshot,
    window: &RollingWindow,
) -> Result<()> {
    let json = export_json(summary, snapshot, window)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::summary::{summarize, Thresholds};
    use crate::source::HostMetrics;

    fn snapshot() -> Snapshot {
        let mut snap = Snapshot::new();
        snap.insert(
            "a".to_string(),
            HostMetrics {
                status: HostStatus::Up,
                avg_latency: 12.0,
                avg_packet_loss: 0.0,
                history: Vec::new(),
            },
        );
        snap
    }

    #[test]
    fn test_export_json_shape() {
        let snap = snapshot();
        let summary = summarize(&snap, &Thresholds::default());
        let mut window = RollingWindow::default();
        window.push(AggregatePoint {
            label: "10:00:00".to_string(),
            value: 12.0,
        });

        let json = export_json(&summary, &snap, &window).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["health"], "Good");
        assert_eq!(value["hosts"][0]["host"], "a");
        assert_eq!(value["hosts"][0]["status"], "up");
        assert!(value["hosts"][0]["last_latency"].is_null());
        assert_eq!(value["trend"][0]["label"], "10:00:00");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let snap = snapshot();
        let summary = summarize(&snap, &Thresholds::default());

        export_to_file(&path, &summary, &snap, &RollingWindow::default()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"worst_host\": \"a\""));
    }
}
