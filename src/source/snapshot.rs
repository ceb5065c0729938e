//! Wire types for metrics snapshots.
//!
//! These match the JSON served by the monitoring backend's `/metrics`
//! endpoint: an object keyed by host identifier, PascalCase field names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SourceError;

/// One fetched mapping from host identifier to its current metrics.
///
/// Ordered by host identifier so every consumer walks hosts the same way.
pub type Snapshot = BTreeMap<String, HostMetrics>;

/// Reachability reported for a host or a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Up,
    Down,
    /// Anything else, including the backend's `"unknown"` for hosts with no
    /// samples yet.
    #[serde(other)]
    Unknown,
}

impl HostStatus {
    pub fn is_up(self) -> bool {
        self == HostStatus::Up
    }

    pub fn label(self) -> &'static str {
        match self {
            HostStatus::Up => "up",
            HostStatus::Down => "down",
            HostStatus::Unknown => "unknown",
        }
    }
}

/// A single ping result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sample {
    /// Round-trip latency in milliseconds.
    #[serde(alias = "latency")]
    pub latency: f64,
    /// Packet loss percentage, 0-100.
    #[serde(alias = "packetLoss")]
    pub packet_loss: f64,
    #[serde(alias = "status")]
    pub status: HostStatus,
    /// Unix seconds.
    #[serde(alias = "timestamp")]
    pub timestamp: i64,
}

/// Current state of one host, replaced wholesale every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostMetrics {
    #[serde(alias = "status")]
    pub status: HostStatus,
    #[serde(alias = "avgLatency")]
    pub avg_latency: f64,
    #[serde(alias = "avgPacketLoss")]
    pub avg_packet_loss: f64,
    /// Chronological samples; length is bounded by the backend.
    #[serde(default, alias = "history", deserialize_with = "null_as_empty")]
    pub history: Vec<Sample>,
}

impl HostMetrics {
    fn validate(&self) -> Result<(), String> {
        if !self.avg_latency.is_finite() || !self.avg_packet_loss.is_finite() {
            return Err("non-finite averages".to_string());
        }
        if self.history.iter().any(|s| !s.latency.is_finite() || !s.packet_loss.is_finite()) {
            return Err("non-finite sample".to_string());
        }
        Ok(())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Sample>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Sample>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A decoded snapshot together with the hosts that had to be dropped.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub snapshot: Snapshot,
    /// Host identifiers whose entries were malformed.
    pub rejected: Vec<String>,
}

/// Decode a `/metrics` body.
///
/// The body must be a JSON object. Each host is decoded on its own; a
/// malformed entry is logged and dropped instead of failing the snapshot.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Decoded, SourceError> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_slice(bytes)?;

    let mut decoded = Decoded::default();
    for (host, value) in raw {
        let parsed = serde_json::from_value::<HostMetrics>(value)
            .map_err(|e| e.to_string())
            .and_then(|m| m.validate().map(|_| m));
        match parsed {
            Ok(metrics) => {
                decoded.snapshot.insert(host, metrics);
            }
            Err(error) => {
                warn!(host = %host, error = %error, "dropping malformed host entry");
                decoded.rejected.push(host);
            }
        }
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_backend_format() {
        let json = r#"{
            "8.8.8.8": {
                "Status": "up",
                "AvgLatency": 12.5,
                "AvgPacketLoss": 0,
                "History": [
                    {"Latency": 12, "PacketLoss": 0, "Status": "up", "Timestamp": 1700000000},
                    {"Latency": 13, "PacketLoss": 0, "Status": "up", "Timestamp": 1700000005}
                ]
            }
        }"#;

        let decoded = decode_snapshot(json.as_bytes()).unwrap();
        assert!(decoded.rejected.is_empty());

        let host = decoded.snapshot.get("8.8.8.8").unwrap();
        assert_eq!(host.status, HostStatus::Up);
        assert_eq!(host.avg_latency, 12.5);
        assert_eq!(host.history.len(), 2);
        assert_eq!(host.history[1].timestamp, 1_700_000_005);
    }

    #[test]
    fn test_decode_camel_case_and_null_history() {
        let json = r#"{"h": {"Status": "down", "avgLatency": 0, "avgPacketLoss": 100, "History": null}}"#;
        let decoded = decode_snapshot(json.as_bytes()).unwrap();
        let host = decoded.snapshot.get("h").unwrap();
        assert_eq!(host.status, HostStatus::Down);
        assert_eq!(host.avg_packet_loss, 100.0);
        assert!(host.history.is_empty());
    }

    #[test]
    fn test_decode_all_camel_case_body() {
        let json = r#"{"a.b": {
            "status": "up", "avgLatency": 10, "avgPacketLoss": 0,
            "history": [{"latency": 10, "packetLoss": 0, "status": "up", "timestamp": 1700000000}]
        }}"#;
        let decoded = decode_snapshot(json.as_bytes()).unwrap();
        assert!(decoded.rejected.is_empty());
        assert_eq!(decoded.snapshot.len(), 1);

        let host = decoded.snapshot.get("a.b").unwrap();
        assert_eq!(host.status, HostStatus::Up);
        assert_eq!(host.avg_latency, 10.0);
        assert_eq!(host.history.len(), 1);
        assert_eq!(host.history[0].latency, 10.0);
        assert_eq!(host.history[0].status, HostStatus::Up);
        assert_eq!(host.history[0].timestamp, 1_700_000_000);
    }

    #[test]
    fn test_unknown_status_string() {
        let json = r#"{"h": {"Status": "unknown", "AvgLatency": 0, "AvgPacketLoss": 0}}"#;
        let decoded = decode_snapshot(json.as_bytes()).unwrap();
        assert_eq!(decoded.snapshot["h"].status, HostStatus::Unknown);
        assert!(!decoded.snapshot["h"].status.is_up());
    }

    #[test]
    fn test_malformed_host_is_dropped() {
        let json = r#"{
            "good": {"Status": "up", "AvgLatency": 3, "AvgPacketLoss": 0, "History": []},
            "missing": {"Status": "up", "AvgPacketLoss": 0},
            "text": {"Status": "up", "AvgLatency": "fast", "AvgPacketLoss": 0}
        }"#;

        let decoded = decode_snapshot(json.as_bytes()).unwrap();
        assert_eq!(decoded.snapshot.len(), 1);
        assert!(decoded.snapshot.contains_key("good"));
        assert_eq!(decoded.rejected, vec!["missing".to_string(), "text".to_string()]);
    }

    #[test]
    fn test_non_object_body_is_an_error() {
        assert!(decode_snapshot(b"[1, 2, 3]").is_err());
        assert!(decode_snapshot(b"not json").is_err());
    }

    #[test]
    fn test_empty_object() {
        let decoded = decode_snapshot(b"{}").unwrap();
        assert!(decoded.snapshot.is_empty());
    }
}
