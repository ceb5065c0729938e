//! Fleet-wide summary and health classification.
//!
//! Recomputed from scratch on every refresh; nothing here is carried over
//! between cycles.

use serde::{Deserialize, Serialize};

use crate::source::Snapshot;

/// Thresholds for fleet health classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Uptime percentage below which the fleet is degraded.
    pub degraded_uptime_pct: f64,
    /// Uptime percentage at or below which the fleet is critical.
    pub critical_uptime_pct: f64,
    /// Mean packet loss percentage above which the fleet is degraded.
    pub degraded_packet_loss_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            degraded_uptime_pct: 90.0,
            critical_uptime_pct: 50.0,
            degraded_packet_loss_pct: 10.0,
        }
    }
}

/// Three-level fleet health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Health {
    Good,
    Degraded,
    Critical,
}

impl Health {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Health::Good => "GOOD",
            Health::Degraded => "DEGRADED",
            Health::Critical => "CRITICAL",
        }
    }
}

/// Derived fleet summary.
///
/// `health` and `uptime_pct` are `None` for an empty snapshot: there is no
/// fleet to classify.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    /// Mean of per-host average latency over hosts reporting a latency > 0.
    pub avg_latency: f64,
    /// Mean of per-host packet loss over all hosts.
    pub avg_packet_loss: f64,
    /// Host with the strictly greatest average latency; empty if no hosts.
    pub worst_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_pct: Option<f64>,
}

impl DashboardSummary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Compute the fleet summary for a snapshot.
///
/// Only `up` counts as up; `down` and `unknown` both count as down. Hosts
/// reporting zero latency (unreachable, or no samples yet) are left out of
/// the latency mean but still count towards the packet loss mean.
pub fn summarize(snapshot: &Snapshot, thresholds: &Thresholds) -> DashboardSummary {
    if snapshot.is_empty() {
        return DashboardSummary::default();
    }

    let mut summary = DashboardSummary {
        total: snapshot.len(),
        ..Default::default()
    };

    let mut latency_sum = 0.0;
    let mut latency_hosts = 0usize;
    let mut loss_sum = 0.0;
    let mut worst: Option<(&str, f64)> = None;

    for (host, metrics) in snapshot {
        if metrics.status.is_up() {
            summary.up += 1;
        } else {
            summary.down += 1;
        }

        if metrics.avg_latency > 0.0 {
            latency_sum += metrics.avg_latency;
            latency_hosts += 1;
        }
        loss_sum += metrics.avg_packet_loss;

        // Strict comparison: the first host wins ties
        if worst.is_none_or(|(_, latency)| metrics.avg_latency > latency) {
            worst = Some((host, metrics.avg_latency));
        }
    }

    if latency_hosts > 0 {
        summary.avg_latency = latency_sum / latency_hosts as f64;
    }
    summary.avg_packet_loss = loss_sum / summary.total as f64;
    summary.worst_host = worst.map(|(h, _)| h.to_string()).unwrap_or_default();

    let uptime_pct = 100.0 * summary.up as f64 / summary.total as f64;
    summary.uptime_pct = Some(uptime_pct);
    summary.health = Some(classify(uptime_pct, summary.avg_packet_loss, thresholds));

    summary
}

/// Rules apply in order, later ones overriding: degraded on low uptime or
/// high loss, critical at or below the critical uptime regardless of loss.
fn classify(uptime_pct: f64, avg_packet_loss: f64, thresholds: &Thresholds) -> Health {
    let mut health = Health::Good;
    if uptime_pct < thresholds.degraded_uptime_pct
        || avg_packet_loss > thresholds.degraded_packet_loss_pct
    {
        health = Health::Degraded;
    }
    if uptime_pct <= thresholds.critical_uptime_pct {
        health = Health::Critical;
    }
    health
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{HostMetrics, HostStatus};

    fn host(status: HostStatus, latency: f64, loss: f64) -> HostMetrics {
        HostMetrics {
            status,
            avg_latency: latency,
            avg_packet_loss: loss,
            history: Vec::new(),
        }
    }

    fn snapshot(hosts: &[(&str, HostMetrics)]) -> Snapshot {
        hosts.iter().map(|(name, m)| (name.to_string(), m.clone())).collect()
    }

    #[test]
    fn test_empty_snapshot() {
        let summary = summarize(&Snapshot::new(), &Thresholds::default());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.up, 0);
        assert_eq!(summary.down, 0);
        assert_eq!(summary.avg_latency, 0.0);
        assert_eq!(summary.avg_packet_loss, 0.0);
        assert_eq!(summary.worst_host, "");
        assert!(summary.health.is_none());
        assert!(summary.uptime_pct.is_none());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_mixed_fleet() {
        let snap = snapshot(&[
            ("a.b", host(HostStatus::Up, 10.0, 0.0)),
            ("c", host(HostStatus::Down, 0.0, 100.0)),
        ]);
        let summary = summarize(&snap, &Thresholds::default());

        assert_eq!(summary.total, 2);
        assert_eq!(summary.up, 1);
        assert_eq!(summary.down, 1);
        assert_eq!(summary.avg_latency, 10.0);
        assert_eq!(summary.avg_packet_loss, 50.0);
        assert_eq!(summary.worst_host, "a.b");
        assert_eq!(summary.uptime_pct, Some(50.0));
        assert_eq!(summary.health, Some(Health::Critical));
    }

    #[test]
    fn test_low_uptime_is_critical_regardless_of_loss() {
        let snap = snapshot(&[
            ("a", host(HostStatus::Up, 5.0, 0.0)),
            ("b", host(HostStatus::Down, 0.0, 0.0)),
            ("c", host(HostStatus::Down, 0.0, 0.0)),
        ]);
        let summary = summarize(&snap, &Thresholds::default());
        assert!(summary.uptime_pct.unwrap() < 50.0);
        assert_eq!(summary.avg_packet_loss, 0.0);
        assert_eq!(summary.health, Some(Health::Critical));
    }

    #[test]
    fn test_all_up_low_loss_is_good() {
        let snap = snapshot(&[
            ("a", host(HostStatus::Up, 5.0, 1.0)),
            ("b", host(HostStatus::Up, 7.0, 2.0)),
        ]);
        let summary = summarize(&snap, &Thresholds::default());
        assert_eq!(summary.uptime_pct, Some(100.0));
        assert_eq!(summary.health, Some(Health::Good));
        assert_eq!(summary.avg_latency, 6.0);
        assert_eq!(summary.worst_host, "b");
    }

    #[test]
    fn test_high_loss_degrades_full_uptime() {
        let snap = snapshot(&[
            ("a", host(HostStatus::Up, 5.0, 30.0)),
            ("b", host(HostStatus::Up, 5.0, 0.0)),
        ]);
        let summary = summarize(&snap, &Thresholds::default());
        assert_eq!(summary.avg_packet_loss, 15.0);
        assert_eq!(summary.health, Some(Health::Degraded));
    }

    #[test]
    fn test_unknown_counts_as_down() {
        let snap = snapshot(&[
            ("a", host(HostStatus::Unknown, 0.0, 0.0)),
            ("b", host(HostStatus::Up, 3.0, 0.0)),
        ]);
        let summary = summarize(&snap, &Thresholds::default());
        assert_eq!(summary.up, 1);
        assert_eq!(summary.down, 1);
    }

    #[test]
    fn test_worst_host_first_wins_ties() {
        let snap = snapshot(&[
            ("alpha", host(HostStatus::Up, 20.0, 0.0)),
            ("beta", host(HostStatus::Up, 20.0, 0.0)),
            ("gamma", host(HostStatus::Up, 10.0, 0.0)),
        ]);
        let summary = summarize(&snap, &Thresholds::default());
        assert_eq!(summary.worst_host, "alpha");
    }

    #[test]
    fn test_all_zero_latency_fleet() {
        let snap = snapshot(&[
            ("a", host(HostStatus::Down, 0.0, 100.0)),
            ("b", host(HostStatus::Down, 0.0, 100.0)),
        ]);
        let summary = summarize(&snap, &Thresholds::default());
        assert_eq!(summary.avg_latency, 0.0);
        assert_eq!(summary.uptime_pct, Some(0.0));
        assert_eq!(summary.health, Some(Health::Critical));
        // With every latency at zero, the first host is the "worst"
        assert_eq!(summary.worst_host, "a");
    }

    #[test]
    fn test_counts_and_uptime_bounds() {
        let statuses = [HostStatus::Up, HostStatus::Down, HostStatus::Unknown];
        for n in 1..12usize {
            let hosts: Vec<(String, HostMetrics)> = (0..n)
                .map(|i| (format!("h{:02}", i), host(statuses[i % 3], i as f64, (i * 7 % 100) as f64)))
                .collect();
            let snap: Snapshot = hosts.into_iter().collect();
            let summary = summarize(&snap, &Thresholds::default());
            assert_eq!(summary.up + summary.down, summary.total);
            let uptime = summary.uptime_pct.unwrap();
            assert!((0.0..=100.0).contains(&uptime));
            if uptime < 50.0 {
                assert_eq!(summary.health, Some(Health::Critical));
            }
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = Thresholds {
            degraded_uptime_pct: 100.0,
            critical_uptime_pct: 70.0,
            degraded_packet_loss_pct: 50.0,
        };
        let snap = snapshot(&[
            ("a", host(HostStatus::Up, 5.0, 0.0)),
            ("b", host(HostStatus::Up, 5.0, 0.0)),
            ("c", host(HostStatus::Up, 5.0, 0.0)),
            ("d", host(HostStatus::Down, 0.0, 100.0)),
        ]);
        let summary = summarize(&snap, &thresholds);
        assert_eq!(summary.uptime_pct, Some(75.0));
        assert_eq!(summary.health, Some(Health::Degraded));
    }

    #[test]
    fn test_critical_threshold_is_inclusive() {
        let half = snapshot(&[
            ("a", host(HostStatus::Up, 5.0, 0.0)),
            ("b", host(HostStatus::Down, 0.0, 0.0)),
        ]);
        let summary = summarize(&half, &Thresholds::default());
        assert_eq!(summary.uptime_pct, Some(50.0));
        assert_eq!(summary.health, Some(Health::Critical));

        // Just above the threshold falls back to the degraded rule
        let two_thirds = snapshot(&[
            ("a", host(HostStatus::Up, 5.0, 0.0)),
            ("b", host(HostStatus::Up, 5.0, 0.0)),
            ("c", host(HostStatus::Down, 0.0, 0.0)),
        ]);
        let summary = summarize(&two_thirds, &Thresholds::default());
        assert_eq!(summary.health, Some(Health::Degraded));

        let thresholds = Thresholds {
            critical_uptime_pct: 75.0,
            ..Thresholds::default()
        };
        let quarter_down = snapshot(&[
            ("a", host(HostStatus::Up, 5.0, 0.0)),
            ("b", host(HostStatus::Up, 5.0, 0.0)),
            ("c", host(HostStatus::Up, 5.0, 0.0)),
            ("d", host(HostStatus::Down, 0.0, 0.0)),
        ]);
        let summary = summarize(&quarter_down, &thresholds);
        assert_eq!(summary.uptime_pct, Some(75.0));
        assert_eq!(summary.health, Some(Health::Critical));
    }

    #[test]
    fn test_empty_summary_serializes_without_health() {
        let json = serde_json::to_value(summarize(&Snapshot::new(), &Thresholds::default())).unwrap();
        assert!(json.get("health").is_none());
        assert_eq!(json["worst_host"], "");
    }
}
