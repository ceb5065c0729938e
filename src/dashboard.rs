//! Refresh orchestration.
//!
//! [`Dashboard`] owns everything that lives across refresh cycles: the data
//! source, the rolling window, the series registry and the chart surface.
//! One cycle is:
//!
//! ```text
//! fetch ──▶ summarize ──▶ window.push ──▶ reconcile hosts ──▶ reconcile fleet
//! ```
//!
//! Cycles are serialized by construction. A fetch runs in the background but
//! only hands back a value; the rest of the cycle runs inside
//! [`Dashboard::tick`] on the caller's thread, and no new fetch is issued
//! while one is outstanding.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::chart::{ChartSurface, RenderTargets, TerminalCharts};
use crate::data::time::capture_label;
use crate::data::{
    summarize, AggregatePoint, AggregateSeries, DashboardSummary, ReconcileReport, RollingWindow,
    SeriesRegistry, Thresholds,
};
use crate::source::{DataSource, Decoded, Snapshot};

/// Tunables for the refresh loop.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    /// Time between fetches.
    pub refresh: Duration,
    /// Number of fleet-latency points kept for the trend chart.
    pub window_capacity: usize,
    pub thresholds: Thresholds,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            refresh: Duration::from_secs(5),
            window_capacity: crate::data::window::DEFAULT_CAPACITY,
            thresholds: Thresholds::default(),
        }
    }
}

/// What one completed cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub hosts: usize,
    /// Host entries dropped while decoding.
    pub rejected: usize,
    pub reconcile: ReconcileReport,
}

/// The refresh orchestrator.
pub struct Dashboard<S: ChartSurface = TerminalCharts> {
    source: Box<dyn DataSource>,
    options: DashboardOptions,
    surface: S,
    registry: SeriesRegistry,
    fleet: AggregateSeries,
    window: RollingWindow,
    snapshot: Snapshot,
    summary: Option<DashboardSummary>,
    last_request: Option<Instant>,
    last_updated: Option<Instant>,
    last_error: Option<String>,
    cycles: u64,
    skipped_cycles: u64,
    running: bool,
}

impl<S: ChartSurface> Dashboard<S> {
    pub fn new(source: Box<dyn DataSource>, options: DashboardOptions, surface: S) -> Self {
        let window = RollingWindow::new(options.window_capacity);
        info!(
            source = source.description(),
            refresh_ms = options.refresh.as_millis() as u64,
            window = window.capacity(),
            "dashboard started"
        );
        Self {
            source,
            options,
            surface,
            registry: SeriesRegistry::new(),
            fleet: AggregateSeries::new(),
            window,
            snapshot: Snapshot::new(),
            summary: None,
            last_request: None,
            last_updated: None,
            last_error: None,
            cycles: 0,
            skipped_cycles: 0,
            running: true,
        }
    }

    /// Drive the refresh loop. Call on every iteration of the UI loop.
    ///
    /// Issues a fetch when one is due and collects a finished one. Returns a
    /// report when a cycle ran.
    pub fn tick<T>(&mut self, now: Instant, targets: &T) -> Option<CycleReport>
    where
        T: RenderTargets + ?Sized,
    {
        if !self.running {
            return None;
        }

        self.request_if_due(now);

        match self.source.poll()? {
            Ok(decoded) => Some(self.apply_snapshot(decoded, Local::now(), now, targets)),
            Err(err) => {
                warn!(source = self.source.description(), error = %err, "fetch failed, keeping last state");
                self.last_error = Some(err.to_string());
                None
            }
        }
    }

    fn request_if_due(&mut self, now: Instant) {
        let due = self
            .last_request
            .is_none_or(|last| now.saturating_duration_since(last) >= self.options.refresh);
        if !due {
            return;
        }

        self.last_request = Some(now);
        if self.source.in_flight() {
            self.skipped_cycles += 1;
            debug!(skipped = self.skipped_cycles, "previous fetch still pending, skipping cycle");
            return;
        }
        self.source.request();
    }

    /// Fetch now instead of waiting for the period. Refused while a fetch is
    /// outstanding.
    pub fn refresh_now(&mut self, now: Instant) -> bool {
        if !self.running || self.source.in_flight() {
            return false;
        }
        self.last_request = Some(now);
        self.source.request()
    }

    /// Run the body of a cycle on a fetched snapshot.
    pub fn apply_snapshot<T>(
        &mut self,
        decoded: Decoded,
        captured_at: DateTime<Local>,
        now: Instant,
        targets: &T,
    ) -> CycleReport
    where
        T: RenderTargets + ?Sized,
    {
        let Decoded { snapshot, rejected } = decoded;

        let summary = summarize(&snapshot, &self.options.thresholds);
        self.window.push(AggregatePoint {
            label: capture_label(&captured_at),
            value: summary.avg_latency,
        });

        let mut reconcile = self.registry.reconcile(&snapshot, &mut self.surface, targets);
        reconcile.merge(self.fleet.reconcile(&self.window, &mut self.surface, targets));

        let report = CycleReport {
            hosts: snapshot.len(),
            rejected: rejected.len(),
            reconcile,
        };

        self.cycles += 1;
        debug!(
            cycle = self.cycles,
            hosts = report.hosts,
            rejected = report.rejected,
            created = report.reconcile.created.len(),
            updated = report.reconcile.updated.len(),
            destroyed = report.reconcile.destroyed.len(),
            skipped = report.reconcile.skipped.len(),
            health = ?summary.health,
            "refresh cycle complete"
        );

        self.snapshot = snapshot;
        self.summary = Some(summary);
        self.last_updated = Some(now);
        self.last_error = None;
        report
    }

    /// Re-run reconciliation on the current snapshot when a target that was
    /// missing last cycle has since been laid out. Does not touch the window.
    pub fn retry_unresolved<T>(&mut self, targets: &T) -> Option<ReconcileReport>
    where
        T: RenderTargets + ?Sized,
    {
        if !self.running {
            return None;
        }
        let hosts_pending = self.registry.has_resolvable_pending(targets);
        let fleet_pending = self.fleet.has_resolvable_pending(targets);
        if !hosts_pending && !fleet_pending {
            return None;
        }

        let mut report = ReconcileReport::default();
        if hosts_pending {
            report.merge(self.registry.reconcile(&self.snapshot, &mut self.surface, targets));
        }
        if fleet_pending {
            report.merge(self.fleet.reconcile(&self.window, &mut self.surface, targets));
        }
        debug!(created = report.created.len(), "reconciled newly laid out targets");
        Some(report)
    }

    /// Stop refreshing and release every chart. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.source.cancel();
        let hosts = self.registry.teardown(&mut self.surface);
        let fleet = self.fleet.teardown(&mut self.surface);
        info!(series = hosts + usize::from(fleet), cycles = self.cycles, "dashboard stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.summary.as_ref()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn fleet(&self) -> &AggregateSeries {
        &self.fleet
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_updated(&self) -> Option<Instant> {
        self.last_updated
    }

    pub fn in_flight(&self) -> bool {
        self.source.in_flight()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn skipped_cycles(&self) -> u64 {
        self.skipped_cycles
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }
}

impl<S: ChartSurface> Drop for Dashboard<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
