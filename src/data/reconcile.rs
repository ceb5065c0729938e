//! Create-or-update reconciliation of chart series.
//!
//! Each refresh the reconciler compares the snapshot against the series it
//! already owns and decides, per host, whether a chart has to be created,
//! updated in place, or destroyed. Updating in place keeps redraws cheap and
//! stops charts from flickering on every refresh.
//!
//! ```text
//! Snapshot ──plan()──▶ [Destroy.., Create|Update..] ──apply()──▶ ChartSurface
//!                                                        │
//!                                               RenderTargets::resolve
//! ```
//!
//! The registry is the only owner of chart handles. Callers see instructions
//! and reports, never handles.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::sanitize::{TargetKey, TargetKeys};
use super::time::clock_label;
use super::window::RollingWindow;
use crate::chart::{ChartHandle, ChartSurface, RedrawMode, RenderTargets, SeriesConfig};
use crate::source::{HostMetrics, Snapshot};

/// Name of the fleet aggregate chart's target.
pub const FLEET_TARGET: &str = "fleet-latency";

/// One step of reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderInstruction {
    /// Create a series on the target for `key`.
    Create {
        key: TargetKey,
        host: String,
        labels: Vec<String>,
        values: Vec<f64>,
        config: SeriesConfig,
    },
    /// Replace the data of the series owned under `key`.
    Update {
        key: TargetKey,
        labels: Vec<String>,
        values: Vec<f64>,
        mode: RedrawMode,
    },
    /// Release the series owned under `key`.
    Destroy { key: TargetKey },
}

impl RenderInstruction {
    pub fn key(&self) -> &TargetKey {
        match self {
            RenderInstruction::Create { key, .. }
            | RenderInstruction::Update { key, .. }
            | RenderInstruction::Destroy { key } => key,
        }
    }
}

/// What one reconciliation did, by target key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub created: Vec<TargetKey>,
    pub updated: Vec<TargetKey>,
    pub destroyed: Vec<TargetKey>,
    /// Targets that could not be resolved; retried next cycle.
    pub skipped: Vec<TargetKey>,
}

impl ReconcileReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: ReconcileReport) {
        self.created.extend(other.created);
        self.updated.extend(other.updated);
        self.destroyed.extend(other.destroyed);
        self.skipped.extend(other.skipped);
    }
}

/// Ownership record binding a host to its drawn series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesState {
    pub host: String,
    handle: ChartHandle,
}

/// Project a host's history into aligned display labels and latency values.
pub fn project_history(metrics: &HostMetrics) -> (Vec<String>, Vec<f64>) {
    metrics.history.iter().map(|s| (clock_label(s.timestamp), s.latency)).unzip()
}

/// Per-host series registry.
///
/// Holds at most one series per target key. Hosts missing from a snapshot
/// have their series destroyed and their key released.
#[derive(Debug)]
pub struct SeriesRegistry {
    keys: TargetKeys,
    series: BTreeMap<TargetKey, SeriesState>,
    unresolved: BTreeSet<TargetKey>,
}

impl Default for SeriesRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self {
            keys: TargetKeys::with_reserved([TargetKey::fixed(FLEET_TARGET)]),
            series: BTreeMap::new(),
            unresolved: BTreeSet::new(),
        }
    }

    /// Decide what to do for each host.
    ///
    /// Destroys come first so a key released by a vanished host can be
    /// reused by a new one in the same cycle.
    pub fn plan(&mut self, snapshot: &Snapshot) -> Vec<RenderInstruction> {
        let mut instructions = Vec::new();

        let vanished: Vec<TargetKey> = self
            .series
            .iter()
            .filter(|(_, state)| !snapshot.contains_key(&state.host))
            .map(|(key, _)| key.clone())
            .collect();
        for key in vanished {
            instructions.push(RenderInstruction::Destroy { key });
        }
        self.keys.retain(|host| snapshot.contains_key(host));

        for (host, metrics) in snapshot {
            let key = self.keys.assign(host);
            let (labels, values) = project_history(metrics);

            let owned = self.series.get(&key).is_some_and(|s| &s.host == host);
            if owned {
                instructions.push(RenderInstruction::Update {
                    key,
                    labels,
                    values,
                    mode: RedrawMode::Immediate,
                });
            } else {
                instructions.push(RenderInstruction::Create {
                    key,
                    host: host.clone(),
                    labels,
                    values,
                    config: SeriesConfig::host(host),
                });
            }
        }

        instructions
    }

    /// Carry out instructions against a surface.
    ///
    /// A host whose target does not resolve is skipped and its state left
    /// as it was.
    pub fn apply<S, T>(
        &mut self,
        instructions: Vec<RenderInstruction>,
        surface: &mut S,
        targets: &T,
    ) -> ReconcileReport
    where
        S: ChartSurface + ?Sized,
        T: RenderTargets + ?Sized,
    {
        let mut report = ReconcileReport::default();
        self.unresolved.clear();

        for instruction in instructions {
            match instruction {
                RenderInstruction::Destroy { key } => {
                    if let Some(state) = self.series.remove(&key) {
                        surface.destroy(state.handle);
                        debug!(host = %state.host, target = %key, "series destroyed");
                        report.destroyed.push(key);
                    }
                }
                RenderInstruction::Create {
                    key,
                    host,
                    labels,
                    values,
                    config,
                } => {
                    let Some(target) = targets.resolve(&key) else {
                        self.unresolved.insert(key.clone());
                        report.skipped.push(key);
                        continue;
                    };
                    // A stale series under this key belongs to another host
                    if let Some(stale) = self.series.remove(&key) {
                        surface.destroy(stale.handle);
                    }
                    let handle = surface.create(&target, &labels, &values, &config);
                    debug!(host = %host, target = %key, "series created");
                    self.series.insert(key.clone(), SeriesState { host, handle });
                    report.created.push(key);
                }
                RenderInstruction::Update {
                    key,
                    labels,
                    values,
                    mode,
                } => {
                    let Some(state) = self.series.get(&key) else {
                        continue;
                    };
                    if targets.resolve(&key).is_none() {
                        self.unresolved.insert(key.clone());
                        report.skipped.push(key);
                        continue;
                    }
                    surface.update_in_place(state.handle, &labels, &values, mode);
                    report.updated.push(key);
                }
            }
        }

        if !self.unresolved.is_empty() {
            debug!(hosts = ?self.waiting_hosts(), "no panel laid out yet, deferring");
        }
        report
    }

    /// Hosts whose create or update was skipped for lack of a target.
    pub fn waiting_hosts(&self) -> Vec<&str> {
        self.unresolved
            .iter()
            .filter_map(|key| self.keys.host_for(key))
            .collect()
    }

    /// Plan and apply in one step.
    pub fn reconcile<S, T>(
        &mut self,
        snapshot: &Snapshot,
        surface: &mut S,
        targets: &T,
    ) -> ReconcileReport
    where
        S: ChartSurface + ?Sized,
        T: RenderTargets + ?Sized,
    {
        let instructions = self.plan(snapshot);
        self.apply(instructions, surface, targets)
    }

    /// Whether any target skipped last time now resolves.
    pub fn has_resolvable_pending<T>(&self, targets: &T) -> bool
    where
        T: RenderTargets + ?Sized,
    {
        self.unresolved.iter().any(|key| targets.resolve(key).is_some())
    }

    /// Destroy every series and forget every host.
    pub fn teardown<S>(&mut self, surface: &mut S) -> usize
    where
        S: ChartSurface + ?Sized,
    {
        let count = self.series.len();
        for (_, state) in std::mem::take(&mut self.series) {
            surface.destroy(state.handle);
        }
        self.keys.clear();
        self.unresolved.clear();
        count
    }

    /// Key assigned to `host` in the current cycle.
    pub fn key_for(&self, host: &str) -> Option<&TargetKey> {
        self.keys.key_for(host)
    }

    /// Whether `host` currently owns a series.
    pub fn contains(&self, host: &str) -> bool {
        self.key_for(host)
            .and_then(|key| self.series.get(key))
            .is_some_and(|state| state.host == host)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// The single fleet-wide series bound to the rolling window.
#[derive(Debug)]
pub struct AggregateSeries {
    key: TargetKey,
    handle: Option<ChartHandle>,
    pending: bool,
}

impl Default for AggregateSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateSeries {
    pub fn new() -> Self {
        Self {
            key: TargetKey::fixed(FLEET_TARGET),
            handle: None,
            pending: false,
        }
    }

    pub fn key(&self) -> &TargetKey {
        &self.key
    }

    pub fn is_created(&self) -> bool {
        self.handle.is_some()
    }

    pub fn plan(&self, window: &RollingWindow) -> RenderInstruction {
        let labels = window.labels();
        let values = window.values();
        if self.handle.is_some() {
            RenderInstruction::Update {
                key: self.key.clone(),
                labels,
                values,
                mode: RedrawMode::Immediate,
            }
        } else {
            RenderInstruction::Create {
                key: self.key.clone(),
                host: String::new(),
                labels,
                values,
                config: SeriesConfig::fleet(),
            }
        }
    }

    pub fn reconcile<S, T>(
        &mut self,
        window: &RollingWindow,
        surface: &mut S,
        targets: &T,
    ) -> ReconcileReport
    where
        S: ChartSurface + ?Sized,
        T: RenderTargets + ?Sized,
    {
        let mut report = ReconcileReport::default();
        self.pending = false;

        let Some(target) = targets.resolve(&self.key) else {
            self.pending = true;
            report.skipped.push(self.key.clone());
            return report;
        };

        match self.plan(window) {
            RenderInstruction::Update {
                labels,
                values,
                mode,
                ..
            } => {
                if let Some(handle) = self.handle {
                    surface.update_in_place(handle, &labels, &values, mode);
                    report.updated.push(self.key.clone());
                }
            }
            RenderInstruction::Create {
                labels,
                values,
                config,
                ..
            } => {
                self.handle = Some(surface.create(&target, &labels, &values, &config));
                report.created.push(self.key.clone());
            }
            RenderInstruction::Destroy { .. } => {}
        }
        report
    }

    pub fn has_resolvable_pending<T>(&self, targets: &T) -> bool
    where
        T: RenderTargets + ?Sized,
    {
        self.pending && targets.resolve(&self.key).is_some()
    }

    pub fn teardown<S>(&mut self, surface: &mut S) -> bool
    where
        S: ChartSurface + ?Sized,
    {
        self.pending = false;
        match self.handle.take() {
            Some(handle) => {
                surface.destroy(handle);
                true
            }
            None => false,
        }
    }
}
