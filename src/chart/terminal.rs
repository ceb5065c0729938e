//! Terminal chart surface.
//!
//! Holds the datasets the UI draws with ratatui's `Chart` widget, and the
//! per-frame registry of laid-out chart panels.

use std::collections::{BTreeMap, HashMap};

use ratatui::layout::Rect;

use super::{
    ChartHandle, ChartSurface, RedrawMode, RenderTarget, RenderTargets, SeriesConfig, TargetKey,
};

/// Data for one drawn series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub target: TargetKey,
    pub config: SeriesConfig,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Number of in-place updates since creation.
    pub revision: u64,
    pub last_mode: Option<RedrawMode>,
}

impl ChartData {
    /// `(x, y)` points for a ratatui dataset, x being the sample index.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect()
    }

    /// Y-axis bounds with a little headroom.
    pub fn y_bounds(&self) -> [f64; 2] {
        let max = self.values.iter().copied().fold(0.0_f64, f64::max);
        let min = if self.config.begin_at_zero {
            0.0
        } else {
            self.values.iter().copied().fold(f64::INFINITY, f64::min).min(max)
        };
        let top = if max <= min { min + 1.0 } else { max * 1.1 };
        [min, top]
    }
}

/// In-memory chart surface backing the TUI.
///
/// Charts are bound to the target they were created on; the UI looks them up
/// by target key while drawing.
#[derive(Debug, Default)]
pub struct TerminalCharts {
    charts: BTreeMap<ChartHandle, ChartData>,
    by_target: HashMap<TargetKey, ChartHandle>,
    next_handle: u64,
}

impl TerminalCharts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chart bound to `key`, if one exists.
    pub fn chart_for(&self, key: &TargetKey) -> Option<&ChartData> {
        self.by_target.get(key).and_then(|h| self.charts.get(h))
    }

    /// Number of live charts.
    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

impl ChartSurface for TerminalCharts {
    fn create(
        &mut self,
        target: &RenderTarget,
        labels: &[String],
        values: &[f64],
        config: &SeriesConfig,
    ) -> ChartHandle {
        let handle = ChartHandle(self.next_handle);
        self.next_handle += 1;

        // A target shows one chart; a stale binding is replaced
        if let Some(previous) = self.by_target.insert(target.key.clone(), handle) {
            self.charts.remove(&previous);
        }

        self.charts.insert(
            handle,
            ChartData {
                target: target.key.clone(),
                config: config.clone(),
                labels: labels.to_vec(),
                values: values.to_vec(),
                revision: 0,
                last_mode: None,
            },
        );
        handle
    }

    fn update_in_place(
        &mut self,
        handle: ChartHandle,
        labels: &[String],
        values: &[f64],
        mode: RedrawMode,
    ) {
        if let Some(chart) = self.charts.get_mut(&handle) {
            chart.labels.clear();
            chart.labels.extend_from_slice(labels);
            chart.values.clear();
            chart.values.extend_from_slice(values);
            chart.revision += 1;
            chart.last_mode = Some(mode);
        }
    }

    fn destroy(&mut self, handle: ChartHandle) {
        if let Some(chart) = self.charts.remove(&handle) {
            if self.by_target.get(&chart.target) == Some(&handle) {
                self.by_target.remove(&chart.target);
            }
        }
    }
}

/// Chart panels laid out in the most recent frame.
///
/// Cleared at the start of every draw and refilled by the views, so a host
/// that scrolled off the page no longer resolves.
#[derive(Debug, Clone, Default)]
pub struct ViewTargets {
    areas: HashMap<TargetKey, Rect>,
}

impl ViewTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.areas.clear();
    }

    /// Record that a panel for `key` was laid out at `area`.
    pub fn register(&mut self, key: TargetKey, area: Rect) {
        self.areas.insert(key, area);
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl RenderTargets for ViewTargets {
    fn resolve(&self, key: &TargetKey) -> Option<RenderTarget> {
        self.areas.get(key).map(|area| RenderTarget {
            key: key.clone(),
            area: *area,
        })
    }
}
