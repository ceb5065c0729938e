//! Render contract between the reconciler and whatever draws the charts.
//!
//! The reconciler decides *what* to draw; a [`ChartSurface`] owns the drawn
//! series and a [`RenderTargets`] implementation says where they can go.

pub mod terminal;

pub use crate::data::sanitize::TargetKey;
pub use terminal::{ChartData, TerminalCharts, ViewTargets};

use ratatui::layout::Rect;

/// Opaque handle to a series living on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartHandle(pub(crate) u64);

impl ChartHandle {
    /// Wrap a surface-specific identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// How an in-place update should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedrawMode {
    /// Transition from the previous values.
    Animated,
    /// Replace without transition. Refreshes are too frequent to animate.
    #[default]
    Immediate,
}

/// Which kind of series a chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Latency history of a single host.
    Host,
    /// Fleet-average latency over recent refreshes.
    Fleet,
}

/// Presentation settings fixed at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesConfig {
    pub kind: SeriesKind,
    pub title: String,
    pub dataset_label: String,
    pub show_legend: bool,
    pub begin_at_zero: bool,
}

impl SeriesConfig {
    /// Per-host latency chart.
    pub fn host(host: &str) -> Self {
        Self {
            kind: SeriesKind::Host,
            title: host.to_string(),
            dataset_label: "Latency (ms)".to_string(),
            show_legend: true,
            begin_at_zero: true,
        }
    }

    /// Fleet aggregate chart; legend hidden.
    pub fn fleet() -> Self {
        Self {
            kind: SeriesKind::Fleet,
            title: "Fleet average latency".to_string(),
            dataset_label: "Avg latency (ms)".to_string(),
            show_legend: false,
            begin_at_zero: true,
        }
    }
}

/// A resolved place to draw a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub key: TargetKey,
    pub area: Rect,
}

/// Resolves target keys to places in the current view.
pub trait RenderTargets {
    /// Returns `None` when the view has not laid out a target for `key`.
    fn resolve(&self, key: &TargetKey) -> Option<RenderTarget>;
}

/// Something that draws series and owns their resources.
pub trait ChartSurface {
    /// Create a series on `target` and return its handle.
    fn create(
        &mut self,
        target: &RenderTarget,
        labels: &[String],
        values: &[f64],
        config: &SeriesConfig,
    ) -> ChartHandle;

    /// Replace the data of an existing series.
    fn update_in_place(
        &mut self,
        handle: ChartHandle,
        labels: &[String],
        values: &[f64],
        mode: RedrawMode,
    );

    /// Release a series and its target binding.
    fn destroy(&mut self, handle: ChartHandle);
}

/// Targets that resolve nothing. Every create is deferred.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTargets;

impl RenderTargets for NoTargets {
    fn resolve(&self, _key: &TargetKey) -> Option<RenderTarget> {
        None
    }
}
