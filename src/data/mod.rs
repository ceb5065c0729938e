//! Metrics aggregation and chart-state synchronization.
//!
//! This module turns a raw snapshot into everything the dashboard shows.
//!
//! ## Submodules
//!
//! - [`sanitize`]: Host identifier → render-target key mapping
//! - [`summary`]: Fleet counts, averages, worst host and health ([`DashboardSummary`])
//! - [`window`]: Rolling fleet-latency window for the trend chart ([`RollingWindow`])
//! - [`reconcile`]: Create/update/destroy decisions for chart series ([`SeriesRegistry`])
//! - [`time`]: Duration parsing and time-of-day labels
//! - [`export`]: JSON export of the current state
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot
//!    │
//!    ├──▶ summarize() ──▶ DashboardSummary
//!    │                          │
//!    │                          ▼
//!    │               RollingWindow::push(avg_latency)
//!    │                          │
//!    ├──▶ SeriesRegistry::reconcile()   AggregateSeries::reconcile()
//!    │                          │
//!    ▼                          ▼
//!            ChartSurface (create / update_in_place / destroy)
//! ```

pub mod export;
pub mod reconcile;
pub mod sanitize;
pub mod summary;
pub mod time;
pub mod window;

pub use reconcile::{
    AggregateSeries, ReconcileReport, RenderInstruction, SeriesRegistry, SeriesState, FLEET_TARGET,
};
pub use sanitize::{sanitize, TargetKey, TargetKeys};
pub use summary::{summarize, DashboardSummary, Health, Thresholds};
pub use window::{AggregatePoint, RollingWindow};
