//! # hostwatch
//!
//! A terminal dashboard and library for watching the network health of a
//! fleet of hosts.
//!
//! A monitoring backend probes every host and serves the results as a JSON
//! snapshot. hostwatch polls that snapshot, derives a fleet summary and a
//! three-level health classification, keeps a rolling trend of fleet
//! latency, and keeps one latency chart per host in sync with the fleet as
//! hosts come and go.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Application                            │
//! │  ┌─────────┐    ┌───────────┐    ┌──────────┐    ┌────────────┐ │
//! │  │  app    │───▶│ dashboard │───▶│  chart   │───▶│    ui      │ │
//! │  │ (state) │    │  (cycle)  │    │(surface) │    │(rendering) │ │
//! │  └─────────┘    └─────┬─────┘    └──────────┘    └────────────┘ │
//! │                       │                                          │
//! │          ┌────────────┴───────────┐                              │
//! │          ▼                        ▼                              │
//! │     ┌─────────┐             ┌──────────┐                         │
//! │     │ source  │             │   data   │                         │
//! │     │ (input) │             │(summary, │                         │
//! │     └─────────┘             │ window,  │                         │
//! │   Http | File | Channel     │reconcile)│                         │
//! │                             └──────────┘                         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait), the
//!   snapshot wire types and the HTTP, file and channel implementations
//! - **[`data`]**: Summary and health classification, the rolling window, the
//!   host to render-target mapping and chart reconciliation
//! - **[`chart`]**: The render contract ([`ChartSurface`], [`RenderTargets`])
//!   and the in-memory surface drawn by the TUI
//! - **[`dashboard`]**: The refresh orchestrator tying the above together
//! - **[`app`]**, **[`events`]**, **[`ui`]**: Terminal application state, key
//!   handling and rendering
//! - **[`config`]**, **[`logging`]**, **[`error`]**: Settings, tracing setup
//!   and fetch errors
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll the monitoring backend
//! hostwatch --url http://monitor:8081/metrics
//!
//! # Replay a saved snapshot
//! hostwatch --file metrics.json
//!
//! # Fetch once and write summary and hosts as JSON
//! hostwatch --export fleet.json
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use std::time::Instant;
//! use hostwatch::chart::NoTargets;
//! use hostwatch::{ChannelSource, Dashboard, DashboardOptions, TerminalCharts};
//!
//! let (tx, source) = ChannelSource::create("in-process prober");
//! let mut dashboard = Dashboard::new(
//!     Box::new(source),
//!     DashboardOptions::default(),
//!     TerminalCharts::new(),
//! );
//!
//! dashboard.tick(Instant::now(), &NoTargets);
//! assert!(dashboard.summary().is_some());
//! # drop(tx);
//! ```
//!
//! ### Summarizing a snapshot
//!
//! ```
//! use hostwatch::{decode_snapshot, summarize, Health, Thresholds};
//!
//! let body = br#"{
//!     "web-1": {"Status": "up", "AvgLatency": 12.5, "AvgPacketLoss": 0},
//!     "web-2": {"Status": "down", "AvgLatency": 0, "AvgPacketLoss": 100}
//! }"#;
//! let decoded = decode_snapshot(body).unwrap();
//! let summary = summarize(&decoded.snapshot, &Thresholds::default());
//!
//! assert_eq!(summary.up, 1);
//! assert_eq!(summary.worst_host, "web-1");
//! assert_eq!(summary.health, Some(Health::Critical));
//! ```

pub mod app;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod events;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use chart::{ChartSurface, RenderTargets, TerminalCharts};
pub use dashboard::{CycleReport, Dashboard, DashboardOptions};
pub use data::{summarize, DashboardSummary, Health, RollingWindow, SeriesRegistry, Thresholds};
pub use error::SourceError;
pub use source::{
    decode_snapshot, ChannelSource, DataSource, FileSource, HostMetrics, HostStatus, HttpSource,
    Sample, Snapshot,
};
