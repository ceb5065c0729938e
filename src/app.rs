//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::chart::{TerminalCharts, ViewTargets};
use crate::dashboard::{CycleReport, Dashboard};
use crate::data::export::export_to_file;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Fleet summary, aggregate latency trend and host table.
    Overview,
    /// Grid of per-host latency charts.
    Hosts,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Overview => View::Hosts,
            View::Hosts => View::Overview,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Only two views
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Hosts => "Hosts",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    pub dashboard: Dashboard<TerminalCharts>,
    /// Chart panels laid out by the last drawn frame.
    pub targets: ViewTargets,

    // Navigation state
    pub selected_host: usize,
    pub host_page: usize,
    /// Charts that fit on one page of the Hosts view, set while drawing.
    pub hosts_per_page: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a dashboard, detecting the terminal theme.
    pub fn new(dashboard: Dashboard<TerminalCharts>) -> Self {
        Self::with_theme(dashboard, Theme::auto_detect())
    }

    pub fn with_theme(dashboard: Dashboard<TerminalCharts>, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Overview,
            show_help: false,
            dashboard,
            targets: ViewTargets::new(),
            selected_host: 0,
            host_page: 0,
            hosts_per_page: 1,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.dashboard.source_description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Drive the refresh loop against the panels of the last frame.
    pub fn tick(&mut self, now: Instant) -> Option<CycleReport> {
        let report = self.dashboard.tick(now, &self.targets)?;
        self.clamp_selection();
        Some(report)
    }

    /// Give hosts skipped for lack of a panel another chance once a frame
    /// has laid them out.
    pub fn after_draw(&mut self) {
        self.dashboard.retry_unresolved(&self.targets);
    }

    /// Fetch now instead of waiting for the next period.
    pub fn refresh(&mut self) {
        if self.dashboard.refresh_now(Instant::now()) {
            self.set_status_message("Refreshing...".to_string());
        } else {
            self.set_status_message("Refresh already in progress".to_string());
        }
    }

    /// Host identifiers in display order.
    pub fn hosts(&self) -> Vec<&str> {
        self.dashboard.snapshot().keys().map(String::as_str).collect()
    }

    pub fn host_count(&self) -> usize {
        self.dashboard.snapshot().len()
    }

    /// Identifier of the host under the cursor in the Overview table.
    pub fn selected_host_name(&self) -> Option<&str> {
        self.dashboard.snapshot().keys().nth(self.selected_host).map(String::as_str)
    }

    /// Number of pages in the Hosts view (at least one).
    pub fn page_count(&self) -> usize {
        let per_page = self.hosts_per_page.max(1);
        self.host_count().div_ceil(per_page).max(1)
    }

    /// Keep cursor and page inside the current host list.
    pub fn clamp_selection(&mut self) {
        let count = self.host_count();
        if self.selected_host >= count {
            self.selected_host = count.saturating_sub(1);
        }
        let pages = self.page_count();
        if self.host_page >= pages {
            self.host_page = pages - 1;
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move down by n rows (Overview) or n pages (Hosts).
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::Overview => {
                let max = self.host_count().saturating_sub(1);
                self.selected_host = (self.selected_host + n).min(max);
            }
            View::Hosts => {
                let max = self.page_count() - 1;
                self.host_page = (self.host_page + n).min(max);
            }
        }
    }

    /// Move up by n rows (Overview) or n pages (Hosts).
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Overview => self.selected_host = self.selected_host.saturating_sub(n),
            View::Hosts => self.host_page = self.host_page.saturating_sub(n),
        }
    }

    /// Jump to the first item.
    pub fn select_first(&mut self) {
        match self.current_view {
            View::Overview => self.selected_host = 0,
            View::Hosts => self.host_page = 0,
        }
    }

    /// Jump to the last item.
    pub fn select_last(&mut self) {
        match self.current_view {
            View::Overview => self.selected_host = self.host_count().saturating_sub(1),
            View::Hosts => self.host_page = self.page_count() - 1,
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Close the help overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_help = false;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(summary) = self.dashboard.summary() else {
            anyhow::bail!("No data to export");
        };
        export_to_file(
            path,
            summary,
            self.dashboard.snapshot(),
            self.dashboard.window(),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::chart::NoTargets;
    use crate::dashboard::DashboardOptions;
    use crate::source::{ChannelSource, HostMetrics, HostStatus, Snapshot};
    use tokio::sync::watch;

    pub(crate) fn host(status: HostStatus, latency: f64) -> HostMetrics {
        HostMetrics {
            status,
            avg_latency: latency,
            avg_packet_loss: 0.0,
            history: Vec::new(),
        }
    }

    /// An app fed from a channel, with one snapshot already applied.
    pub(crate) fn app_with_hosts(names: &[&str]) -> (watch::Sender<Snapshot>, App) {
        let (tx, source) = ChannelSource::create("test");
        let snapshot: Snapshot =
            names.iter().map(|n| (n.to_string(), host(HostStatus::Up, 10.0))).collect();
        tx.send(snapshot).unwrap();

        let dashboard = Dashboard::new(
            Box::new(source),
            DashboardOptions::default(),
            TerminalCharts::new(),
        );
        let mut app = App::with_theme(dashboard, Theme::dark());
        app.tick(Instant::now());
        (tx, app)
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Overview.next(), View::Hosts);
        assert_eq!(View::Hosts.next(), View::Overview);
        assert_eq!(View::Overview.prev(), View::Hosts);
    }

    #[test]
    fn test_first_tick_loads_hosts() {
        let (_tx, app) = app_with_hosts(&["b", "a"]);
        assert_eq!(app.hosts(), vec!["a", "b"]);
        assert_eq!(app.dashboard.summary().unwrap().total, 2);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let (_tx, mut app) = app_with_hosts(&["a", "b", "c"]);
        app.select_next_n(10);
        assert_eq!(app.selected_host, 2);
        assert_eq!(app.selected_host_name(), Some("c"));
        app.select_prev_n(10);
        assert_eq!(app.selected_host, 0);
        app.select_last();
        assert_eq!(app.selected_host, 2);
        app.select_first();
        assert_eq!(app.selected_host, 0);
    }

    #[test]
    fn test_paging_in_hosts_view() {
        let (_tx, mut app) = app_with_hosts(&["a", "b", "c", "d", "e"]);
        app.set_view(View::Hosts);
        app.hosts_per_page = 2;
        assert_eq!(app.page_count(), 3);

        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.host_page, 2);
        app.select_first();
        assert_eq!(app.host_page, 0);
        app.select_last();
        assert_eq!(app.host_page, 2);
    }

    #[test]
    fn test_selection_clamped_when_hosts_vanish() {
        let (tx, mut app) = app_with_hosts(&["a", "b", "c"]);
        app.select_last();
        tx.send(Snapshot::from([("a".to_string(), host(HostStatus::Up, 1.0))])).unwrap();

        let later = Instant::now() + Duration::from_secs(10);
        app.tick(later);
        assert_eq!(app.host_count(), 1);
        assert_eq!(app.selected_host, 0);
    }

    #[test]
    fn test_export_without_data_fails() {
        let (_tx, source) = ChannelSource::create("test");
        let dashboard = Dashboard::new(
            Box::new(source),
            DashboardOptions::default(),
            TerminalCharts::new(),
        );
        let app = App::with_theme(dashboard, Theme::dark());
        let dir = tempfile::tempdir().unwrap();
        assert!(app.export_state(&dir.path().join("out.json")).is_err());
    }

    #[test]
    fn test_export_state_writes_file() {
        let (_tx, app) = app_with_hosts(&["a"]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        app.export_state(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"host\": \"a\""));
    }

    #[test]
    fn test_retry_after_draw_creates_pending_charts() {
        let (_tx, mut app) = app_with_hosts(&["a"]);
        // No frame drawn yet, so nothing could be created
        assert!(app.dashboard.surface().is_empty());

        let key = app.dashboard.registry().key_for("a").unwrap().clone();
        app.targets.register(key.clone(), ratatui::layout::Rect::new(0, 0, 20, 8));
        app.after_draw();
        assert!(app.dashboard.surface().chart_for(&key).is_some());

        // Nothing left to retry
        assert!(app.dashboard.retry_unresolved(&NoTargets).is_none());
    }
}
