//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Health;
use crate::source::HostStatus;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for degraded fleet health.
    pub warning: Color,
    /// Color for critical fleet health and down hosts.
    pub critical: Color,
    /// Color for good health and up hosts.
    pub healthy: Color,
    /// Color for hosts whose state is not known yet.
    pub unknown: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Line color of per-host latency charts.
    pub series: Color,
    /// Line color of the fleet trend chart.
    pub fleet_series: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            unknown: Color::Gray,
            border: Color::Gray,
            series: Color::LightBlue,
            fleet_series: Color::Magenta,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            unknown: Color::DarkGray,
            border: Color::DarkGray,
            series: Color::Blue,
            fleet_series: Color::Magenta,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a fleet health level
    pub fn health_style(&self, health: Health) -> Style {
        match health {
            Health::Good => Style::default().fg(self.healthy),
            Health::Degraded => Style::default().fg(self.warning),
            Health::Critical => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for a single host's reachability
    pub fn host_style(&self, status: HostStatus) -> Style {
        match status {
            HostStatus::Up => Style::default().fg(self.healthy),
            HostStatus::Down => Style::default().fg(self.critical),
            HostStatus::Unknown => Style::default().fg(self.unknown),
        }
    }
}
