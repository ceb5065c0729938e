//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`overview`]: Fleet summary, fleet latency trend and host table
//! - [`hosts`]: Paged grid of per-host latency charts
//! - [`series`]: Line-chart widget for a series held by the surface
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (overview/hosts::render)             │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```
//!
//! Every frame starts from an empty set of render targets; views register
//! the chart panels they lay out, and the refresh cycle resolves series
//! against that set.

pub mod common;
pub mod hosts;
pub mod overview;
pub mod series;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Draw one frame.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    app.targets.clear();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        common::render_too_small(frame, area, MIN_WIDTH, MIN_HEIGHT);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);

    match app.current_view {
        View::Overview => overview::render(frame, app, chunks[2]),
        View::Hosts => hosts::render(frame, app, chunks[2]),
    }

    // Tabs after the view so the page count reflects this frame's grid
    common::render_tabs(frame, app, chunks[1]);
    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
