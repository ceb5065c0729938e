//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::time::{format_age, format_period};

/// Render the header bar with fleet health.
///
/// Displays: health indicator, up/down counts, fleet averages, worst host.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" HOSTWATCH ", Style::default().add_modifier(Modifier::BOLD));

    let Some(summary) = app.dashboard.summary() else {
        let line = Line::from(vec![title, Span::raw("| Loading...")]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let Some(health) = summary.health else {
        let line = Line::from(vec![
            title,
            Span::raw("│ "),
            Span::styled("no hosts", Style::default().add_modifier(Modifier::DIM)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let down_span = if summary.down > 0 {
        Span::styled(
            summary.down.to_string(),
            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("0", Style::default().add_modifier(Modifier::DIM))
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.health_style(health)),
        title,
        Span::styled(health.symbol(), app.theme.health_style(health)),
        Span::raw(" │ "),
        Span::styled(summary.up.to_string(), Style::default().fg(app.theme.healthy)),
        Span::raw(" up "),
        down_span,
        Span::raw(format!(" down of {} │ ", summary.total)),
        Span::raw(format!(
            "avg {:.1} ms  loss {:.1}%",
            summary.avg_latency, summary.avg_packet_loss
        )),
    ];
    if let Some(uptime) = summary.uptime_pct {
        spans.push(Span::raw(format!("  uptime {:.0}%", uptime)));
    }
    if !summary.worst_host.is_empty() {
        spans.push(Span::raw(" │ worst "));
        spans.push(Span::styled(
            summary.worst_host.clone(),
            Style::default().fg(app.theme.warning),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let hosts_title = if app.page_count() > 1 {
        format!(" 2:Hosts [{}/{}] ", app.host_page + 1, app.page_count())
    } else {
        " 2:Hosts ".to_string()
    };
    let titles: Vec<Line> = vec![Line::from(" 1:Overview "), Line::from(hosts_title)];

    let selected = match app.current_view {
        View::Overview => 0,
        View::Hosts => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, time since last update, refresh period, skipped cycles and
/// the last fetch error. Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let dashboard = &app.dashboard;
    let mut parts = vec![format!(" {}", app.source_description())];

    match dashboard.last_updated() {
        Some(at) => parts.push(format!(
            "Updated {} ago",
            format_age(Instant::now().saturating_duration_since(at))
        )),
        None => parts.push("Loading...".to_string()),
    }
    parts.push(format!("every {}", format_period(dashboard.options().refresh)));
    if dashboard.skipped_cycles() > 0 {
        parts.push(format!("{} skipped", dashboard.skipped_cycles()));
    }

    let controls = match app.current_view {
        View::Overview => "↑↓:select Tab:switch r:refresh ?:help q:quit",
        View::Hosts => "↑↓:page Tab:switch r:refresh ?:help q:quit",
    };

    let line = match dashboard.last_error() {
        Some(err) => Line::from(vec![
            Span::styled(parts.join(" | "), Style::default().add_modifier(Modifier::DIM)),
            Span::raw(" | "),
            Span::styled(format!("Error: {}", err), Style::default().fg(app.theme.critical)),
        ]),
        None => Line::from(Span::styled(
            format!("{} | {}", parts.join(" | "), controls),
            Style::default().add_modifier(Modifier::DIM),
        )),
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab/1/2     Switch views"),
        Line::from("  ↑/↓ j/k     Select host / page"),
        Line::from("  PgUp/PgDn   Jump 10 hosts / one page"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Esc         Close overlay"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Render the notice shown when the terminal is below the minimum size.
pub fn render_too_small(frame: &mut Frame, area: Rect, min_width: u16, min_height: u16) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width, area.height, min_width, min_height
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(ratatui::style::Color::Yellow));
    let top = (area.height / 2).saturating_sub(2);
    let centered = Rect::new(area.x, area.y + top, area.width, 5.min(area.height));
    frame.render_widget(paragraph, centered);
}
