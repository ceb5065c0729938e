//! Overview rendering.
//!
//! Fleet summary panel, the fleet latency trend and a table of every host.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::chart::TargetKey;
use crate::data::FLEET_TARGET;
use crate::ui::series;

/// Render the Overview and register the fleet chart panel.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Percentage(45),
        Constraint::Min(4),
    ])
    .split(area);

    render_summary(frame, app, chunks[0]);

    let key = TargetKey::fixed(FLEET_TARGET);
    app.targets.register(key.clone(), chunks[1]);
    series::render(
        frame,
        app.dashboard.surface().chart_for(&key),
        "Fleet average latency",
        app.theme.fleet_series,
        &app.theme,
        chunks[1],
    );

    render_table(frame, app, chunks[2]);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Fleet ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines = match app.dashboard.summary() {
        None => vec![Line::from("Waiting for the first snapshot...")],
        Some(summary) if summary.is_empty() => vec![Line::from("No hosts reported")],
        Some(summary) => {
            let health = match summary.health {
                Some(h) => Span::styled(h.symbol(), app.theme.health_style(h)),
                None => Span::raw("-"),
            };
            vec![
                Line::from(vec![
                    Span::raw("Health "),
                    health,
                    Span::raw("   Hosts "),
                    Span::styled(summary.total.to_string(), bold),
                    Span::raw("   Up "),
                    Span::styled(summary.up.to_string(), Style::default().fg(app.theme.healthy)),
                    Span::raw("   Down "),
                    Span::styled(
                        summary.down.to_string(),
                        Style::default().fg(app.theme.critical),
                    ),
                ]),
                Line::from(vec![
                    Span::raw("Avg latency "),
                    Span::styled(format!("{:.1} ms", summary.avg_latency), bold),
                    Span::raw("   Avg loss "),
                    Span::styled(format!("{:.1}%", summary.avg_packet_loss), bold),
                    Span::raw("   Worst "),
                    Span::styled(
                        summary.worst_host.clone(),
                        Style::default().fg(app.theme.warning),
                    ),
                ]),
            ]
        }
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.dashboard.snapshot();
    let worst = app.dashboard.summary().map(|s| s.worst_host.as_str());

    let header = Row::new(vec!["Host", "Status", "Latency", "Loss", "Samples"])
        .style(app.theme.header)
        .height(1);

    let rows: Vec<Row> = snapshot
        .iter()
        .map(|(host, m)| {
            let name = if Some(host.as_str()) == worst {
                Span::styled(host.clone(), Style::default().fg(app.theme.warning))
            } else {
                Span::raw(host.clone())
            };
            Row::new(vec![
                Cell::from(name),
                Cell::from(Span::styled(m.status.label(), app.theme.host_style(m.status))),
                Cell::from(format!("{:.1} ms", m.avg_latency)),
                Cell::from(format!("{:.1}%", m.avg_packet_loss)),
                Cell::from(m.history.len().to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" Hosts ({}) ", snapshot.len()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .row_highlight_style(app.theme.selected)
    .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !snapshot.is_empty() {
        state.select(Some(app.selected_host));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
