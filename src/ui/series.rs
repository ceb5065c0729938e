//! Line-chart rendering for series held by the terminal surface.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::chart::ChartData;
use crate::ui::Theme;

/// Draw `chart` into `area`, or a placeholder panel titled `title` when the
/// series has not been created yet.
pub fn render(
    frame: &mut Frame,
    chart: Option<&ChartData>,
    title: &str,
    color: Color,
    theme: &Theme,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));

    let Some(chart) = chart else {
        let placeholder = Paragraph::new("waiting for data")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block.title(format!(" {} ", title)));
        frame.render_widget(placeholder, area);
        return;
    };

    let block = block.title(format!(" {} ", chart.config.title));
    if chart.values.is_empty() {
        let empty = Paragraph::new("no samples")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let points = chart.points();
    let [y_min, y_max] = chart.y_bounds();
    let x_max = (points.len().saturating_sub(1) as f64).max(1.0);

    let dataset = Dataset::default()
        .name(chart.config.dataset_label.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let x_labels = match (chart.labels.first(), chart.labels.last()) {
        (Some(first), Some(last)) if chart.labels.len() > 1 => {
            vec![Span::raw(first.clone()), Span::raw(last.clone())]
        }
        (Some(only), _) => vec![Span::raw(only.clone())],
        _ => Vec::new(),
    };

    let y_labels = vec![
        Span::raw(format!("{:.0}", y_min)),
        Span::raw(format!("{:.0}", y_max)),
    ];

    let legend = chart.config.show_legend.then_some(LegendPosition::TopRight);

    let widget = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme.border))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme.border))
                .bounds([y_min, y_max])
                .labels(y_labels),
        )
        .legend_position(legend);

    frame.render_widget(widget, area);
}
