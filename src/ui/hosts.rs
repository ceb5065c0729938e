//! Per-host chart grid.
//!
//! Only the hosts on the current page get a panel, so only they resolve as
//! render targets this frame.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::ui::series;

/// Smallest panel that still shows a readable chart.
const MIN_PANEL_WIDTH: u16 = 36;
const MIN_PANEL_HEIGHT: u16 = 8;

/// Columns and rows of the grid that fits in `area`.
pub fn grid_shape(area: Rect) -> (usize, usize) {
    let cols = (area.width / MIN_PANEL_WIDTH).clamp(1, 4) as usize;
    let rows = (area.height / MIN_PANEL_HEIGHT).max(1) as usize;
    (cols, rows)
}

/// Render the current page and register its panels.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let (cols, rows) = grid_shape(area);
    app.hosts_per_page = cols * rows;
    app.clamp_selection();

    if app.host_count() == 0 {
        let empty = Paragraph::new("No hosts reported")
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(empty, area);
        return;
    }

    let start = app.host_page * app.hosts_per_page;
    let page: Vec<String> = app
        .hosts()
        .into_iter()
        .skip(start)
        .take(app.hosts_per_page)
        .map(str::to_string)
        .collect();

    let row_areas = Layout::vertical(vec![Constraint::Ratio(1, rows as u32); rows]).split(area);
    for (row_index, row_area) in row_areas.iter().enumerate() {
        let cells =
            Layout::horizontal(vec![Constraint::Ratio(1, cols as u32); cols]).split(*row_area);
        for (col_index, cell) in cells.iter().enumerate() {
            let Some(host) = page.get(row_index * cols + col_index) else {
                return;
            };
            let key = app.dashboard.registry().key_for(host).cloned();
            if let Some(ref key) = key {
                app.targets.register(key.clone(), *cell);
            }
            let chart = key.as_ref().and_then(|k| app.dashboard.surface().chart_for(k));
            series::render(frame, chart, host, app.theme.series, &app.theme, *cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_shape() {
        assert_eq!(grid_shape(Rect::new(0, 0, 80, 20)), (2, 2));
        assert_eq!(grid_shape(Rect::new(0, 0, 30, 5)), (1, 1));
        assert_eq!(grid_shape(Rect::new(0, 0, 400, 40)), (4, 5));
    }
}
