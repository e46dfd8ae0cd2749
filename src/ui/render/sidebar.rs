//! File list rendering.

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::Paragraph,
    Frame,
};

use super::sgr::to_line;
use crate::ui::app::App;

/// Render the visible slice of the file list.
pub fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line<'static>> = app
        .left_lines(usize::from(area.height))
        .iter()
        .map(|l| to_line(l))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the `│` column between the panes.
pub fn render_divider(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line<'static>> = (0..area.height).map(|_| Line::raw("│")).collect();
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(app.theme.divider)),
        area,
    );
}
