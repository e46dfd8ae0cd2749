//! Diff pane rendering.

use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};

use super::sgr::to_line;
use crate::ui::app::App;

/// Render the visible window of the diff pane with search highlights.
pub fn render_diff(frame: &mut Frame, app: &App, area: Rect) {
    let start = app.viewport.v_offset;
    let end = start + usize::from(area.height);
    let lines: Vec<Line<'static>> = (start..end)
        .map_while(|i| app.search.highlighted(i))
        .map(|l| to_line(&l))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}
