//! Bottom overlays: help, the open wizard and the search bar.

use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};

use super::sgr::to_line;

/// Render pre-built overlay lines into `area`.
pub fn render_overlay(frame: &mut Frame, lines: &[String], area: Rect) {
    if lines.is_empty() || area.height == 0 {
        return;
    }
    let lines: Vec<Line<'static>> = lines.iter().map(|l| to_line(l)).collect();
    frame.render_widget(Paragraph::new(lines), area);
}
