//! Top and bottom bar rendering.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use super::sgr::to_line;
use crate::ui::app::App;

/// Render the title bar with the branch right-aligned.
pub fn render_top_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = to_line(&app.top_bar(usize::from(area.width)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar.
pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = to_line(&app.bottom_bar(usize::from(area.width)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Full-width horizontal rule, optionally colored.
pub fn render_rule(frame: &mut Frame, color: Option<Color>, area: Rect) {
    let style = color.map_or_else(Style::default, |c| Style::default().fg(c));
    let rule = "─".repeat(usize::from(area.width));
    frame.render_widget(Paragraph::new(rule).style(style), area);
}
