//! UI rendering with ratatui.
//!
//! Every region is first built as escaped text by the controller and then
//! converted to spans here, one paragraph per region.

mod bars;
mod diff;
mod overlays;
pub mod sgr;
mod sidebar;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use super::app::App;
use crate::logging::Timer;

/// Main render function.
pub fn render(frame: &mut Frame, app: &App) {
    let _timer = Timer::start("render_frame");
    let area = frame.area();

    if !app.viewport.is_sized() {
        frame.render_widget(Paragraph::new("Loading..."), area);
        return;
    }

    let overlay = app.overlay_lines(usize::from(area.width));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                                   // Top bar
            Constraint::Length(1),                                   // Rule
            Constraint::Length(height(app.viewport.content_height)), // Panes
            Constraint::Length(height(overlay.len())),               // Overlays
            Constraint::Length(1),                                   // Rule
            Constraint::Length(1),                                   // Bottom bar
        ])
        .split(area);

    bars::render_top_bar(frame, app, chunks[0]);
    bars::render_rule(frame, Some(app.theme.divider), chunks[1]);
    render_main(frame, app, chunks[2]);
    overlays::render_overlay(frame, &overlay, chunks[3]);
    bars::render_rule(frame, None, chunks[4]);
    bars::render_bottom_bar(frame, app, chunks[5]);
}

fn render_main(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(app.viewport.effective_left()), // File list
            Constraint::Length(1),                             // Divider
            Constraint::Min(0),                                // Diff pane
        ])
        .split(area);

    sidebar::render_sidebar(frame, app, chunks[0]);
    sidebar::render_divider(frame, app, chunks[1]);
    diff::render_diff(frame, app, chunks[2]);
}

fn height(lines: usize) -> u16 {
    u16::try_from(lines).unwrap_or(u16::MAX)
}
