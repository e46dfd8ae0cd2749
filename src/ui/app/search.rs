use crossterm::event::KeyEvent;

use super::App;
use crate::ui::msg::Command;
use crate::ui::wizards::key_name;

impl App {
    /// Open the search overlay with the previous query.
    pub(super) fn open_search(&mut self) {
        self.ui.show_help = false;
        self.search_input.set_value(self.search.query());
        self.search_input.focus();
        self.search.activate();
    }

    pub(super) fn close_search(&mut self) {
        if self.search.is_active() {
            self.search_input.blur();
            self.search.deactivate();
        }
    }

    /// Keys while the search overlay is open.
    pub(super) fn search_key(&mut self, key: KeyEvent) -> Command {
        match key_name(&key).as_str() {
            "esc" => self.close_search(),
            "ctrl+c" => self.should_quit = true,
            "enter" | "down" => self.advance_search(true),
            "up" => self.advance_search(false),
            _ => {
                if self.search_input.handle_key(key)
                    && self.search_input.value() != self.search.query()
                {
                    self.search.set_query(self.search_input.value());
                    self.recenter_on_match();
                }
            }
        }
        Command::None
    }

    /// Step to the next or previous match and scroll to it.
    pub(super) fn advance_search(&mut self, forward: bool) {
        if forward {
            self.search.next();
        } else {
            self.search.previous();
        }
        self.recenter_on_match();
    }

    /// Center the current match once the layout is reconciled.
    fn recenter_on_match(&mut self) {
        self.pending_recenter = true;
    }

    /// Scroll so the current match sits mid-pane, clamped to the content.
    pub(super) fn apply_recenter(&mut self) {
        let Some(line) = self.search.current_line() else {
            return;
        };
        let height = self.viewport.content_height;
        let max = self.right_content().len().saturating_sub(height);
        self.viewport.v_offset = line.saturating_sub(height / 2).min(max);
    }
}
