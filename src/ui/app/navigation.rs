use crossterm::event::KeyEvent;

use super::state::MIN_LEFT;
use super::App;
use crate::core::PrefChange;
use crate::ui::msg::Command;
use crate::ui::wizards::{key_name, WizardKind};

/// Columns moved per horizontal scroll step.
const X_STEP: usize = 4;
/// Columns moved per left pane resize step.
const WIDTH_STEP: u16 = 2;
/// Page size used before the first layout.
const FALLBACK_PAGE: usize = 10;

fn is_digit(name: &str) -> bool {
    name.len() == 1 && name.as_bytes()[0].is_ascii_digit()
}

fn is_movement(name: &str) -> bool {
    matches!(name, "j" | "k" | "down" | "up")
}

impl App {
    /// Global keymap, used when no wizard, search or help is open.
    pub(super) fn global_key(&mut self, key: KeyEvent) -> Command {
        let name = key_name(&key);
        let name = name.as_str();

        if is_digit(name) {
            self.ui.key_buffer.push_str(name);
            return Command::None;
        }
        if !is_movement(name) {
            self.ui.key_buffer.clear();
        }

        match name {
            "q" | "ctrl+c" => {
                self.should_quit = true;
                Command::None
            }
            "h" => {
                self.open_help();
                Command::None
            }
            "c" => self.open_wizard(WizardKind::Commit),
            "u" => self.open_wizard(WizardKind::Uncommit),
            "b" => self.open_wizard(WizardKind::Branch),
            "p" => self.open_wizard(WizardKind::Pull),
            "R" => self.open_wizard(WizardKind::ResetClean),
            "V" => self.open_wizard(WizardKind::Revert),
            "/" => {
                self.open_search();
                Command::None
            }
            "<" | "H" => self.resize_left(false),
            ">" | "L" => self.resize_left(true),
            "j" | "down" => self.move_selection(true),
            "k" | "up" => self.move_selection(false),
            "g" => self.select(0),
            "G" => self.select(self.files.len().saturating_sub(1)),
            "[" => {
                self.page_files(false);
                Command::None
            }
            "]" => {
                self.page_files(true);
                Command::None
            }
            "n" => {
                self.advance_search(true);
                Command::None
            }
            "N" => {
                self.advance_search(false);
                Command::None
            }
            "r" => {
                let diff = self.selected_file().map(|f| Command::LoadDiff {
                    path: f.path.clone(),
                    mode: self.mode,
                });
                Command::batch([Command::LoadFiles(self.mode), diff.unwrap_or_default()])
            }
            "s" => {
                self.viewport.side_by_side = !self.viewport.side_by_side;
                Command::SavePref(PrefChange::SideBySide(self.viewport.side_by_side))
            }
            "w" => {
                self.viewport.wrap = !self.viewport.wrap;
                if self.viewport.wrap {
                    self.viewport.x_offset = 0;
                }
                Command::SavePref(PrefChange::Wrap(self.viewport.wrap))
            }
            "t" => {
                self.mode = self.mode.toggle();
                self.rows = None;
                self.selected = 0;
                self.viewport.v_offset = 0;
                Command::LoadFiles(self.mode)
            }
            "left" | "{" => {
                if !self.viewport.wrap {
                    self.viewport.x_offset = self.viewport.x_offset.saturating_sub(X_STEP);
                }
                Command::None
            }
            "right" | "}" => {
                if !self.viewport.wrap {
                    self.viewport.x_offset += X_STEP;
                }
                Command::None
            }
            "home" => {
                self.viewport.x_offset = 0;
                Command::None
            }
            "pgdown" => self.scroll_down(self.page()),
            "pgup" => self.scroll_up(self.page()),
            "J" | "ctrl+d" => self.scroll_down(self.page() / 2),
            "K" | "ctrl+u" => self.scroll_up(self.page() / 2),
            "ctrl+e" => self.scroll_down(1),
            "ctrl+y" => self.scroll_up(1),
            _ => Command::None,
        }
    }

    /// Move the selection one step, or by the pending numeric prefix.
    fn move_selection(&mut self, down: bool) -> Command {
        let count = self.ui.key_buffer.parse::<usize>().unwrap_or(1).max(1);
        self.ui.key_buffer.clear();
        if self.files.is_empty() {
            return Command::None;
        }
        let last = self.files.len() - 1;
        let target = if down {
            self.selected.saturating_add(count).min(last)
        } else {
            self.selected.saturating_sub(count)
        };
        if target == self.selected {
            return Command::None;
        }
        self.select(target)
    }

    /// Select file `index`, dropping the old rows until the new diff arrives.
    pub(super) fn select(&mut self, index: usize) -> Command {
        let Some(file) = self.files.get(index) else {
            return Command::None;
        };
        let path = file.path.clone();
        self.selected = index;
        self.rows = None;
        self.viewport.v_offset = 0;
        Command::LoadDiff {
            path,
            mode: self.mode,
        }
    }

    fn resize_left(&mut self, grow: bool) -> Command {
        let vp = &mut self.viewport;
        if vp.left_width == 0 {
            vp.left_width = vp.width / 3;
        }
        vp.left_width = if grow {
            vp.left_width.saturating_add(WIDTH_STEP).min(vp.max_left())
        } else {
            vp.left_width.saturating_sub(WIDTH_STEP).max(MIN_LEFT)
        };
        Command::SavePref(PrefChange::LeftWidth(vp.left_width))
    }

    /// Page the file list by one screen minus a line, keeping the selection
    /// visible.
    fn page_files(&mut self, forward: bool) {
        let vis = match self.viewport.content_height {
            0 => FALLBACK_PAGE,
            h => h,
        };
        let step = vis.saturating_sub(1).max(1);
        let max_start = self.files.len().saturating_sub(vis);
        let offset = self.viewport.left_offset;

        let new_offset = if forward {
            let next = (offset + step).min(max_start);
            if self.selected >= next + vis {
                self.selected + 1 - vis
            } else {
                next
            }
        } else {
            let prev = offset.saturating_sub(step).min(self.selected);
            prev.min(max_start)
        };
        self.viewport.left_offset = new_offset;
    }

    fn page(&self) -> usize {
        self.viewport.content_height.max(1)
    }

    fn max_v_offset(&self) -> usize {
        self.right_content()
            .len()
            .saturating_sub(self.viewport.content_height)
    }

    fn scroll_down(&mut self, lines: usize) -> Command {
        let max = self.max_v_offset();
        self.viewport.v_offset = (self.viewport.v_offset + lines).min(max);
        Command::None
    }

    fn scroll_up(&mut self, lines: usize) -> Command {
        self.viewport.v_offset = self.viewport.v_offset.saturating_sub(lines);
        Command::None
    }

    /// Clamp scroll positions and rebuild the diff pane after a state change.
    pub(super) fn reconcile(&mut self) {
        if !self.viewport.is_sized() {
            return;
        }
        let width = usize::from(self.viewport.width);
        let left = usize::from(self.viewport.effective_left());
        let right_width = width.saturating_sub(left + 1).max(1);
        let overlay = self.overlay_lines(width).len();
        let content_height = usize::from(self.viewport.height)
            .saturating_sub(4 + overlay)
            .max(1);
        self.viewport.right_width = right_width;
        self.viewport.content_height = content_height;

        let vp = &mut self.viewport;
        let max_start = self.files.len().saturating_sub(content_height);
        vp.left_offset = vp.left_offset.min(max_start);
        if !self.files.is_empty() {
            if self.selected < vp.left_offset {
                vp.left_offset = self.selected;
            } else if self.selected >= vp.left_offset + content_height {
                vp.left_offset = self.selected + 1 - content_height;
            }
            vp.left_offset = vp.left_offset.min(max_start);
        }

        let lines = self.right_lines(right_width);
        self.search.set_content(lines);
        self.viewport.v_offset = self.viewport.v_offset.min(self.max_v_offset());
        if std::mem::take(&mut self.pending_recenter) {
            self.apply_recenter();
        }
    }
}
