//! Escaped line builders for every screen region.
//!
//! All text is produced as escaped strings and converted to spans only at
//! draw time, so search and slicing see exactly what is shown.

use chrono::{DateTime, Local};
use ratatui::style::{Modifier, Style};

use super::App;
use crate::core::{fit, pad, sanitize, slice, truncate, visual_width, wrap, Row, RowKind};
use crate::ui::render::sgr::{bold, faint, fg, paint};

/// Key reference shown by `h`.
const HELP_ENTRIES: &[&str] = &[
    "j/k or arrows  Move selection",
    "J/K, PgDn/PgUp  Scroll diff",
    "{/}            Horizontal scroll (diff)",
    "</> or H/L      Adjust left pane width",
    "[/]            Page left file list",
    "b              Switch branch (open wizard)",
    "p              Pull (open wizard)",
    "u              Uncommit (open wizard)",
    "R              Reset/Clean (open wizard)",
    "c              Commit & push (open wizard)",
    "V              Revert a commit (open wizard)",
    "/              Search diff",
    "s              Toggle side-by-side / inline",
    "t              Toggle HEAD / staged diffs",
    "w              Toggle line wrap (diff)",
    "r              Refresh now",
    "g / G          Top / Bottom",
    "q              Quit",
];

#[derive(Clone, Copy)]
enum Side {
    Old,
    New,
}

impl App {
    /// Overlay lines in stacking order: help, wizard, search.
    pub fn overlay_lines(&self, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        if self.ui.show_help {
            lines.extend(self.help_lines(width));
        }
        if let Some(wizard) = self.wizard() {
            lines.extend(wizard.render_overlay(width));
        }
        if self.search.is_active() {
            lines.extend(self.search_lines(width));
        }
        lines
    }

    fn help_lines(&self, width: usize) -> Vec<String> {
        let mut lines = vec![
            "─".repeat(width),
            bold("Help — press 'h' or Esc to close"),
        ];
        lines.extend(HELP_ENTRIES.iter().map(|l| l.to_string()));
        lines
    }

    fn search_lines(&self, width: usize) -> Vec<String> {
        vec![
            fg(&"?".repeat(width), self.theme.divider),
            self.search_input.view(),
            faint(&self.search.status()),
        ]
    }

    /// Title bar: `Changes | <path> (<status>) [MODE]`, branch on the right.
    pub fn top_bar(&self, width: usize) -> String {
        let mode = self.mode.label();
        let title = match self.selected_file() {
            Some(f) => format!("Changes | {} ({}) [{mode}]", f.path, f.status_label()),
            None => format!("Changes | [{mode}]"),
        };
        let branch = (!self.ui.branch.is_empty()).then(|| faint(&self.ui.branch));
        split_bar(&title, branch.as_deref().unwrap_or_default(), width)
    }

    /// Status bar: status or hints on the left, refresh time on the right.
    pub fn bottom_bar(&self, width: usize) -> String {
        let left = match &self.ui.status {
            Some(status) => bold(status),
            None => {
                let mut text = if self.ui.key_buffer.is_empty() {
                    "h: help".to_string()
                } else {
                    self.ui.key_buffer.clone()
                };
                if !self.ui.last_commit.is_empty() {
                    text.push_str("  |  last: ");
                    text.push_str(&self.ui.last_commit);
                }
                faint(&text)
            }
        };
        let right = faint(&format!("refreshed: {}", clock(self.ui.last_refresh)));
        split_bar(&left, &right, width)
    }

    /// Visible file list rows.
    pub fn left_lines(&self, height: usize) -> Vec<String> {
        if self.files.is_empty() {
            return vec!["No changes detected".to_string()];
        }
        let start = self.viewport.left_offset.min(self.files.len());
        self.files
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, f)| {
                let marker = if i == self.selected { "> " } else { "  " };
                format!("{marker}{} {}", f.status_label(), sanitize(&f.path))
            })
            .collect()
    }

    /// Every line of the diff pane at `width` columns.
    pub(super) fn right_lines(&self, width: usize) -> Vec<String> {
        let Some(file) = self.selected_file() else {
            return Vec::new();
        };
        if file.binary {
            return vec![faint("(Binary file; no text diff)")];
        }
        let Some(rows) = &self.rows else {
            return vec!["Loading diff…".to_string()];
        };

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            match row.kind {
                RowKind::Meta => {}
                RowKind::Hunk => lines.push(paint(
                    &"·".repeat(width),
                    Style::new()
                        .fg(self.theme.meta)
                        .add_modifier(Modifier::DIM),
                )),
                _ if self.viewport.side_by_side => self.push_split_row(&mut lines, row, width),
                _ => self.push_inline_row(&mut lines, row, width),
            }
        }
        lines
    }

    fn push_inline_row(&self, lines: &mut Vec<String>, row: &Row, width: usize) {
        let old = || fg(&format!("- {}", sanitize(&row.left)), self.theme.del);
        let new = || fg(&format!("+ {}", sanitize(&row.right)), self.theme.add);
        let parts = match row.kind {
            RowKind::Context => vec![format!("  {}", sanitize(&row.left))],
            RowKind::Add => vec![new()],
            RowKind::Del => vec![old()],
            RowKind::Replace => vec![old(), new()],
            RowKind::Hunk | RowKind::Meta => Vec::new(),
        };
        for line in parts {
            if self.viewport.wrap {
                lines.extend(wrap(&line, width));
            } else if self.viewport.x_offset > 0 {
                lines.push(pad(&slice(&line, self.viewport.x_offset, width), width));
            } else {
                lines.push(line);
            }
        }
    }

    fn push_split_row(&self, lines: &mut Vec<String>, row: &Row, width: usize) {
        let col = (width.saturating_sub(1) / 2).max(10);
        let mid = fg("│", self.theme.divider);
        if self.viewport.wrap {
            let old = self.wrapped_cell(row, Side::Old, col);
            let new = self.wrapped_cell(row, Side::New, col);
            let blank = " ".repeat(col);
            for i in 0..old.len().max(new.len()) {
                let l = old.get(i).unwrap_or(&blank);
                let r = new.get(i).unwrap_or(&blank);
                lines.push(format!("{l}{mid}{r}"));
            }
        } else {
            let l = pad(&self.cell(row, Side::Old, col), col);
            let r = pad(&self.cell(row, Side::New, col), col);
            lines.push(format!("{l}{mid}{r}"));
        }
    }

    /// Marker and colored text of one side of a row.
    fn cell_parts(&self, row: &Row, side: Side) -> (String, String) {
        let (text, color, bg, marker, present) = match side {
            Side::Old => (
                &row.left,
                self.theme.del,
                self.theme.del_bg,
                "-",
                matches!(row.kind, RowKind::Del | RowKind::Replace),
            ),
            Side::New => (
                &row.right,
                self.theme.add,
                self.theme.add_bg,
                "+",
                matches!(row.kind, RowKind::Add | RowKind::Replace),
            ),
        };
        let text = sanitize(text);
        match (row.kind, present) {
            (RowKind::Context, _) => (" ".to_string(), text.into_owned()),
            (_, true) => (
                fg(marker, color),
                colored(&text, Style::new().fg(color).bg(bg)),
            ),
            (_, false) => (" ".to_string(), String::new()),
        }
    }

    fn cell(&self, row: &Row, side: Side, width: usize) -> String {
        let (marker, text) = self.cell_parts(row, side);
        if width <= 2 {
            return slice(&format!("{marker} "), 0, width);
        }
        format!(
            "{marker} {}",
            slice(&text, self.viewport.x_offset, width - 2)
        )
    }

    fn wrapped_cell(&self, row: &Row, side: Side, width: usize) -> Vec<String> {
        let (marker, text) = self.cell_parts(row, side);
        if width <= 2 {
            return vec![slice(&format!("{marker} "), 0, width)];
        }
        wrap(&text, width - 2)
            .iter()
            .map(|part| format!("{marker} {}", pad(part, width - 2)))
            .collect()
    }
}

fn colored(text: &str, style: Style) -> String {
    if text.is_empty() {
        String::new()
    } else {
        paint(text, style)
    }
}

fn clock(time: Option<DateTime<Local>>) -> String {
    time.map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// `left` padded or truncated so that `right` ends at `width`, separated by
/// at least one space. `right` wins when space runs out.
fn split_bar(left: &str, right: &str, width: usize) -> String {
    let right_w = visual_width(right);
    if right_w == 0 {
        return fit(left, width);
    }
    if right_w >= width {
        return truncate(right, width, "…");
    }
    let avail = width - right_w - 1;
    let left = if visual_width(left) > avail {
        truncate(left, avail, "…")
    } else {
        pad(left, avail)
    };
    format!("{left} {right}")
}
