//! Discard local changes: `git reset --hard` and/or `git clean`.
//!
//! Both actions are irreversible, so execution sits behind a preview and two
//! separate confirmations.

use crossterm::event::KeyEvent;
use ratatui::style::{Color, Modifier, Style};

use super::{
    bold, checkbox, cursor, error_line, fg, hint, key_name, move_up, rule, title, Flow, Wizard,
    WizardContext, WizardKind,
};
use crate::core::{FileChange, ResetCleanPlan};
use crate::ui::msg::{Command, GitTask, WizardMsg};
use crate::ui::render::sgr::paint;

const PREVIEW_LIMIT: usize = 10;

const ITEMS: [&str; 3] = [
    "Reset working tree (git reset --hard)",
    "Clean untracked (git clean -d -f)",
    "Include ignored in clean (-x)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Step {
    #[default]
    Select,
    Preview,
    Confirm,
    FinalConfirm,
}

/// Reset/clean wizard state.
#[derive(Debug, Default)]
pub struct ResetCleanWizard {
    step: Step,
    plan: ResetCleanPlan,
    index: usize,
    files: Vec<FileChange>,
    preview: Vec<String>,
    preview_err: Option<String>,
    preview_pending: bool,
    running: bool,
    done: bool,
    err: Option<String>,
}

impl ResetCleanWizard {
    /// Files with tracked changes that a hard reset would discard.
    fn tracked_changes(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !f.untracked && (f.staged || f.unstaged || f.deleted))
            .count()
    }

    fn handle_select(&mut self, key: KeyEvent) -> (Flow, Command) {
        match key_name(&key).as_str() {
            "esc" => return (Flow::Close, Command::None),
            "j" | "down" => self.index = (self.index + 1).min(ITEMS.len() - 1),
            "k" | "up" => move_up(&mut self.index),
            " " => match self.index {
                0 => self.plan.reset = !self.plan.reset,
                1 => self.plan.clean = !self.plan.clean,
                _ => self.plan.include_ignored = !self.plan.include_ignored,
            },
            "a" => {
                let both = self.plan.reset && self.plan.clean;
                self.plan.reset = !both;
                self.plan.clean = !both;
            }
            "enter" => {
                if self.plan.is_empty() {
                    self.err = Some("no actions selected".into());
                    return (Flow::Continue, Command::None);
                }
                self.err = None;
                self.step = Step::Preview;
                self.preview.clear();
                self.preview_err = None;
                self.preview_pending = self.plan.clean;
                if self.plan.clean {
                    return (
                        Flow::Continue,
                        Command::Git(GitTask::CleanPreview {
                            include_ignored: self.plan.include_ignored,
                        }),
                    );
                }
            }
            _ => {}
        }
        (Flow::Continue, Command::None)
    }

    /// Preview and first confirm: `esc` closes, `b` back, `enter` forward.
    fn handle_gate(&mut self, key: KeyEvent, back: Step, next: Step) -> Flow {
        match key_name(&key).as_str() {
            "esc" => return Flow::Close,
            "b" => self.step = back,
            "enter" => self.step = next,
            _ => {}
        }
        Flow::Continue
    }

    fn handle_final(&mut self, key: KeyEvent) -> (Flow, Command) {
        match key_name(&key).as_str() {
            "esc" if !self.running => return (Flow::Close, Command::None),
            "b" if !self.running && !self.done => self.step = Step::Confirm,
            "y" | "enter" if !self.running && !self.done => {
                self.running = true;
                self.err = None;
                return (Flow::Continue, Command::Git(GitTask::ResetClean(self.plan)));
            }
            _ => {}
        }
        (Flow::Continue, Command::None)
    }

    fn render_select(&self, lines: &mut Vec<String>) {
        lines.push(title(
            "Reset/Clean — Select actions (space: toggle, a: toggle both, enter: continue, esc: cancel)",
        ));
        let flags = [self.plan.reset, self.plan.clean, self.plan.include_ignored];
        for (i, (label, on)) in ITEMS.iter().zip(flags).enumerate() {
            lines.push(format!("{}{} {label}", cursor(i == self.index), checkbox(on)));
        }
        lines.push(hint("A preview will be shown before confirmation"));
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
    }

    fn render_preview(&self, lines: &mut Vec<String>) {
        lines.push(title(
            "Reset/Clean — Preview (enter: continue, b: back, esc: cancel)",
        ));
        if self.plan.reset {
            lines.push(format!(
                "Reset would discard tracked changes for ~{} file(s)",
                self.tracked_changes()
            ));
        } else {
            lines.push(hint("Reset: (not selected)"));
        }

        if !self.plan.clean {
            lines.push(hint("Clean: (not selected)"));
        } else if self.preview_pending {
            lines.push(hint("Clean: loading preview…"));
        } else if let Some(err) = &self.preview_err {
            lines.push(format!(
                "{}{err}",
                fg("Clean preview error: ", Color::Indexed(196))
            ));
        } else if self.preview.is_empty() {
            lines.push(hint("Clean: nothing to remove"));
        } else {
            lines.push(bold("Clean would remove:"));
            lines.extend(self.preview.iter().take(PREVIEW_LIMIT).cloned());
            if self.preview.len() > PREVIEW_LIMIT {
                lines.push(format!("… and {} more", self.preview.len() - PREVIEW_LIMIT));
            }
            if self.plan.include_ignored {
                lines.push(hint("(including ignored files)"));
            }
        }

        let commands = self.plan.commands();
        if !commands.is_empty() {
            lines.push(hint(&format!("Commands: {}", commands.join("  &&  "))));
        }
    }

    fn render_final(&self, lines: &mut Vec<String>) {
        lines.push(paint(
            "FINAL CONFIRMATION — Destructive action (y/enter: execute, b: back, esc: cancel)",
            Style::new()
                .fg(Color::Indexed(196))
                .add_modifier(Modifier::BOLD),
        ));
        if self.running {
            lines.push(fg("Running…", Color::Indexed(63)));
        }
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
    }
}

impl Wizard for ResetCleanWizard {
    fn kind(&self) -> WizardKind {
        WizardKind::ResetClean
    }

    fn init(&mut self, ctx: WizardContext<'_>) -> Command {
        *self = Self {
            files: ctx.files.to_vec(),
            ..Self::default()
        };
        Command::None
    }

    fn handle_key(&mut self, key: KeyEvent) -> (Flow, Command) {
        match self.step {
            Step::Select => self.handle_select(key),
            Step::Preview => (
                self.handle_gate(key, Step::Select, Step::Confirm),
                Command::None,
            ),
            Step::Confirm => (
                self.handle_gate(key, Step::Preview, Step::FinalConfirm),
                Command::None,
            ),
            Step::FinalConfirm => self.handle_final(key),
        }
    }

    fn update(&mut self, msg: WizardMsg) -> Command {
        match msg {
            WizardMsg::CleanPreview {
                include_ignored,
                result,
            } => {
                // Only the answer to the latest request may fill the preview.
                if self.step != Step::Preview
                    || !self.preview_pending
                    || include_ignored != self.plan.include_ignored
                {
                    return Command::None;
                }
                self.preview_pending = false;
                match result {
                    Ok(lines) => {
                        self.preview = lines;
                        self.preview_err = None;
                    }
                    Err(e) => {
                        self.preview.clear();
                        self.preview_err = Some(e.to_string());
                    }
                }
            }
            WizardMsg::ResetCleanDone(result) => {
                self.running = false;
                match result {
                    Ok(()) => {
                        self.err = None;
                        self.done = true;
                    }
                    Err(e) => {
                        self.err = Some(e.to_string());
                        self.done = false;
                    }
                }
            }
            _ => {}
        }
        Command::None
    }

    fn render_overlay(&self, width: usize) -> Vec<String> {
        let mut lines = vec![rule(width)];
        match self.step {
            Step::Select => self.render_select(&mut lines),
            Step::Preview => self.render_preview(&mut lines),
            Step::Confirm => {
                lines.push(paint(
                    "Confirm — This will discard local changes (enter: continue, b: back, esc: cancel)",
                    Style::new()
                        .fg(Color::Indexed(220))
                        .add_modifier(Modifier::BOLD),
                ));
                lines.push("Proceed to final confirmation?".to_string());
            }
            Step::FinalConfirm => self.render_final(&mut lines),
        }
        lines
    }

    fn is_complete(&self) -> bool {
        self.done
    }

    fn error(&self) -> Option<&str> {
        self.err.as_deref()
    }
}
