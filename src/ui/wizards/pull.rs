//! Pull from the upstream branch and show what git printed.

use crossterm::event::KeyEvent;
use ratatui::style::Color;

use super::{error_line, fg, hint, key_name, rule, title, Flow, Wizard, WizardContext, WizardKind};
use crate::core::sanitize;
use crate::ui::msg::{Command, GitTask, WizardMsg};

const OUTPUT_LIMIT: usize = 12;

/// Pull wizard state.
#[derive(Debug, Default)]
pub struct PullWizard {
    running: bool,
    done: bool,
    output: String,
    err: Option<String>,
}

impl Wizard for PullWizard {
    fn kind(&self) -> WizardKind {
        WizardKind::Pull
    }

    fn init(&mut self, _ctx: WizardContext<'_>) -> Command {
        *self = Self::default();
        Command::None
    }

    fn handle_key(&mut self, key: KeyEvent) -> (Flow, Command) {
        if self.running {
            return (Flow::Continue, Command::None);
        }
        match key_name(&key).as_str() {
            "esc" => (Flow::Close, Command::None),
            "y" | "enter" if self.done => (Flow::Close, Command::None),
            "y" | "enter" => {
                self.running = true;
                self.err = None;
                (Flow::Continue, Command::Git(GitTask::Pull))
            }
            _ => (Flow::Continue, Command::None),
        }
    }

    fn update(&mut self, msg: WizardMsg) -> Command {
        if let WizardMsg::PullDone(result) = msg {
            self.running = false;
            self.done = true;
            self.output = result.output;
            self.err = result.error.map(|e| e.to_string());
        }
        Command::None
    }

    fn render_overlay(&self, width: usize) -> Vec<String> {
        let mut lines = vec![rule(width)];
        if !self.done {
            lines.push(title("Pull — Confirm (y/enter: pull, esc: cancel)"));
            if self.running {
                lines.push(fg("Pulling…", Color::Indexed(63)));
            }
            if let Some(err) = &self.err {
                lines.push(error_line(err));
            }
            return lines;
        }

        lines.push(title("Pull — Result (enter/esc: close)"));
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
        let output = self.output.trim_end_matches('\n');
        if !output.is_empty() {
            let out: Vec<&str> = output.split('\n').collect();
            lines.extend(
                out.iter()
                    .take(OUTPUT_LIMIT)
                    .map(|l| sanitize(l).into_owned()),
            );
            if out.len() > OUTPUT_LIMIT {
                lines.push(hint("… and more"));
            }
        } else if self.err.is_none() {
            lines.push(hint("(no output)"));
        }
        lines
    }

    fn is_complete(&self) -> bool {
        self.done && self.err.is_none()
    }

    fn error(&self) -> Option<&str> {
        self.err.as_deref()
    }
}
