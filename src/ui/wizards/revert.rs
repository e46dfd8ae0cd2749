//! Revert one of the recent commits, commit the revert and push it.

use crossterm::event::KeyEvent;
use ratatui::style::Color;

use super::commit::{message_input, message_title};
use super::{
    checkbox, cursor, error_line, fg, hint, key_name, move_down, move_up, rule, text_step_key,
    title, Flow, TextStep, Wizard, WizardContext, WizardKind,
};
use crate::ui::msg::{Command, GitTask, WizardMsg};
use crate::ui::text_input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Step {
    #[default]
    List,
    Message,
    Confirm,
}

/// Split a `--oneline` log entry into short sha and subject.
fn split_oneline(line: &str) -> (&str, &str) {
    line.split_once(' ').unwrap_or((line, ""))
}

/// Message git itself would propose for reverting `line`.
fn default_message(line: &str) -> String {
    let (sha, subject) = split_oneline(line);
    format!("Revert \"{subject}\"\n\nThis reverts commit {sha}.")
}

/// Revert wizard state.
#[derive(Debug, Default)]
pub struct RevertWizard {
    step: Step,
    commits: Vec<String>,
    index: usize,
    input: TextInput,
    running: bool,
    done: bool,
    err: Option<String>,
}

impl RevertWizard {
    fn handle_list(&mut self, key: KeyEvent) -> Flow {
        match key_name(&key).as_str() {
            "esc" => return Flow::Close,
            "j" | "down" => move_down(&mut self.index, self.commits.len()),
            "k" | "up" => move_up(&mut self.index),
            "enter" => match self.commits.get(self.index) {
                Some(line) => {
                    let mut input = message_input();
                    input.set_value(default_message(line));
                    self.input = input;
                    self.step = Step::Message;
                    self.err = None;
                    self.done = false;
                }
                None => self.err = Some("no commit selected".into()),
            },
            _ => {}
        }
        Flow::Continue
    }

    fn handle_confirm(&mut self, key: KeyEvent) -> (Flow, Command) {
        match key_name(&key).as_str() {
            "esc" if !self.running => return (Flow::Close, Command::None),
            "b" if !self.running && !self.done => self.step = Step::Message,
            "y" | "enter" if !self.running && !self.done => {
                let Some(line) = self.commits.get(self.index) else {
                    self.err = Some("no commit selected".into());
                    return (Flow::Continue, Command::None);
                };
                let message = self.input.value().to_string();
                if message.trim().is_empty() {
                    self.err = Some("empty commit message".into());
                    return (Flow::Continue, Command::None);
                }
                let sha = split_oneline(line).0.to_string();
                self.err = None;
                self.running = true;
                return (Flow::Continue, Command::Git(GitTask::Revert { sha, message }));
            }
            _ => {}
        }
        (Flow::Continue, Command::None)
    }

    fn render_list(&self, lines: &mut Vec<String>) {
        lines.push(title("Commits — Select (enter: continue, esc: cancel)"));
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
        if self.commits.is_empty() && self.err.is_none() {
            lines.push(hint("Loading commits"));
            return;
        }
        for (i, line) in self.commits.iter().enumerate() {
            let focused = i == self.index;
            lines.push(format!("{}{} {line}", cursor(focused), checkbox(focused)));
        }
    }

    fn render_confirm(&self, lines: &mut Vec<String>) {
        lines.push(title(
            "Revert — Confirm (y/enter: revert & push, b: back, esc: cancel)",
        ));
        if let Some(line) = self.commits.get(self.index) {
            lines.push(format!("Commit: {line}"));
        }
        let subject = self.input.value().lines().next().unwrap_or_default();
        lines.push(format!("Message: {subject}"));
        if self.running {
            lines.push(fg("Reverting & pushing...", Color::Indexed(63)));
        }
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
    }
}

impl Wizard for RevertWizard {
    fn kind(&self) -> WizardKind {
        WizardKind::Revert
    }

    fn init(&mut self, _ctx: WizardContext<'_>) -> Command {
        *self = Self::default();
        Command::Git(GitTask::RecentCommits)
    }

    fn handle_key(&mut self, key: KeyEvent) -> (Flow, Command) {
        match self.step {
            Step::List => (self.handle_list(key), Command::None),
            Step::Message => {
                match text_step_key(&mut self.input, key) {
                    TextStep::Close => return (Flow::Close, Command::None),
                    TextStep::Back => self.step = Step::List,
                    TextStep::Next => {
                        self.step = Step::Confirm;
                        self.err = None;
                        self.done = false;
                        self.running = false;
                    }
                    TextStep::Handled => {}
                }
                (Flow::Continue, Command::None)
            }
            Step::Confirm => self.handle_confirm(key),
        }
    }

    fn update(&mut self, msg: WizardMsg) -> Command {
        match msg {
            WizardMsg::Commits(Ok(commits)) => {
                self.commits = commits;
                self.index = 0;
                self.err = None;
            }
            WizardMsg::Commits(Err(e)) => {
                self.commits.clear();
                self.index = 0;
                self.err = Some(e.to_string());
            }
            WizardMsg::RevertDone(result) => {
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
            Step::List => self.render_list(&mut lines),
            Step::Message => {
                lines.push(message_title(self.input.is_focused()));
                lines.push(self.input.view());
            }
            Step::Confirm => self.render_confirm(&mut lines),
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
