//! Switch to an existing branch or create a new one.

use crossterm::event::KeyEvent;
use ratatui::style::Color;

use super::{
    cursor, error_line, fg, hint, key_name, move_down, move_up, rule, text_step_key, title, Flow,
    TextStep, Wizard, WizardContext, WizardKind,
};
use crate::core::BranchList;
use crate::ui::msg::{Command, GitTask, WizardMsg};
use crate::ui::text_input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Step {
    #[default]
    List,
    CheckoutConfirm,
    NewName,
    NewConfirm,
}

/// Branch wizard state.
#[derive(Debug, Default)]
pub struct BranchWizard {
    step: Step,
    branches: BranchList,
    index: usize,
    input: TextInput,
    running: bool,
    done: bool,
    err: Option<String>,
}

impl BranchWizard {
    fn focused_branch(&self) -> Option<&str> {
        self.branches.names.get(self.index).map(String::as_str)
    }

    fn begin_confirm(&mut self, step: Step) {
        self.step = step;
        self.err = None;
        self.done = false;
        self.running = false;
    }

    fn handle_list(&mut self, key: KeyEvent) -> Flow {
        match key_name(&key).as_str() {
            "esc" => return Flow::Close,
            "j" | "down" => move_down(&mut self.index, self.branches.names.len()),
            "k" | "up" => move_up(&mut self.index),
            "n" => {
                self.input = TextInput::new("> ", "Branch name");
                self.step = Step::NewName;
                self.err = None;
            }
            "enter" if !self.branches.names.is_empty() => self.begin_confirm(Step::CheckoutConfirm),
            _ => {}
        }
        Flow::Continue
    }

    /// Shared handling of both confirm steps. `run` builds the task.
    fn handle_confirm(
        &mut self,
        key: KeyEvent,
        back: Step,
        run: impl FnOnce(&mut Self) -> Option<GitTask>,
    ) -> (Flow, Command) {
        match key_name(&key).as_str() {
            "esc" if !self.running => return (Flow::Close, Command::None),
            "b" if !self.running && !self.done => self.step = back,
            "y" | "enter" if !self.running && !self.done => {
                if let Some(task) = run(self) {
                    self.running = true;
                    self.err = None;
                    return (Flow::Continue, Command::Git(task));
                }
            }
            _ => {}
        }
        (Flow::Continue, Command::None)
    }

    fn render_list(&self, lines: &mut Vec<String>) {
        lines.push(title(
            "Branches — Select (enter: continue, n: new, esc: cancel)",
        ));
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
        if self.branches.names.is_empty() && self.err.is_none() {
            lines.push(hint("Loading branches…"));
            return;
        }
        for (i, name) in self.branches.names.iter().enumerate() {
            let mark = if *name == self.branches.current {
                "[*]"
            } else {
                "   "
            };
            lines.push(format!("{}{mark} {name}", cursor(i == self.index)));
        }
        lines.push(hint("[*] current branch"));
    }

    fn push_status(&self, lines: &mut Vec<String>, running: &str) {
        if self.running {
            lines.push(fg(running, Color::Indexed(63)));
        }
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
    }
}

impl Wizard for BranchWizard {
    fn kind(&self) -> WizardKind {
        WizardKind::Branch
    }

    fn init(&mut self, _ctx: WizardContext<'_>) -> Command {
        *self = Self::default();
        Command::Git(GitTask::ListBranches)
    }

    fn handle_key(&mut self, key: KeyEvent) -> (Flow, Command) {
        match self.step {
            Step::List => (self.handle_list(key), Command::None),
            Step::CheckoutConfirm => self.handle_confirm(key, Step::List, |w| {
                w.focused_branch().map(|name| GitTask::Checkout {
                    name: name.to_string(),
                })
            }),
            Step::NewName => {
                match text_step_key(&mut self.input, key) {
                    TextStep::Close => return (Flow::Close, Command::None),
                    TextStep::Back => self.step = Step::List,
                    TextStep::Next if self.input.value().trim().is_empty() => {
                        self.err = Some("empty branch name".into());
                    }
                    TextStep::Next => self.begin_confirm(Step::NewConfirm),
                    TextStep::Handled => {}
                }
                (Flow::Continue, Command::None)
            }
            Step::NewConfirm => self.handle_confirm(key, Step::NewName, |w| {
                let name = w.input.value().trim().to_string();
                if name.is_empty() {
                    w.err = Some("empty branch name".into());
                    return None;
                }
                Some(GitTask::CheckoutNew { name })
            }),
        }
    }

    fn update(&mut self, msg: WizardMsg) -> Command {
        match msg {
            WizardMsg::Branches(Ok(list)) => {
                self.index = list
                    .names
                    .iter()
                    .position(|n| *n == list.current)
                    .unwrap_or(0);
                self.branches = list;
                self.err = None;
            }
            WizardMsg::Branches(Err(e)) => {
                self.branches = BranchList::default();
                self.index = 0;
                self.err = Some(e.to_string());
            }
            WizardMsg::BranchDone { result, .. } => {
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
            Step::CheckoutConfirm => {
                lines.push(title(
                    "Checkout — Confirm (y/enter: checkout, b: back, esc: cancel)",
                ));
                if let Some(name) = self.focused_branch() {
                    lines.push(format!("Branch: {name}"));
                }
                self.push_status(&mut lines, "Checking out…");
            }
            Step::NewName => {
                let (esc, mode) = if self.input.is_focused() {
                    ("leave input", "input")
                } else {
                    ("cancel", "action")
                };
                lines.push(title(&format!(
                    "New Branch — Name (i: input, enter: continue, b: back, esc: {esc}) [{mode}]"
                )));
                lines.push(self.input.view());
                if let Some(err) = &self.err {
                    lines.push(error_line(err));
                }
            }
            Step::NewConfirm => {
                lines.push(title(
                    "New Branch — Confirm (y/enter: create, b: back, esc: cancel)",
                ));
                lines.push(format!("Name: {}", self.input.value()));
                self.push_status(&mut lines, "Creating…");
            }
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
