//! Move files out of the last commit back into the working tree.

use std::collections::HashSet;

use crossterm::event::KeyEvent;
use ratatui::style::Color;

use super::{
    error_line, fg, hint, key_name, rule, title, FileSelection, Flow, Wizard, WizardContext,
    WizardKind,
};
use crate::ui::msg::{Command, GitTask, WizardMsg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Step {
    #[default]
    Select,
    Confirm,
}

/// Uncommit wizard state.
///
/// Only paths that the last commit touched are sent to git; the rest of the
/// selection is reported as ignored on the confirm step.
#[derive(Debug, Default)]
pub struct UncommitWizard {
    step: Step,
    list: FileSelection,
    eligible: HashSet<String>,
    running: bool,
    done: bool,
    err: Option<String>,
}

impl UncommitWizard {
    fn eligible_paths(&self, selected: &[String]) -> Vec<String> {
        selected
            .iter()
            .filter(|p| self.eligible.contains(p.as_str()))
            .cloned()
            .collect()
    }

    fn handle_confirm(&mut self, key: KeyEvent) -> (Flow, Command) {
        match key_name(&key).as_str() {
            "esc" if !self.running => return (Flow::Close, Command::None),
            "b" if !self.running && !self.done => self.step = Step::Select,
            "y" | "enter" if !self.running && !self.done => {
                let selected = self.list.selected_paths();
                if selected.is_empty() {
                    self.err = Some("no files selected".into());
                    return (Flow::Continue, Command::None);
                }
                let paths = self.eligible_paths(&selected);
                if paths.is_empty() {
                    self.err = Some("no selected files are in the last commit".into());
                    return (Flow::Continue, Command::None);
                }
                self.err = None;
                self.running = true;
                return (Flow::Continue, Command::Git(GitTask::Uncommit { paths }));
            }
            _ => {}
        }
        (Flow::Continue, Command::None)
    }

    fn render_select(&self, lines: &mut Vec<String>) {
        lines.push(title(
            "Uncommit — Select files (space: toggle, a: all, enter: continue, esc: cancel)",
        ));
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
        if self.list.is_empty() {
            lines.push(hint("No changes to choose from"));
            return;
        }
        self.list.render(lines);
    }

    fn render_confirm(&self, lines: &mut Vec<String>) {
        lines.push(title(
            "Uncommit — Confirm (y/enter: uncommit, b: back, esc: cancel)",
        ));
        let selected = self.list.selected_paths();
        let eligible = self.eligible_paths(&selected).len();
        lines.push(format!(
            "Selected: {}  Eligible to uncommit: {}  Ignored: {}",
            selected.len(),
            eligible,
            selected.len() - eligible
        ));
        if self.running {
            lines.push(fg("Uncommitting…", Color::Indexed(63)));
        }
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
    }
}

impl Wizard for UncommitWizard {
    fn kind(&self) -> WizardKind {
        WizardKind::Uncommit
    }

    fn init(&mut self, ctx: WizardContext<'_>) -> Command {
        *self = Self {
            list: FileSelection::new(ctx.files),
            ..Self::default()
        };
        Command::Git(GitTask::FilesInLastCommit)
    }

    fn handle_key(&mut self, key: KeyEvent) -> (Flow, Command) {
        if self.step == Step::Confirm {
            return self.handle_confirm(key);
        }
        match key_name(&key).as_str() {
            "esc" => return (Flow::Close, Command::None),
            "enter" => {
                self.step = Step::Confirm;
                self.err = None;
                self.done = false;
                self.running = false;
            }
            name => {
                self.list.handle_key(name);
            }
        }
        (Flow::Continue, Command::None)
    }

    fn update(&mut self, msg: WizardMsg) -> Command {
        match msg {
            WizardMsg::UncommitEligible(Ok(paths)) => {
                self.eligible = paths.into_iter().collect();
            }
            WizardMsg::UncommitEligible(Err(e)) => {
                self.eligible.clear();
                self.err = Some(e.to_string());
            }
            WizardMsg::UncommitDone(result) => {
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

#[cfg(test)]
mod tests {
    use super::super::testing::{code, key, plain, press};
    use super::*;
    use crate::core::{FileChange, RepoError};
    use crossterm::event::KeyCode;

    fn opened() -> UncommitWizard {
        let mut a = FileChange::new("a.txt");
        a.unstaged = true;
        let mut b = FileChange::new("b.txt");
        b.staged = true;
        let mut w = UncommitWizard::default();
        let cmd = w.init(WizardContext { files: &[a, b] });
        assert_eq!(cmd, Command::Git(GitTask::FilesInLastCommit));
        w
    }

    #[test]
    fn confirm_counts_and_filters_to_eligible() {
        let mut w = opened();
        w.update(WizardMsg::UncommitEligible(Ok(vec!["b.txt".into()])));
        press(&mut w, code(KeyCode::Enter));
        assert_eq!(
            plain(&w)[2],
            "Selected: 2  Eligible to uncommit: 1  Ignored: 1"
        );
        let (_, cmd) = press(&mut w, key('y'));
        assert_eq!(
            cmd,
            Command::Git(GitTask::Uncommit {
                paths: vec!["b.txt".into()]
            })
        );
        assert!(plain(&w).contains(&"Uncommitting…".to_string()));
    }

    #[test]
    fn nothing_eligible_is_an_inline_error() {
        let mut w = opened();
        w.update(WizardMsg::UncommitEligible(Ok(vec!["other.txt".into()])));
        press(&mut w, code(KeyCode::Enter));
        let (flow, cmd) = press(&mut w, code(KeyCode::Enter));
        assert_eq!(flow, Flow::Continue);
        assert!(cmd.is_none());
        assert_eq!(w.error(), Some("no selected files are in the last commit"));
    }

    #[test]
    fn eligible_load_failure_shows_on_select_step() {
        let mut w = opened();
        w.update(WizardMsg::UncommitEligible(Err(RepoError::NoParentCommit)));
        assert_eq!(
            plain(&w)[2],
            "Error: no parent commit (cannot uncommit from initial commit)"
        );
        // Entering the confirm step clears the error.
        press(&mut w, code(KeyCode::Enter));
        assert_eq!(w.error(), None);
        assert_eq!(
            plain(&w)[2],
            "Selected: 2  Eligible to uncommit: 0  Ignored: 2"
        );
    }

    #[test]
    fn done_blocks_further_confirms() {
        let mut w = opened();
        w.update(WizardMsg::UncommitEligible(Ok(vec!["a.txt".into()])));
        press(&mut w, code(KeyCode::Enter));
        press(&mut w, key('y'));
        w.update(WizardMsg::UncommitDone(Ok(())));
        assert!(w.is_complete());
        assert!(press(&mut w, key('y')).1.is_none());
        assert_eq!(press(&mut w, key('b')).0, Flow::Continue);
        assert_eq!(w.step, Step::Confirm);
        assert_eq!(press(&mut w, code(KeyCode::Esc)).0, Flow::Close);
    }

    #[test]
    fn back_returns_to_selection() {
        let mut w = opened();
        press(&mut w, code(KeyCode::Enter));
        press(&mut w, key('b'));
        assert_eq!(w.step, Step::Select);
        press(&mut w, key(' '));
        assert_eq!(w.list.selected_paths(), vec!["b.txt"]);
    }
}
