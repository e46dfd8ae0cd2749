//! Stage selected files, commit and push.

use crossterm::event::KeyEvent;
use ratatui::style::Color;

use super::{
    error_line, fg, hint, key_name, rule, text_step_key, title, FileSelection, Flow, TextStep,
    Wizard, WizardContext, WizardKind,
};
use crate::ui::msg::{Command, GitTask, WizardMsg};
use crate::ui::text_input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Step {
    #[default]
    Select,
    Message,
    Confirm,
}

/// Title of the message step, shared with the revert wizard.
pub(super) fn message_title(input_active: bool) -> String {
    let (esc, mode) = if input_active {
        ("leave input", "input")
    } else {
        ("cancel", "action")
    };
    title(&format!(
        "Commit — Message (i: input, enter: continue, b: back, esc: {esc}) [{mode}]"
    ))
}

pub(super) fn message_input() -> TextInput {
    TextInput::new("> ", "Commit message")
}

/// Commit wizard state.
#[derive(Debug, Default)]
pub struct CommitWizard {
    step: Step,
    list: FileSelection,
    input: TextInput,
    running: bool,
    done: bool,
    err: Option<String>,
}

impl CommitWizard {
    fn handle_select(&mut self, key: KeyEvent) -> Flow {
        match key_name(&key).as_str() {
            "esc" => return Flow::Close,
            "enter" => {
                self.step = Step::Message;
                self.input = message_input();
            }
            name => {
                self.list.handle_key(name);
            }
        }
        Flow::Continue
    }

    fn handle_confirm(&mut self, key: KeyEvent) -> (Flow, Command) {
        match key_name(&key).as_str() {
            "esc" if !self.running => return (Flow::Close, Command::None),
            "b" if !self.running && !self.done => self.step = Step::Message,
            "y" | "enter" if !self.running && !self.done => {
                let paths = self.list.selected_paths();
                if paths.is_empty() {
                    self.err = Some("no files selected".into());
                    return (Flow::Continue, Command::None);
                }
                let message = self.input.value().to_string();
                if message.trim().is_empty() {
                    self.err = Some("empty commit message".into());
                    return (Flow::Continue, Command::None);
                }
                self.err = None;
                self.running = true;
                return (
                    Flow::Continue,
                    Command::Git(GitTask::StageCommitPush { paths, message }),
                );
            }
            _ => {}
        }
        (Flow::Continue, Command::None)
    }

    fn render_select(&self, lines: &mut Vec<String>) {
        lines.push(title(
            "Commit — Select files (space: toggle, a: all, enter: continue, esc: cancel)",
        ));
        if self.list.is_empty() {
            lines.push(hint("No changes to commit"));
            return;
        }
        self.list.render(lines);
    }

    fn render_confirm(&self, lines: &mut Vec<String>) {
        lines.push(title(
            "Commit — Confirm (y/enter: commit & push, b: back, esc: cancel)",
        ));
        lines.push(format!("Files: {}", self.list.selected_paths().len()));
        lines.push(format!("Message: {}", self.input.value()));
        if self.running {
            lines.push(fg("Committing & pushing...", Color::Indexed(63)));
        }
        if let Some(err) = &self.err {
            lines.push(error_line(err));
        }
    }
}

impl Wizard for CommitWizard {
    fn kind(&self) -> WizardKind {
        WizardKind::Commit
    }

    fn init(&mut self, ctx: WizardContext<'_>) -> Command {
        *self = Self {
            list: FileSelection::new(ctx.files),
            ..Self::default()
        };
        Command::None
    }

    fn handle_key(&mut self, key: KeyEvent) -> (Flow, Command) {
        match self.step {
            Step::Select => (self.handle_select(key), Command::None),
            Step::Message => {
                match text_step_key(&mut self.input, key) {
                    TextStep::Close => return (Flow::Close, Command::None),
                    TextStep::Back => self.step = Step::Select,
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
        if let WizardMsg::CommitDone(result) = msg {
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
        Command::None
    }

    fn render_overlay(&self, width: usize) -> Vec<String> {
        let mut lines = vec![rule(width)];
        match self.step {
            Step::Select => self.render_select(&mut lines),
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

#[cfg(test)]
mod tests {
    use super::super::testing::{code, key, plain, press, type_text};
    use super::*;
    use crate::core::{FileChange, RepoError};
    use crossterm::event::KeyCode;

    fn files() -> Vec<FileChange> {
        let mut a = FileChange::new("a.txt");
        a.unstaged = true;
        let mut b = FileChange::new("b.txt");
        b.staged = true;
        vec![a, b]
    }

    fn opened() -> CommitWizard {
        let files = files();
        let mut w = CommitWizard::default();
        assert!(w.init(WizardContext { files: &files }).is_none());
        w
    }

    fn to_confirm(w: &mut CommitWizard, message: &str) {
        press(w, code(KeyCode::Enter));
        press(w, key('i'));
        type_text(w, message);
        press(w, code(KeyCode::Esc));
        press(w, code(KeyCode::Enter));
    }

    #[test]
    fn all_files_preselected() {
        let w = opened();
        let lines = plain(&w);
        assert_eq!(lines[2], "> [x] M a.txt");
        assert_eq!(lines[3], "  [x] S b.txt");
    }

    #[test]
    fn toggle_and_toggle_all() {
        let mut w = opened();
        press(&mut w, key('j'));
        press(&mut w, key(' '));
        assert_eq!(w.list.selected_paths(), vec!["a.txt"]);
        press(&mut w, key('a'));
        assert_eq!(w.list.selected_paths().len(), 2);
        press(&mut w, key('a'));
        assert!(w.list.selected_paths().is_empty());
    }

    #[test]
    fn commit_issues_stage_commit_push() {
        let mut w = opened();
        to_confirm(&mut w, "fix bug");
        assert_eq!(plain(&w)[1], "Commit — Confirm (y/enter: commit & push, b: back, esc: cancel)");
        let (flow, cmd) = press(&mut w, key('y'));
        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            cmd,
            Command::Git(GitTask::StageCommitPush {
                paths: vec!["a.txt".into(), "b.txt".into()],
                message: "fix bug".into(),
            })
        );
        assert!(plain(&w).contains(&"Committing & pushing...".to_string()));

        // A second confirm while running does nothing.
        assert!(press(&mut w, key('y')).1.is_none());
        assert_eq!(press(&mut w, code(KeyCode::Esc)).0, Flow::Continue);

        w.update(WizardMsg::CommitDone(Ok(())));
        assert!(w.is_complete());
    }

    #[test]
    fn validation_errors_are_inline() {
        let mut w = opened();
        to_confirm(&mut w, "   ");
        let (_, cmd) = press(&mut w, code(KeyCode::Enter));
        assert!(cmd.is_none());
        assert_eq!(w.error(), Some("empty commit message"));

        let mut w = opened();
        press(&mut w, key('a'));
        press(&mut w, key('a'));
        to_confirm(&mut w, "msg");
        press(&mut w, key('y'));
        assert_eq!(w.error(), Some("no files selected"));
        assert!(plain(&w).contains(&"Error: no files selected".to_string()));
    }

    #[test]
    fn message_step_modes() {
        let mut w = opened();
        press(&mut w, code(KeyCode::Enter));
        assert!(plain(&w)[1].ends_with("esc: cancel) [action]"));
        press(&mut w, key('i'));
        assert!(plain(&w)[1].ends_with("esc: leave input) [input]"));
        // `b` is text while typing.
        type_text(&mut w, "b");
        assert_eq!(w.input.value(), "b");
        press(&mut w, code(KeyCode::Esc));
        press(&mut w, key('b'));
        assert_eq!(w.step, Step::Select);
    }

    #[test]
    fn esc_closes_outside_input() {
        let mut w = opened();
        assert_eq!(press(&mut w, code(KeyCode::Esc)).0, Flow::Close);
    }

    #[test]
    fn failure_keeps_wizard_open() {
        let mut w = opened();
        to_confirm(&mut w, "msg");
        press(&mut w, key('y'));
        w.update(WizardMsg::CommitDone(Err(RepoError::EmptyInput("commit message"))));
        assert!(!w.is_complete());
        assert_eq!(w.error(), Some("empty commit message"));
    }

    #[test]
    fn empty_file_list() {
        let mut w = CommitWizard::default();
        w.init(WizardContext { files: &[] });
        assert_eq!(plain(&w)[2], "No changes to commit");
    }
}
