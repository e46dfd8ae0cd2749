//! Multi-step modal workflows.
//!
//! Each wizard is a small state machine indexed by step. It never touches
//! the repository: work is requested by returning a [`Command`] and the
//! result comes back through [`Wizard::update`].

mod branch;
mod commit;
mod pull;
mod reset_clean;
mod revert;
mod uncommit;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::FileChange;

use super::msg::{Command, WizardMsg};
use super::text_input::TextInput;
use super::render::sgr::{bold, faint, fg};

pub use branch::BranchWizard;
pub use commit::CommitWizard;
pub use pull::PullWizard;
pub use reset_clean::ResetCleanWizard;
pub use revert::RevertWizard;
pub use uncommit::UncommitWizard;

/// The closed set of wizards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardKind {
    /// Stage, commit and push.
    Commit,
    /// Drop files from the last commit.
    Uncommit,
    /// Switch or create a branch.
    Branch,
    /// Hard reset and/or clean.
    ResetClean,
    /// Pull from upstream.
    Pull,
    /// Revert a recent commit.
    Revert,
}

impl WizardKind {
    /// Fresh, uninitialized wizard of this kind.
    pub fn create(self) -> Box<dyn Wizard> {
        match self {
            Self::Commit => Box::new(CommitWizard::default()),
            Self::Uncommit => Box::new(UncommitWizard::default()),
            Self::Branch => Box::new(BranchWizard::default()),
            Self::ResetClean => Box::new(ResetCleanWizard::default()),
            Self::Pull => Box::new(PullWizard::default()),
            Self::Revert => Box::new(RevertWizard::default()),
        }
    }
}

/// What the controller should do with the wizard after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep the wizard open.
    Continue,
    /// Close and discard the wizard.
    Close,
}

/// Session state a wizard may read when it opens.
#[derive(Debug, Clone, Copy)]
pub struct WizardContext<'a> {
    /// Files currently listed in the left pane.
    pub files: &'a [FileChange],
}

/// Shared wizard contract.
pub trait Wizard: std::fmt::Debug {
    /// Which wizard this is.
    fn kind(&self) -> WizardKind;

    /// Reset to the first step and return the initial load, if any.
    fn init(&mut self, ctx: WizardContext<'_>) -> Command;

    /// Handle a key. Work is never run synchronously; it is returned as a
    /// command.
    fn handle_key(&mut self, key: KeyEvent) -> (Flow, Command);

    /// Apply the result of a command this wizard issued.
    fn update(&mut self, msg: WizardMsg) -> Command;

    /// Overlay lines, starting with a full-width rule.
    fn render_overlay(&self, width: usize) -> Vec<String>;

    /// Whether the workflow finished successfully.
    fn is_complete(&self) -> bool;

    /// Current inline error.
    fn error(&self) -> Option<&str>;
}

/// Key identity used by the wizard keymaps, in the `ctrl+x` / `enter` /
/// `a` naming style.
pub(crate) fn key_name(key: &KeyEvent) -> String {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char(' ') => " ".to_string(),
        KeyCode::Char(c) if ctrl => format!("ctrl+{c}"),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdown".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Tab => "tab".to_string(),
        _ => String::new(),
    }
}

fn rule(width: usize) -> String {
    "─".repeat(width)
}

fn title(text: &str) -> String {
    bold(text)
}

fn error_line(err: &str) -> String {
    format!("{}{err}", fg("Error: ", ratatui::style::Color::Indexed(196)))
}

fn hint(text: &str) -> String {
    faint(text)
}

/// `"> "` on the focused row.
fn cursor(focused: bool) -> &'static str {
    if focused {
        "> "
    } else {
        "  "
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Flip every flag off when all are on, otherwise turn all on.
fn toggle_all(flags: &mut [bool]) {
    let set = !flags.iter().all(|&f| f);
    flags.iter_mut().for_each(|f| *f = set);
}

/// Checklist of files with a focused row; every file starts selected.
#[derive(Debug, Clone, Default)]
struct FileSelection {
    files: Vec<FileChange>,
    selected: Vec<bool>,
    index: usize,
}

impl FileSelection {
    fn new(files: &[FileChange]) -> Self {
        Self {
            files: files.to_vec(),
            selected: vec![true; files.len()],
            index: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Handle `j`/`k`/arrows, `space` and `a`. Returns false for other keys.
    fn handle_key(&mut self, name: &str) -> bool {
        match name {
            "j" | "down" => move_down(&mut self.index, self.files.len()),
            "k" | "up" => move_up(&mut self.index),
            " " => {
                if let Some(flag) = self.selected.get_mut(self.index) {
                    *flag = !*flag;
                }
            }
            "a" => toggle_all(&mut self.selected),
            _ => return false,
        }
        true
    }

    fn selected_paths(&self) -> Vec<String> {
        self.files
            .iter()
            .zip(&self.selected)
            .filter(|(_, on)| **on)
            .map(|(f, _)| f.path.clone())
            .collect()
    }

    fn render(&self, lines: &mut Vec<String>) {
        for (i, (file, &on)) in self.files.iter().zip(&self.selected).enumerate() {
            lines.push(format!(
                "{}{} {} {}",
                cursor(i == self.index),
                checkbox(on),
                file.status_label(),
                file.path
            ));
        }
    }
}

/// Result of a key in a text-entry step.
enum TextStep {
    Close,
    Back,
    Next,
    Handled,
}

/// Key handling shared by text-entry steps: `i` enters input mode, `esc`
/// leaves it (or closes), `b` goes back and `enter` continues. In input
/// mode every other key edits the text.
fn text_step_key(input: &mut TextInput, key: KeyEvent) -> TextStep {
    let active = input.is_focused();
    match key_name(&key).as_str() {
        "esc" if active => {
            input.blur();
            return TextStep::Handled;
        }
        "esc" => return TextStep::Close,
        "i" if !active => {
            input.focus();
            return TextStep::Handled;
        }
        "b" if !active => return TextStep::Back,
        "enter" if !active => return TextStep::Next,
        _ => {}
    }
    if active {
        input.handle_key(key);
    }
    TextStep::Handled
}

fn move_down(index: &mut usize, len: usize) {
    if len > 0 && *index + 1 < len {
        *index += 1;
    }
}

fn move_up(index: &mut usize) {
    *index = index.saturating_sub(1);
}
