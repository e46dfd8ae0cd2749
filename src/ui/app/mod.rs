//! Session controller.
//!
//! [`App`] owns all session state and changes only inside [`App::update`],
//! one message at a time. Work that touches the repository is returned as a
//! [`Command`] for the worker to run.

use std::time::Duration;

use chrono::Local;
use crossterm::event::KeyEvent;
use tracing::debug;

use crate::core::{DiffMode, FileChange, Prefs, Row};
use crate::search::SearchEngine;
use crate::theme::Theme;

use super::msg::{Command, Msg, WizardMsg};
use super::text_input::TextInput;
use super::wizards::{key_name, Flow, Wizard, WizardContext, WizardKind};

mod content;
mod navigation;
mod search;
mod state;

pub use state::{UiState, Viewport};

/// Delay between automatic refreshes.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// How long a transient status stays visible.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Changed files for the current mode, sorted by path.
    pub files: Vec<FileChange>,
    /// Index into `files`.
    pub selected: usize,
    /// Rows of the selected file. `None` until its diff arrives.
    pub rows: Option<Vec<Row>>,
    /// Working tree or index.
    pub mode: DiffMode,
    /// Geometry and scroll positions.
    pub viewport: Viewport,
    /// Status, overlays and repository summary.
    pub ui: UiState,
    /// Search session over the diff pane; owns the pane's lines.
    pub search: SearchEngine,
    /// Query input of the search overlay.
    pub search_input: TextInput,
    /// Colors.
    pub theme: Theme,
    /// Set once the user asked to quit.
    pub should_quit: bool,
    wizard: Option<Box<dyn Wizard>>,
    pending_recenter: bool,
}

impl App {
    /// Fresh session and the startup loads.
    pub fn new(theme: Theme) -> (Self, Command) {
        let app = Self {
            files: Vec::new(),
            selected: 0,
            rows: None,
            mode: DiffMode::default(),
            viewport: Viewport::default(),
            ui: UiState {
                dirty: true,
                ..UiState::default()
            },
            search: SearchEngine::new(),
            search_input: TextInput::new("/ ", "Search diff"),
            theme,
            should_quit: false,
            wizard: None,
            pending_recenter: false,
        };
        let startup = Command::batch([
            Command::LoadPrefs,
            Command::LoadFiles(app.mode),
            Command::LoadLastCommit,
            Command::LoadCurrentBranch,
            Command::TickAfter(TICK_INTERVAL),
        ]);
        (app, startup)
    }

    /// Apply one message and return the follow-up work.
    pub fn update(&mut self, msg: Msg) -> Command {
        let cmd = match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Resize { width, height } => {
                self.on_resize(width, height);
                Command::None
            }
            Msg::Tick => Command::batch([
                Command::LoadFiles(self.mode),
                Command::LoadCurrentBranch,
                Command::TickAfter(TICK_INTERVAL),
            ]),
            Msg::ClearStatus(seq) => {
                if seq == self.ui.status_seq {
                    self.ui.status = None;
                }
                Command::None
            }
            Msg::FilesLoaded(result) => self.on_files(result),
            Msg::DiffLoaded { path, result } => {
                match result {
                    Err(e) => {
                        self.rows = None;
                        self.set_status(format!("diff error: {e}"))
                    }
                    Ok(rows) => {
                        if self.selected_file().is_some_and(|f| f.path == path) {
                            self.rows = Some(rows);
                        } else {
                            debug!(%path, "discarding stale diff");
                        }
                        Command::None
                    }
                }
            }
            Msg::LastCommit(result) => {
                if let Ok(summary) = result {
                    self.ui.last_commit = summary;
                }
                Command::None
            }
            Msg::CurrentBranch(result) => {
                if let Ok(name) = result {
                    self.ui.branch = name;
                }
                Command::None
            }
            Msg::PrefsLoaded(prefs) => {
                self.on_prefs(prefs);
                Command::None
            }
            Msg::Wizard(msg) => self.on_wizard_msg(msg),
        };
        self.reconcile();
        self.ui.dirty = true;
        cmd
    }

    /// Currently selected file.
    pub fn selected_file(&self) -> Option<&FileChange> {
        self.files.get(self.selected)
    }

    /// Kind of the open wizard.
    pub fn wizard_kind(&self) -> Option<WizardKind> {
        self.wizard.as_ref().map(|w| w.kind())
    }

    /// The open wizard.
    pub fn wizard(&self) -> Option<&dyn Wizard> {
        self.wizard.as_deref()
    }

    /// Whether the search overlay is open.
    pub fn search_active(&self) -> bool {
        self.search.is_active()
    }

    /// Lines of the diff pane before search highlighting.
    pub fn right_content(&self) -> &[String] {
        self.search.content()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Command {
        if let Some(wizard) = self.wizard.as_mut() {
            let (flow, cmd) = wizard.handle_key(key);
            if flow == Flow::Close {
                debug!(kind = ?wizard.kind(), "wizard closed");
                self.wizard = None;
            }
            return cmd;
        }
        if self.search.is_active() {
            return self.search_key(key);
        }
        if self.ui.show_help {
            match key_name(&key).as_str() {
                "q" | "ctrl+c" => self.should_quit = true,
                "h" | "esc" => self.ui.show_help = false,
                _ => {}
            }
            return Command::None;
        }
        self.global_key(key)
    }

    /// Close search and help, then open a fresh wizard of `kind`.
    pub(crate) fn open_wizard(&mut self, kind: WizardKind) -> Command {
        self.close_search();
        self.ui.show_help = false;
        let mut wizard = kind.create();
        let cmd = wizard.init(WizardContext { files: &self.files });
        debug!(?kind, "wizard opened");
        self.wizard = Some(wizard);
        cmd
    }

    /// Show help, closing whatever else was open.
    pub(crate) fn open_help(&mut self) {
        self.close_search();
        self.wizard = None;
        self.ui.show_help = true;
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        let vp = &mut self.viewport;
        vp.width = width;
        vp.height = height;
        if vp.left_width == 0 {
            let initial = vp.saved_left_width.unwrap_or(width / 3);
            vp.left_width = vp.clamp_initial_left(initial);
        }
    }

    fn on_prefs(&mut self, prefs: Prefs) {
        let vp = &mut self.viewport;
        if let Some(side) = prefs.side_by_side {
            vp.side_by_side = side;
        }
        if let Some(wrap) = prefs.wrap {
            vp.wrap = wrap;
            if wrap {
                vp.x_offset = 0;
            }
        }
        if let Some(width) = prefs.left_width {
            vp.saved_left_width = Some(width);
            if vp.width > 0 {
                vp.left_width = vp.clamp_initial_left(width);
            }
        }
    }

    /// Show a transient status and start its clear timer.
    fn set_status(&mut self, text: String) -> Command {
        self.ui.status = Some(text);
        self.ui.status_seq += 1;
        Command::ClearStatusAfter {
            delay: STATUS_TIMEOUT,
            seq: self.ui.status_seq,
        }
    }

    fn on_files(&mut self, result: Result<Vec<FileChange>, crate::core::RepoError>) -> Command {
        let mut files = match result {
            Ok(files) => files,
            Err(e) => return self.set_status(format!("status error: {e}")),
        };
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let previous = self.selected_file().map(|f| f.path.clone());
        self.files = files;
        self.ui.last_refresh = Some(Local::now());
        self.selected = previous
            .and_then(|p| self.files.iter().position(|f| f.path == p))
            .unwrap_or(0);

        match self.selected_file() {
            Some(file) => Command::LoadDiff {
                path: file.path.clone(),
                mode: self.mode,
            },
            None => {
                self.rows = None;
                Command::None
            }
        }
    }

    fn on_wizard_msg(&mut self, msg: WizardMsg) -> Command {
        let kind = msg.kind();
        let completion = msg.is_completion();
        let refresh = self.refresh_after(&msg);
        let branch_status = match &msg {
            WizardMsg::BranchDone {
                name,
                created,
                result: Ok(()),
            } => Some(if *created {
                format!("Created and switched to branch '{name}'")
            } else {
                format!("Switched to branch '{name}'")
            }),
            _ => None,
        };

        let Some(wizard) = self.wizard.as_mut().filter(|w| w.kind() == kind) else {
            debug!(?kind, "discarding result for inactive wizard");
            return refresh;
        };
        let follow_up = wizard.update(msg);
        let mut cmds = vec![refresh, follow_up];

        if completion && wizard.is_complete() && kind != WizardKind::Pull {
            debug!(?kind, "wizard complete");
            self.wizard = None;
        }
        if let Some(status) = branch_status {
            cmds.push(self.set_status(status));
        }
        Command::batch(cmds)
    }

    /// Reloads that follow a finished repository operation, whether or not
    /// its wizard is still open.
    fn refresh_after(&self, msg: &WizardMsg) -> Command {
        let files = Command::LoadFiles(self.mode);
        match msg {
            WizardMsg::CommitDone(_)
            | WizardMsg::UncommitDone(_)
            | WizardMsg::ResetCleanDone(_)
            | WizardMsg::RevertDone(_) => Command::batch([files, Command::LoadLastCommit]),
            WizardMsg::PullDone(_)
            | WizardMsg::BranchDone {
                result: Ok(()), ..
            } => Command::batch([files, Command::LoadLastCommit, Command::LoadCurrentBranch]),
            _ => Command::None,
        }
    }
}
